use shared::models::BookingStatus;
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::store::RepoError;

/// Booking lifecycle errors
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0}")]
    Validation(String),

    #[error("Booking {0} not found")]
    NotFound(String),

    #[error("Shop {0} not found")]
    ShopNotFound(i64),

    #[error("Booking {id} is {from}, cannot become {to}")]
    InvalidTransition {
        id: String,
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Booking {0} belongs to another user")]
    NotOwner(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::MissingFields(fields) => AppError::required(&fields),
            BookingError::Validation(msg) => AppError::validation(msg),
            BookingError::NotFound(id) => {
                AppError::new(ErrorCode::BookingNotFound).with_detail("bookingId", id)
            }
            BookingError::ShopNotFound(id) => {
                AppError::new(ErrorCode::ShopNotFound).with_detail("shopId", id)
            }
            BookingError::InvalidTransition { ref id, from, to } => {
                let code = if to == BookingStatus::Cancelled {
                    ErrorCode::BookingNotCancellable
                } else {
                    ErrorCode::BookingNotPending
                };
                AppError::new(code)
                    .with_detail("bookingId", id.clone())
                    .with_detail("status", from.as_str())
            }
            BookingError::NotOwner(id) => {
                AppError::new(ErrorCode::NotResourceOwner).with_detail("bookingId", id)
            }
            BookingError::Repo(e) => e.into(),
        }
    }
}
