//! Booking Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking status
///
/// ```text
/// pending ──► confirmed ──► cancelled
///    │
///    ├──────► rejected
///    └──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }

    /// 可取消状态: pending / confirmed
    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(Self::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// Reference to a message previously sent through the notifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub shop_id: i64,
    /// Shop display name captured when the booking was created
    pub shop_name: String,
    pub user_telegram_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_telegram_username: Option<String>,
    /// Contact number entered in the booking form
    pub user_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_telegram_number: Option<String>,
    pub requested_time: DateTime<Utc>,
    pub status: BookingStatus,
    /// Present iff `status == Rejected`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Admin approval prompt, kept so later transitions can edit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<MessageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking request payload (`POST /api/shops/booking-requests`)
///
/// Every field is optional at the wire level; presence is checked by the
/// lifecycle manager so the client gets one error listing all gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub shop_id: Option<i64>,
    pub shop_name: Option<String>,
    pub user_telegram_id: Option<i64>,
    pub user_telegram_username: Option<String>,
    /// RFC 3339 timestamp
    pub requested_time: Option<String>,
    pub user_number: Option<String>,
    pub user_telegram_number: Option<String>,
}

/// Validated booking draft, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub shop_id: i64,
    pub shop_name: String,
    pub user_telegram_id: i64,
    pub user_telegram_username: Option<String>,
    pub user_number: String,
    pub user_telegram_number: Option<String>,
    pub requested_time: DateTime<Utc>,
}

/// Acknowledgement returned after a booking request is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAck {
    pub message: String,
    pub booking_id: String,
}

/// Shop summary attached to bookings in the profile view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingShopRef {
    pub id: i64,
    pub name: crate::models::LocalizedText,
    pub image: String,
}

/// Booking as shown in the user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithShop {
    #[serde(flatten)]
    pub booking: Booking,
    /// `None` when the shop has since left the catalog
    pub shop: Option<BookingShopRef>,
}
