//! User API Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
};
use serde::Deserialize;
use shared::models::{
    Booking, BookingShopRef, BookingWithShop, GetUserRequest, User, UserProfile, UserResponse,
};
use shared::{AppError, AppResult, ErrorCode};

use crate::core::ServerState;

/// Telegram id from a JSON number or string; blank counts as missing
fn telegram_id_from(value: Option<&serde_json::Value>) -> Option<String> {
    let id = match value? {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// POST /api/user/get-user (也挂在 /api/shops/get-user)
pub async fn get_user(
    State(state): State<ServerState>,
    payload: Result<Json<GetUserRequest>, JsonRejection>,
) -> AppResult<Json<UserResponse>> {
    let Json(req) = payload?;
    let telegram_id = telegram_id_from(req.id.as_ref())
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, "Telegram ID is required"))?;

    let user = state
        .users
        .find_by_telegram_id(&telegram_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::UserNotFound, "User not found in database")
        })?;

    Ok(Json(UserResponse {
        message: "User data retrieved successfully".to_string(),
        user,
    }))
}

/// GET /api/user/profile/{telegramId} - 用户 + 预约 (新的在前)
pub async fn profile(
    State(state): State<ServerState>,
    Path(telegram_id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let numeric_id: i64 = telegram_id
        .trim()
        .parse()
        .map_err(|_| AppError::validation("Telegram ID must be numeric"))?;

    let (user, bookings) = tokio::try_join!(
        async { state.users.find_by_telegram_id(telegram_id.trim()).await },
        async { state.bookings.find_by_user(numeric_id).await },
    )?;
    let user: User =
        user.ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, "User not found."))?;

    let bookings = attach_shops(&state, bookings).await?;
    Ok(Json(UserProfile { user, bookings }))
}

/// 附加店铺摘要；店铺已下架时为 None
async fn attach_shops(
    state: &ServerState,
    bookings: Vec<Booking>,
) -> AppResult<Vec<BookingWithShop>> {
    let mut shop_ids: Vec<i64> = bookings.iter().map(|b| b.shop_id).collect();
    shop_ids.sort_unstable();
    shop_ids.dedup();

    let shops: HashMap<i64, BookingShopRef> = state
        .shops
        .find_by_ids(&shop_ids)
        .await?
        .into_iter()
        .map(|shop| {
            (
                shop.id,
                BookingShopRef {
                    id: shop.id,
                    name: shop.name,
                    image: shop.image,
                },
            )
        })
        .collect();

    Ok(bookings
        .into_iter()
        .map(|booking| {
            let shop = shops.get(&booking.shop_id).cloned();
            BookingWithShop { booking, shop }
        })
        .collect())
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelQuery {
    /// Telegram id of the caller; when present it must own the booking
    pub actor: Option<i64>,
}

/// PATCH /api/user/bookings/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<CancelQuery>, QueryRejection>,
) -> AppResult<Json<Booking>> {
    let Path(id) = path?;
    let Query(query) = query?;
    let booking = state.manager.cancel(&id, query.actor).await?;
    Ok(Json(booking))
}
