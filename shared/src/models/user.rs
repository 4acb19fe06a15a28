//! User Model

use serde::{Deserialize, Serialize};

/// Registered Telegram user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Telegram user id (unique)
    pub telegram_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Fields written by an upsert; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpsert {
    pub telegram_id: String,
    pub name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// `POST /api/user/get-user` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetUserRequest {
    /// Telegram id; the mini-app sends either a number or a string
    pub id: Option<serde_json::Value>,
}

/// Envelope for single-user responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

/// `GET /api/user/profile/{telegramId}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub bookings: Vec<crate::models::BookingWithShop>,
}

/// `POST /api/auth/validate-telegram` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTelegramRequest {
    pub init_data: Option<String>,
}
