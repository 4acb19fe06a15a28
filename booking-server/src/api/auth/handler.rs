//! Auth API Handlers

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use shared::models::{UserResponse, UserUpsert, ValidateTelegramRequest};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::verify_init_data;
use crate::core::ServerState;

/// POST /api/auth/validate-telegram
pub async fn validate_telegram(
    State(state): State<ServerState>,
    payload: Result<Json<ValidateTelegramRequest>, JsonRejection>,
) -> AppResult<Json<UserResponse>> {
    let Json(req) = payload?;
    let init_data = req
        .init_data
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, "No initData provided"))?;

    let token = state.config.telegram_bot_token.as_deref().ok_or_else(|| {
        tracing::error!("validate-telegram called but TELEGRAM_BOT_TOKEN is not set");
        AppError::new(ErrorCode::ConfigError)
    })?;

    let verified = verify_init_data(&init_data, token).map_err(|e| {
        tracing::warn!(error = %e, "Rejected Telegram init data");
        AppError::from(e)
    })?;

    let user = state
        .users
        .upsert(UserUpsert {
            telegram_id: verified.user.id.to_string(),
            name: verified.user.display_name(),
            username: verified.user.username.clone(),
            ..Default::default()
        })
        .await?;
    tracing::info!(telegram_id = %user.telegram_id, "Telegram user validated");

    Ok(Json(UserResponse {
        message: "User validated successfully".to_string(),
        user,
    }))
}
