//! User API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/user/get-user | POST | 按 Telegram id 查询用户 |
//! | /api/user/profile/{telegramId} | GET | 用户资料 + 预约历史 |
//! | /api/user/bookings/{id}/cancel | PATCH | 取消预约 |

pub(crate) mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/user", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/get-user", post(handler::get_user))
        .route("/profile/{telegram_id}", get(handler::profile))
        .route("/bookings/{id}/cancel", patch(handler::cancel))
}
