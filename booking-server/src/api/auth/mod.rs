//! Auth API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/auth/validate-telegram | POST | 校验 WebApp initData 并登记用户 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/auth",
        Router::new().route("/validate-telegram", post(handler::validate_telegram)),
    )
}
