//! Shops API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/shops/get-user | POST | 同 /api/user/get-user |
//! | /api/shops/home-feed | GET | 按分类的推荐店铺 |
//! | /api/shops/search-shops | POST | 过滤、排序、分页搜索 |
//! | /api/shops/discovery-search | POST | 发现页分区 |
//! | /api/shops/booking-requests | POST | 提交预约 |
//! | /api/shops/service/{id}/availability | GET | 营业时间 + 已确认时段 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::user::handler::get_user;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/shops", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/get-user", post(get_user))
        .route("/home-feed", get(handler::home_feed))
        .route("/search-shops", post(handler::search_shops))
        .route("/discovery-search", post(handler::discovery_search))
        .route("/booking-requests", post(handler::create_booking))
        .route("/service/{id}/availability", get(handler::availability))
}
