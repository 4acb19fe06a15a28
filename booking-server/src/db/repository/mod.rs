//! Repository Module
//!
//! SurrealDB implementations of the store traits in [`crate::store`].
//!
//! 约定: 每张表保存一个普通字段作为业务 id (`booking_id` / `catalog_id` /
//! `telegram_id`)，查询只按该字段进行，不解析 SurrealDB record id。

pub mod booking;
pub mod shop;
pub mod user;

// Re-exports
pub use booking::BookingRepository;
pub use shop::ShopRepository;
pub use user::UserRepository;

pub use crate::store::{RepoError, RepoResult};
