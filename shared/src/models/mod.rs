//! Data models
//!
//! Shared between booking-server and the mini-app (via API).
//! JSON field names are camelCase to match the front end.

pub mod booking;
pub mod shop;
pub mod user;

// Re-exports
pub use booking::*;
pub use shop::*;
pub use user::*;
