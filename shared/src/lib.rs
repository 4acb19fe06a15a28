//! Shared types for the shop booking platform
//!
//! Domain models, request/response structures and the unified error types
//! used by booking-server and mirrored by the mini-app.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
