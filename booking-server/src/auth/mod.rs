//! 认证模块
//!
//! Mini-app login is verified with the Telegram WebApp signature; there are
//! no sessions or tokens of our own.

pub mod telegram;

pub use telegram::{InitData, InitDataError, WebAppUser, verify_init_data};
