//! Telegram bot
//!
//! - [`TelegramNotifier`] - 通过 Bot API 发送/编辑消息
//! - [`BotService`] - 长轮询调度器 (注册、管理员审批)

pub mod dispatcher;
pub mod notifier;

pub use dispatcher::BotService;
pub use notifier::TelegramNotifier;
