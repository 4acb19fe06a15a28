//! Notifier capability
//!
//! The lifecycle manager talks to chat users only through [`Notifier`].
//! [`crate::bot::TelegramNotifier`] is the production implementation;
//! [`LogNotifier`] stands in when no bot token is configured.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shared::models::MessageRef;
use thiserror::Error;

/// Inline action attached to a message (button label + callback payload)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub payload: String,
}

impl Action {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier transport error: {0}")]
    Transport(String),

    #[error("Notifier timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` with optional action buttons
    async fn send(&self, chat_id: i64, text: &str, actions: &[Action])
    -> Result<MessageRef, NotifyError>;

    /// Replace the text of a sent message; any action buttons are dropped
    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), NotifyError>;

    /// Send `text` as a prompt the recipient answers with a reply
    async fn request_reply(&self, chat_id: i64, text: &str) -> Result<MessageRef, NotifyError>;
}

/// 无 bot token 时使用：只写日志
#[derive(Debug, Default)]
pub struct LogNotifier {
    next_id: AtomicI32,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_ref(&self, chat_id: i64) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        actions: &[Action],
    ) -> Result<MessageRef, NotifyError> {
        let message = self.next_ref(chat_id);
        let actions: Vec<&str> = actions.iter().map(|a| a.payload.as_str()).collect();
        tracing::info!(chat_id, message_id = message.message_id, ?actions, text, "Notify (bot disabled)");
        Ok(message)
    }

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), NotifyError> {
        tracing::info!(chat_id = message.chat_id, message_id = message.message_id, text, "Edit (bot disabled)");
        Ok(())
    }

    async fn request_reply(&self, chat_id: i64, text: &str) -> Result<MessageRef, NotifyError> {
        let message = self.next_ref(chat_id);
        tracing::info!(chat_id, message_id = message.message_id, text, "Reply request (bot disabled)");
        Ok(message)
    }
}
