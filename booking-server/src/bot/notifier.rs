//! Telegram implementation of [`Notifier`]

use async_trait::async_trait;
use shared::models::MessageRef;
use teloxide::prelude::*;
use teloxide::types::{ForceReply, InlineKeyboardButton, InlineKeyboardMarkup, MessageId};

use crate::bookings::{Action, Notifier, NotifyError};

fn transport(err: teloxide::RequestError) -> NotifyError {
    NotifyError::Transport(err.to_string())
}

fn message_ref(msg: &Message) -> MessageRef {
    MessageRef {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
    }
}

/// Action buttons on a single row
fn keyboard(actions: &[Action]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        actions
            .iter()
            .map(|a| InlineKeyboardButton::callback(a.label.clone(), a.payload.clone()))
            .collect::<Vec<_>>(),
    ])
}

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        actions: &[Action],
    ) -> Result<MessageRef, NotifyError> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if !actions.is_empty() {
            request = request.reply_markup(keyboard(actions));
        }
        let msg = request.await.map_err(transport)?;
        Ok(message_ref(&msg))
    }

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), NotifyError> {
        // 不带 reply_markup：按钮随之移除
        self.bot
            .edit_message_text(ChatId(message.chat_id), MessageId(message.message_id), text)
            .await
            .map_err(transport)?;
        Ok(())
    }

    async fn request_reply(&self, chat_id: i64, text: &str) -> Result<MessageRef, NotifyError> {
        let msg = self
            .bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(ForceReply::new())
            .await
            .map_err(transport)?;
        Ok(message_ref(&msg))
    }
}
