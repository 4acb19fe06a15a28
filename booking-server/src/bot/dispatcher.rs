//! Telegram bot dispatcher
//!
//! - `/start` 请求分享手机号
//! - contact 消息完成注册 (upsert 用户)
//! - 管理员会话中的文本作为拒绝理由
//! - inline 按钮回调 `confirm_<id>` / `reject_<id>`

use std::sync::Arc;

use shared::models::{MessageRef, UserUpsert};
use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, KeyboardButton, KeyboardMarkup, MaybeInaccessibleMessage, UserId, WebAppInfo,
};
use tracing::{debug, error, info, warn};

use crate::bookings::{BookingError, BookingManager, DecisionAction};
use crate::store::UserStore;

const WELCOME: &str = "Welcome! Please share your phone number to register:";
const SHARE_PHONE: &str = "📱 Send My Phone Number";
const OWN_NUMBER_ONLY: &str = "Please share your own phone number.";
const REGISTERED: &str = "✅ You are now registered! You can open the app below.";
const REGISTRATION_FAILED: &str =
    "❌ Something went wrong with the registration. Please try again later.";
const OPEN_APP: &str = "🚀 Open the app";

pub struct BotService {
    bot: Bot,
    manager: Arc<BookingManager>,
    users: Arc<dyn UserStore>,
    bot_token: String,
    web_app_url: Option<url::Url>,
}

impl BotService {
    pub fn new(
        bot: Bot,
        manager: Arc<BookingManager>,
        users: Arc<dyn UserStore>,
        bot_token: String,
        web_app_url: Option<String>,
    ) -> Self {
        let web_app_url = web_app_url.and_then(|raw| match url::Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(url = %raw, error = %e, "Ignoring invalid WEB_APP_URL");
                None
            }
        });
        Self {
            bot,
            manager,
            users,
            bot_token,
            web_app_url,
        }
    }

    /// Long-poll until ctrl-c
    pub async fn run(self: Arc<Self>) {
        info!("Starting Telegram bot dispatcher");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint({
                let service = Arc::clone(&self);
                move |msg: Message, bot: Bot| {
                    let service = Arc::clone(&service);
                    async move {
                        service.handle_message(msg, bot).await;
                        respond(())
                    }
                }
            }))
            .branch(Update::filter_callback_query().endpoint({
                let service = Arc::clone(&self);
                move |q: CallbackQuery, bot: Bot| {
                    let service = Arc::clone(&service);
                    async move {
                        service.handle_callback(q, bot).await;
                        respond(())
                    }
                }
            }));

        Dispatcher::builder(self.bot.clone(), handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    // ========== Messages ==========

    async fn handle_message(&self, msg: Message, bot: Bot) {
        if msg.contact().is_some() {
            self.handle_contact(&msg, &bot).await;
            return;
        }

        let Some(text) = msg.text() else {
            return;
        };

        if text.starts_with("/start") {
            let keyboard = KeyboardMarkup::new(vec![vec![
                KeyboardButton::new(SHARE_PHONE).request(ButtonRequest::Contact),
            ]])
            .resize_keyboard()
            .one_time_keyboard();
            if let Err(e) = bot.send_message(msg.chat.id, WELCOME).reply_markup(keyboard).await {
                warn!(chat_id = msg.chat.id.0, error = %e, "Failed to send welcome");
            }
            return;
        }

        if msg.chat.id.0 == self.manager.admin_chat_id() {
            self.handle_admin_text(&msg, &bot, text).await;
        }
    }

    async fn handle_admin_text(&self, msg: &Message, bot: &Bot, text: &str) {
        let reply = match self.manager.supply_rejection_reason(msg.chat.id.0, text).await {
            Ok(Some(booking)) => {
                debug!(booking_id = %booking.id, "Rejection reason recorded");
                return;
            }
            Ok(None) => return,
            Err(BookingError::Validation(reason)) => reason,
            Err(e @ BookingError::InvalidTransition { .. }) => e.to_string(),
            Err(e) => {
                error!(error = %e, "Failed to record rejection reason");
                return;
            }
        };
        if let Err(e) = bot.send_message(msg.chat.id, reply).await {
            warn!(error = %e, "Failed to reply to admin");
        }
    }

    async fn handle_contact(&self, msg: &Message, bot: &Bot) {
        let Some(contact) = msg.contact() else {
            return;
        };
        let Some(from) = msg.from.as_ref() else {
            return;
        };

        if contact.user_id != Some(from.id) {
            if let Err(e) = bot.send_message(msg.chat.id, OWN_NUMBER_ONLY).await {
                warn!(error = %e, "Failed to send contact refusal");
            }
            return;
        }

        let name = match &from.last_name {
            Some(last) => format!("{} {}", from.first_name, last),
            None => from.first_name.clone(),
        };
        let upsert = UserUpsert {
            telegram_id: from.id.0.to_string(),
            name: name.trim().to_string(),
            username: from.username.clone(),
            phone: Some(contact.phone_number.clone()),
            avatar: self.avatar_url(bot, from.id).await,
        };

        match self.users.upsert(upsert).await {
            Ok(user) => {
                info!(telegram_id = %user.telegram_id, "User registered");
                let mut request = bot.send_message(msg.chat.id, REGISTERED);
                if let Some(url) = self.web_app_url.clone() {
                    let keyboard = KeyboardMarkup::new(vec![vec![
                        KeyboardButton::new(OPEN_APP)
                            .request(ButtonRequest::WebApp(WebAppInfo { url })),
                    ]])
                    .resize_keyboard();
                    request = request.reply_markup(keyboard);
                }
                if let Err(e) = request.await {
                    warn!(error = %e, "Failed to confirm registration");
                }
            }
            Err(e) => {
                error!(telegram_id = from.id.0, error = %e, "Registration failed");
                if let Err(e) = bot.send_message(msg.chat.id, REGISTRATION_FAILED).await {
                    warn!(error = %e, "Failed to report registration failure");
                }
            }
        }
    }

    /// 头像获取失败不影响注册
    async fn avatar_url(&self, bot: &Bot, user_id: UserId) -> Option<String> {
        let photos = match bot.get_user_profile_photos(user_id).limit(1).await {
            Ok(photos) => photos,
            Err(e) => {
                warn!(error = %e, "Could not fetch profile photo, continuing without it");
                return None;
            }
        };
        let photo = photos.photos.first()?.first()?;
        match bot.get_file(photo.file.id.clone()).await {
            Ok(file) => Some(format!(
                "https://api.telegram.org/file/bot{}/{}",
                self.bot_token, file.path
            )),
            Err(e) => {
                warn!(error = %e, "Could not resolve profile photo file");
                None
            }
        }
    }

    // ========== Callbacks ==========

    async fn handle_callback(&self, q: CallbackQuery, bot: Bot) {
        let admin_message = match &q.message {
            Some(MaybeInaccessibleMessage::Regular(m)) => {
                admin_prompt(m.chat.id.0, m.id.0, self.manager.admin_chat_id())
            }
            _ => None,
        };
        let Some(admin_message) = admin_message else {
            warn!(user_id = q.from.id.0, "Ignoring callback outside the admin chat");
            answer_callback(&bot, &q).await;
            return;
        };

        match q.data.as_deref().and_then(DecisionAction::parse) {
            Some((action, booking_id)) => {
                match self.manager.decide(&booking_id, action, admin_message).await {
                    Ok(decision) => debug!(?decision, "Admin decision applied"),
                    Err(BookingError::InvalidTransition { id, from, .. }) => {
                        info!(booking_id = %id, status = %from, "Stale admin decision");
                        match self.manager.booking(&id).await {
                            Ok(booking) => {
                                self.manager.show_current_state(&booking, admin_message).await
                            }
                            Err(e) => warn!(error = %e, "Failed to reload booking"),
                        }
                    }
                    Err(e) => warn!(booking_id = %booking_id, error = %e, "Admin decision failed"),
                }
            }
            None => debug!(data = ?q.data, "Unrecognised callback payload"),
        }

        answer_callback(&bot, &q).await;
    }
}

/// 只接受管理员会话内的按钮
fn admin_prompt(chat_id: i64, message_id: i32, admin_chat_id: i64) -> Option<MessageRef> {
    (chat_id == admin_chat_id).then_some(MessageRef {
        chat_id,
        message_id,
    })
}

async fn answer_callback(bot: &Bot, q: &CallbackQuery) {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(error = %e, "Failed to answer callback query");
    }
}
