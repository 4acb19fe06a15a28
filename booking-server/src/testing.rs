//! In-memory fakes of the store and notifier traits for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use shared::models::{
    Booking, BookingStatus, MessageRef, NewBooking, Shop, User, UserUpsert,
};
use uuid::Uuid;

use crate::bookings::{Action, Notifier, NotifyError};
use crate::store::{BookingStore, RepoResult, ShopCatalog, ShopFilter, UserStore};

/// Minimal operational barbershop
pub fn shop(id: i64, name: &str) -> Shop {
    serde_json::from_value(json!({
        "id": id,
        "name": { "en": name, "uz": name, "ru": name },
        "category": "Barbershop",
        "rating": 4.0,
        "workingHours": [
            { "days": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"], "from": "09:00", "to": "20:00" }
        ],
    }))
    .unwrap()
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Bookings kept in insertion order
#[derive(Default)]
pub struct MemoryBookingStore {
    rows: Mutex<Vec<Booking>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Booking> {
        self.rows.lock().unwrap().iter().find(|b| b.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Booking> {
        self.rows.lock().unwrap().clone()
    }

    /// Overwrite a status without any transition check
    pub fn force_status(&self, id: &str, status: BookingStatus) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(b) = rows.iter_mut().find(|b| b.id == id) {
            b.status = status;
        }
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn insert(&self, draft: NewBooking) -> RepoResult<Booking> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4().simple().to_string(),
            shop_id: draft.shop_id,
            shop_name: draft.shop_name,
            user_telegram_id: draft.user_telegram_id,
            user_telegram_username: draft.user_telegram_username,
            user_number: draft.user_number,
            user_telegram_number: draft.user_telegram_number,
            requested_time: draft.requested_time,
            status: BookingStatus::Pending,
            rejection_reason: None,
            admin_message: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        Ok(self.get(id))
    }

    async fn transition(
        &self,
        id: &str,
        expected: &[BookingStatus],
        next: BookingStatus,
        rejection_reason: Option<String>,
    ) -> RepoResult<Option<Booking>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(b) = rows.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if !expected.contains(&b.status) {
            return Ok(None);
        }
        b.status = next;
        b.rejection_reason = rejection_reason;
        b.updated_at = Utc::now();
        Ok(Some(b.clone()))
    }

    async fn set_admin_message(&self, id: &str, message: MessageRef) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(b) = rows.iter_mut().find(|b| b.id == id) {
            b.admin_message = Some(message);
        }
        Ok(())
    }

    async fn find_by_user(&self, user_telegram_id: i64) -> RepoResult<Vec<Booking>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|b| b.user_telegram_id == user_telegram_id)
            .cloned()
            .collect())
    }

    async fn find_confirmed_after(
        &self,
        shop_id: i64,
        after: DateTime<Utc>,
    ) -> RepoResult<Vec<Booking>> {
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<Booking> = rows
            .iter()
            .filter(|b| {
                b.shop_id == shop_id
                    && b.status == BookingStatus::Confirmed
                    && b.requested_time > after
            })
            .cloned()
            .collect();
        found.sort_by_key(|b| b.requested_time);
        Ok(found)
    }
}

pub struct MemoryShopCatalog {
    shops: Vec<Shop>,
}

impl MemoryShopCatalog {
    pub fn new(shops: Vec<Shop>) -> Self {
        Self { shops }
    }
}

#[async_trait]
impl ShopCatalog for MemoryShopCatalog {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Shop>> {
        Ok(self.shops.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Shop>> {
        Ok(self
            .shops
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn find_matching(&self, filter: &ShopFilter) -> RepoResult<Vec<Shop>> {
        Ok(self
            .shops
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_telegram_id(&self, telegram_id: &str) -> RepoResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.telegram_id == telegram_id).cloned())
    }

    async fn upsert(&self, user: UserUpsert) -> RepoResult<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.telegram_id == user.telegram_id) {
            existing.name = user.name;
            if user.username.is_some() {
                existing.username = user.username;
            }
            if user.phone.is_some() {
                existing.phone = user.phone;
            }
            if user.avatar.is_some() {
                existing.avatar = user.avatar;
            }
            return Ok(existing.clone());
        }
        let created = User {
            telegram_id: user.telegram_id,
            name: user.name,
            username: user.username,
            phone: user.phone,
            email: None,
            avatar: user.avatar,
        };
        users.push(created.clone());
        Ok(created)
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// A recorded `send` / `request_reply` call
#[derive(Debug, Clone)]
pub struct Sent {
    pub chat_id: i64,
    pub text: String,
    /// Action payloads in order
    pub actions: Vec<String>,
}

#[derive(Default)]
pub struct RecordingNotifier {
    next_id: AtomicI32,
    failing: AtomicBool,
    stall: Mutex<Option<Duration>>,
    sent: Mutex<Vec<Sent>>,
    edits: Mutex<Vec<(MessageRef, String)>>,
    replies: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every call hang for `duration` before answering
    pub fn stall(&self, duration: Duration) {
        *self.stall.lock().unwrap() = Some(duration);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id == chat_id)
            .collect()
    }

    pub fn edits(&self) -> Vec<(MessageRef, String)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn reply_requests(&self) -> Vec<Sent> {
        self.replies.lock().unwrap().clone()
    }

    async fn gate(&self) -> Result<(), NotifyError> {
        let stall = *self.stall.lock().unwrap();
        if let Some(duration) = stall {
            tokio::time::sleep(duration).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("chat unreachable".into()));
        }
        Ok(())
    }

    fn next_ref(&self, chat_id: i64) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        actions: &[Action],
    ) -> Result<MessageRef, NotifyError> {
        self.gate().await?;
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            actions: actions.iter().map(|a| a.payload.clone()).collect(),
        });
        Ok(self.next_ref(chat_id))
    }

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), NotifyError> {
        self.gate().await?;
        self.edits.lock().unwrap().push((message, text.to_string()));
        Ok(())
    }

    async fn request_reply(&self, chat_id: i64, text: &str) -> Result<MessageRef, NotifyError> {
        self.gate().await?;
        self.replies.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            actions: Vec::new(),
        });
        Ok(self.next_ref(chat_id))
    }
}
