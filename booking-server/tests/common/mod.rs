//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use booking_server::bookings::{Action, Notifier, NotifyError};
use booking_server::db::DbService;
use booking_server::db::repository::{BookingRepository, ShopRepository, UserRepository};
use booking_server::{Config, ServerState};
use serde_json::json;
use shared::models::{MessageRef, Shop};
use tempfile::TempDir;

pub const ADMIN_CHAT: i64 = 1;

/// Records every outbound message
#[derive(Default)]
pub struct CapturingNotifier {
    next_id: AtomicI32,
    pub sent: Mutex<Vec<(i64, String, Vec<String>)>>,
    pub edits: Mutex<Vec<(MessageRef, String)>>,
}

impl CapturingNotifier {
    pub fn sent_to(&self, chat_id: i64) -> Vec<(String, Vec<String>)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(chat, _, _)| *chat == chat_id)
            .map(|(_, text, actions)| (text.clone(), actions.clone()))
            .collect()
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        actions: &[Action],
    ) -> Result<MessageRef, NotifyError> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().unwrap().push((
            chat_id,
            text.to_string(),
            actions.iter().map(|a| a.payload.clone()).collect(),
        ));
        Ok(MessageRef {
            chat_id,
            message_id,
        })
    }

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), NotifyError> {
        self.edits.lock().unwrap().push((message, text.to_string()));
        Ok(())
    }

    async fn request_reply(&self, chat_id: i64, text: &str) -> Result<MessageRef, NotifyError> {
        self.send(chat_id, text, &[]).await
    }
}

pub fn shop(id: i64, name: &str) -> Shop {
    serde_json::from_value(json!({
        "id": id,
        "name": { "en": name, "uz": name, "ru": name },
        "category": "Barbershop",
        "rating": 4.5,
        "priceTier": 2,
        "workingHours": [
            { "days": ["Monday", "Friday"], "from": "09:00", "to": "18:00" }
        ],
    }))
    .unwrap()
}

pub async fn open_db(tmp: &TempDir) -> DbService {
    DbService::open(tmp.path().join("database"), "test", "test")
        .await
        .unwrap()
}

/// Full server state on a RocksDB instance in `tmp`
pub async fn test_state(tmp: &TempDir, shops: Vec<Shop>) -> (ServerState, Arc<CapturingNotifier>) {
    let db = open_db(tmp).await;
    let shop_repo = ShopRepository::new(db.db.clone());
    for s in shops {
        shop_repo.upsert(s).await.unwrap();
    }

    let notifier = Arc::new(CapturingNotifier::default());
    let mut config = Config::for_tests(tmp.path().to_string_lossy().to_string());
    config.telegram_bot_token = Some("123456:TEST-TOKEN".into());

    let state = ServerState::from_parts(
        config,
        Arc::new(BookingRepository::new(db.db.clone())),
        Arc::new(shop_repo),
        Arc::new(UserRepository::new(db.db)),
        notifier.clone(),
    );
    (state, notifier)
}
