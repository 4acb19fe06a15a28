//! Pending rejections
//!
//! 管理员点击 "拒绝" 后等待填写理由的会话表，key 为管理员会话 (chat id)。
//! 只存在于进程内存，重启后丢失。

use dashmap::DashMap;
use shared::models::MessageRef;

/// Rejection waiting for the admin's free-text reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRejection {
    pub booking_id: String,
    /// Approval prompt that received the reject action
    pub original_message: MessageRef,
}

#[derive(Debug, Default)]
pub struct PendingRejections {
    entries: DashMap<i64, PendingRejection>,
}

impl PendingRejections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry for a conversation, returning the one it replaced
    pub fn register(&self, chat_id: i64, entry: PendingRejection) -> Option<PendingRejection> {
        self.entries.insert(chat_id, entry)
    }

    /// Remove and return the entry; at most one caller gets it
    pub fn take(&self, chat_id: i64) -> Option<PendingRejection> {
        self.entries.remove(&chat_id).map(|(_, entry)| entry)
    }

    pub fn get(&self, chat_id: i64) -> Option<PendingRejection> {
        self.entries.get(&chat_id).map(|e| e.value().clone())
    }

    pub fn contains(&self, chat_id: i64) -> bool {
        self.entries.contains_key(&chat_id)
    }

    /// Drop every entry that points at `booking_id`
    pub fn discard_booking(&self, booking_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.booking_id != booking_id);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
