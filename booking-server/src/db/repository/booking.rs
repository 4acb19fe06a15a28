//! Booking Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Booking, BookingStatus, MessageRef, NewBooking};
use shared::util::{millis_to_datetime, now_millis};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use crate::store::{BookingStore, RepoError, RepoResult};

/// 存储行 (时间戳为毫秒，status 为字符串)
///
/// The record key and `booking_id` carry the same value so reads never need
/// to decode the SurrealDB record id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookingRow {
    booking_id: String,
    shop_id: i64,
    shop_name: String,
    user_telegram_id: i64,
    #[serde(default)]
    user_telegram_username: Option<String>,
    user_number: String,
    #[serde(default)]
    user_telegram_number: Option<String>,
    requested_time: i64,
    status: String,
    #[serde(default)]
    rejection_reason: Option<String>,
    #[serde(default)]
    admin_chat_id: Option<i64>,
    #[serde(default)]
    admin_message_id: Option<i32>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse().map_err(RepoError::Database)?;
        let admin_message = match (row.admin_chat_id, row.admin_message_id) {
            (Some(chat_id), Some(message_id)) => Some(MessageRef {
                chat_id,
                message_id,
            }),
            _ => None,
        };
        Ok(Booking {
            id: row.booking_id,
            shop_id: row.shop_id,
            shop_name: row.shop_name,
            user_telegram_id: row.user_telegram_id,
            user_telegram_username: row.user_telegram_username,
            user_number: row.user_number,
            user_telegram_number: row.user_telegram_number,
            requested_time: millis_to_datetime(row.requested_time),
            status,
            rejection_reason: row.rejection_reason,
            admin_message,
            created_at: millis_to_datetime(row.created_at),
            updated_at: millis_to_datetime(row.updated_at),
        })
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> RepoResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[derive(Clone)]
pub struct BookingRepository {
    db: Surreal<Db>,
}

impl BookingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn insert(&self, draft: NewBooking) -> RepoResult<Booking> {
        let id = Uuid::new_v4().simple().to_string();
        let now = now_millis();
        let row = BookingRow {
            booking_id: id.clone(),
            shop_id: draft.shop_id,
            shop_name: draft.shop_name,
            user_telegram_id: draft.user_telegram_id,
            user_telegram_username: draft.user_telegram_username,
            user_number: draft.user_number,
            user_telegram_number: draft.user_telegram_number,
            requested_time: draft.requested_time.timestamp_millis(),
            status: BookingStatus::Pending.as_str().to_string(),
            rejection_reason: None,
            admin_chat_id: None,
            admin_message_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut result = self
            .db
            .query("CREATE type::thing('booking', $id) CONTENT $data")
            .bind(("id", id.clone()))
            .bind(("data", row))
            .await?;
        let created: Vec<BookingRow> = result.take(0)?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database(format!("Failed to create booking {id}")))
            .and_then(Booking::try_from)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        let mut result = self
            .db
            .query("SELECT * FROM booking WHERE booking_id = $id LIMIT 1")
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<BookingRow> = result.take(0)?;
        rows.into_iter().next().map(Booking::try_from).transpose()
    }

    async fn transition(
        &self,
        id: &str,
        expected: &[BookingStatus],
        next: BookingStatus,
        rejection_reason: Option<String>,
    ) -> RepoResult<Option<Booking>> {
        let expected: Vec<String> = expected.iter().map(|s| s.as_str().to_string()).collect();

        // 单条语句完成比较并写入
        let mut result = self
            .db
            .query(
                "UPDATE booking SET status = $next, rejection_reason = $reason, updated_at = $now \
                 WHERE booking_id = $id AND status INSIDE $expected RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("next", next.as_str().to_string()))
            .bind(("reason", rejection_reason))
            .bind(("now", now_millis()))
            .bind(("expected", expected))
            .await?;
        let rows: Vec<BookingRow> = result.take(0)?;
        rows.into_iter().next().map(Booking::try_from).transpose()
    }

    async fn set_admin_message(&self, id: &str, message: MessageRef) -> RepoResult<()> {
        let mut result = self
            .db
            .query(
                "UPDATE booking SET admin_chat_id = $chat_id, admin_message_id = $message_id \
                 WHERE booking_id = $id RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("chat_id", message.chat_id))
            .bind(("message_id", message.message_id))
            .await?;
        let rows: Vec<BookingRow> = result.take(0)?;
        if rows.is_empty() {
            return Err(RepoError::NotFound(format!("booking {id}")));
        }
        Ok(())
    }

    async fn find_by_user(&self, user_telegram_id: i64) -> RepoResult<Vec<Booking>> {
        let mut result = self
            .db
            .query("SELECT * FROM booking WHERE user_telegram_id = $user ORDER BY created_at DESC")
            .bind(("user", user_telegram_id))
            .await?;
        into_bookings(result.take(0)?)
    }

    async fn find_confirmed_after(
        &self,
        shop_id: i64,
        after: DateTime<Utc>,
    ) -> RepoResult<Vec<Booking>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM booking WHERE shop_id = $shop AND status = 'confirmed' \
                 AND requested_time > $after ORDER BY requested_time ASC",
            )
            .bind(("shop", shop_id))
            .bind(("after", after.timestamp_millis()))
            .await?;
        into_bookings(result.take(0)?)
    }
}
