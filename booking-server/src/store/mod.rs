//! Store traits - 核心组件消费的数据存储能力
//!
//! The lifecycle manager and discovery engine only see these traits; the
//! SurrealDB implementations live in [`crate::db::repository`].
//!
//! # 一致性原语
//!
//! | 操作 | 语义 |
//! |------|------|
//! | `BookingStore::insert` | 单条 CREATE |
//! | `BookingStore::transition` | 条件更新 (status 必须在期望集合内) |
//! | `UserStore::upsert` | 按 Telegram id 单条 UPSERT |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{
    Booking, BookingStatus, Locale, MessageRef, NewBooking, Shop, ShopCategory, User, UserUpsert,
};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Booking persistence
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a new `pending` booking with a fresh id
    async fn insert(&self, draft: NewBooking) -> RepoResult<Booking>;

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>>;

    /// Compare-and-set status write.
    ///
    /// Applies only while the stored status is one of `expected`; returns the
    /// updated booking, or `None` when the record is missing or its status
    /// moved on.
    async fn transition(
        &self,
        id: &str,
        expected: &[BookingStatus],
        next: BookingStatus,
        rejection_reason: Option<String>,
    ) -> RepoResult<Option<Booking>>;

    async fn set_admin_message(&self, id: &str, message: MessageRef) -> RepoResult<()>;

    /// All bookings of one requester, newest first
    async fn find_by_user(&self, user_telegram_id: i64) -> RepoResult<Vec<Booking>>;

    /// Confirmed bookings of a shop whose requested time is after `after`
    async fn find_confirmed_after(
        &self,
        shop_id: i64,
        after: DateTime<Utc>,
    ) -> RepoResult<Vec<Booking>>;
}

/// Read-only shop catalog (the "match" stage of every discovery query)
#[async_trait]
pub trait ShopCatalog: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Shop>>;

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Shop>>;

    async fn find_matching(&self, filter: &ShopFilter) -> RepoResult<Vec<Shop>>;
}

/// User persistence keyed by Telegram id
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_telegram_id(&self, telegram_id: &str) -> RepoResult<Option<User>>;

    /// Atomic insert-or-update; `None` fields keep their stored value
    async fn upsert(&self, user: UserUpsert) -> RepoResult<User>;
}

/// Case-insensitive name match
#[derive(Debug, Clone, PartialEq)]
pub enum NameMatch {
    /// Substring of the name in one display locale
    InLocale(Locale, String),
    /// Substring of the name in any locale
    AnyLocale(String),
}

impl NameMatch {
    /// Lower-cased needle
    pub fn needle(&self) -> String {
        match self {
            NameMatch::InLocale(_, s) | NameMatch::AnyLocale(s) => s.to_lowercase(),
        }
    }

    pub fn matches(&self, shop: &Shop) -> bool {
        let needle = self.needle();
        match self {
            NameMatch::InLocale(locale, _) => {
                shop.name.get(*locale).to_lowercase().contains(&needle)
            }
            NameMatch::AnyLocale(_) => Locale::ALL
                .iter()
                .any(|l| shop.name.get(*l).to_lowercase().contains(&needle)),
        }
    }
}

/// Catalog filter; operational shops only unless `include_closed`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopFilter {
    pub include_closed: bool,
    pub category: Option<ShopCategory>,
    pub price_tiers: Vec<u8>,
    pub editors_choice: Option<bool>,
    pub name: Option<NameMatch>,
}

impl ShopFilter {
    /// Every operational shop
    pub fn operational() -> Self {
        Self::default()
    }

    pub fn matches(&self, shop: &Shop) -> bool {
        if !self.include_closed && !shop.is_operational {
            return false;
        }
        if let Some(category) = self.category
            && shop.category != category
        {
            return false;
        }
        if !self.price_tiers.is_empty()
            && !shop
                .price_tier
                .is_some_and(|tier| self.price_tiers.contains(&tier))
        {
            return false;
        }
        if let Some(flag) = self.editors_choice
            && shop.is_editors_choice != flag
        {
            return false;
        }
        self.name.as_ref().is_none_or(|name| name.matches(shop))
    }
}
