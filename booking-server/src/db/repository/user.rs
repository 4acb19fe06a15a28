//! User Repository

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{User, UserUpsert};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::store::{RepoError, RepoResult, UserStore};

#[derive(Debug, Clone, Deserialize)]
struct UserRow {
    telegram_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            telegram_id: r.telegram_id,
            name: r.name,
            username: r.username,
            phone: r.phone,
            email: r.email,
            avatar: r.avatar,
        }
    }
}

/// MERGE 内容；None 字段不写入，保留原值
#[derive(Debug, Serialize)]
struct UserMerge {
    telegram_id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    db: Surreal<Db>,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_telegram_id(&self, telegram_id: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .db
            .query("SELECT * FROM user WHERE telegram_id = $tid LIMIT 1")
            .bind(("tid", telegram_id.to_string()))
            .await?;
        let rows: Vec<UserRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(User::from))
    }

    async fn upsert(&self, user: UserUpsert) -> RepoResult<User> {
        let telegram_id = user.telegram_id.trim().to_string();
        if telegram_id.is_empty() {
            return Err(RepoError::Validation("telegram id must not be empty".into()));
        }

        let data = UserMerge {
            telegram_id: telegram_id.clone(),
            name: user.name,
            username: user.username,
            phone: user.phone,
            avatar: user.avatar,
        };

        // 以 Telegram id 作为记录 key，单条语句完成插入或更新
        let mut result = self
            .db
            .query("UPSERT type::thing('user', $tid) MERGE $data")
            .bind(("tid", telegram_id.clone()))
            .bind(("data", data))
            .await?;
        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(User::from)
            .ok_or_else(|| RepoError::Database(format!("Failed to upsert user {telegram_id}")))
    }
}
