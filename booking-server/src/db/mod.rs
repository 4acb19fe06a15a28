//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) and schema definitions

pub mod repository;

use std::path::Path;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// 表和索引定义 (幂等，启动时执行)
const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS booking SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS booking_booking_id ON booking FIELDS booking_id UNIQUE;
    DEFINE INDEX IF NOT EXISTS booking_user ON booking FIELDS user_telegram_id;
    DEFINE INDEX IF NOT EXISTS booking_shop ON booking FIELDS shop_id;
    DEFINE TABLE IF NOT EXISTS shop SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS shop_catalog_id ON shop FIELDS catalog_id UNIQUE;
    DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS user_telegram_id ON user FIELDS telegram_id UNIQUE;
";

/// Database service, owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database under `path` and apply the schema
    pub async fn open(path: impl AsRef<Path>, namespace: &str, database: &str) -> Result<Self, AppError> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)
            .map_err(|e| AppError::database(format!("Failed to create database dir: {e}")))?;

        let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        tracing::info!(path = %path.display(), namespace, database, "Database connection established (SurrealDB RocksDB)");

        Self::define_schema(&db).await?;

        Ok(Self { db })
    }

    /// 定义表和索引
    pub async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
        db.query(SCHEMA)
            .await
            .and_then(|res| res.check())
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;
        tracing::info!("Database schema applied");
        Ok(())
    }
}
