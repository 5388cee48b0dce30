use std::future::Future;
use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error, SqlitePool,
};
use thiserror::Error;

pub mod memory;
pub mod models;

pub use memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] Error),
    #[error("Failed to serialize records: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A flat string-to-string store. The inventory keeps its whole record
/// sequence under a single key and overwrites it on every change.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, DatabaseError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

/// Key-value storage backed by a single SQLite table.
#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl KeyValueStorage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Opens (creating if needed) the SQLite database and makes sure the
/// key-value table exists.
pub async fn init_db(database_url: &str) -> Result<SqliteStorage, DatabaseError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // One connection keeps `sqlite::memory:` databases alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    ensure_schema(&pool).await?;

    Ok(SqliteStorage::new(pool))
}

async fn ensure_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key   TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
