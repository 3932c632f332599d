//! SQLite-backed storage for durable local cart state.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::backend::{StorageBackend, StorageError};

/// SQLite-backed key-value storage.
///
/// One table, one row per key; values are opaque strings owned by the caller.
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if necessary) a database at `path`.
    ///
    /// Parent directories are created, and the schema is applied on open.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::open(format!(
                    "failed to create storage directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        tracing::debug!(path = %path.display(), "opening cart storage");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| StorageError::open(format!("{}: {e}", path.display())))?;

        Self::with_pool(pool).await
    }

    /// Open the database at the default location.
    ///
    /// `$TROLLEY_DB` wins when set; otherwise the platform data directory is
    /// used (`{data_dir}/trolley/cart.db`).
    pub async fn open_default() -> Result<Self, StorageError> {
        Self::open(default_db_path()?).await
    }

    /// Open a private in-memory database (tests/dev).
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::open(e.to_string()))?;

        // A single connection, so every query sees the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::open(e.to_string()))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::open(format!("failed to create kv_store table: {e}")))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value: Option<String> = sqlx::query_scalar(
            r#"
            SELECT value
            FROM kv_store
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::read(e.to_string()))?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::write(e.to_string()))?;

        Ok(())
    }
}

/// Resolve the default database path: `$TROLLEY_DB`, else
/// `{data_dir}/trolley/cart.db`.
fn default_db_path() -> Result<PathBuf, StorageError> {
    if let Some(path) = std::env::var_os("TROLLEY_DB") {
        return Ok(PathBuf::from(path));
    }

    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut home| {
                home.push(".local");
                home.push("share");
                home
            })
        })
        .ok_or_else(|| StorageError::open("failed to resolve OS data directory"))?;

    let mut path = base;
    path.push("trolley");
    path.push("cart.db");
    Ok(path)
}
