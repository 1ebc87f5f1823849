//! SQLite implementation of the status sink.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::StatusSink;
use crate::error::BridgeError;

/// Schema of the sole persisted table. `recorded_at` is assigned by the
/// database at insert time.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS door_status (\
     id          INTEGER PRIMARY KEY AUTOINCREMENT, \
     status      TEXT NOT NULL, \
     recorded_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP)";

/// SQLite-backed persister using `sqlx::SqlitePool`.
///
/// The pool is capped at a single connection: there is exactly one writer
/// and each insert is its own implicit transaction, so no further locking
/// discipline is needed. Acquisition is scoped per call with guaranteed
/// release on every exit path.
#[derive(Debug, Clone)]
pub struct SqlitePersister {
    pool: SqlitePool,
}

impl SqlitePersister {
    /// Opens the database file, creating it if absent, and applies the
    /// schema.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Storage`] if the file cannot be opened or
    /// created (e.g. the parent directory does not exist or is not
    /// writable), or if the schema statement fails.
    pub async fn connect(path: &Path) -> Result<Self, BridgeError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::Storage(e.to_string()))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StatusSink for SqlitePersister {
    async fn record_status(&self, status: &str) -> Result<i64, BridgeError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO door_status (status) VALUES (?1) RETURNING id",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BridgeError::Storage(e.to_string()))?;

        Ok(id)
    }
}
