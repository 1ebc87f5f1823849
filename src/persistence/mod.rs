//! Persistence layer: durable `door_status` records in SQLite.
//!
//! [`StatusSink`] is the handler interface between the broker layer and
//! storage. The broker never sees stored data; it only hands decoded
//! payloads to the sink, one at a time.

pub mod models;
pub mod sqlite;

use async_trait::async_trait;

pub use models::StatusRecord;
pub use sqlite::SqlitePersister;

use crate::error::BridgeError;

/// Receives decoded status payloads from the broker layer.
///
/// Implementations must persist each payload atomically: either the full
/// record appears or none of it does. One call per received message;
/// calls are never concurrent.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Persists one decoded status payload, returning the new row ID.
    ///
    /// The row's timestamp is assigned by the storage layer at insert
    /// time, never by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Storage`] if the record could not be
    /// written. The caller reports the failure and keeps processing
    /// subsequent messages; the failed event's data is lost.
    async fn record_status(&self, status: &str) -> Result<i64, BridgeError>;
}
