//! Database models for the `door_status` table.

use chrono::{DateTime, Utc};

/// A stored row from the `door_status` table.
///
/// Records are append-only: never updated, never deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusRecord {
    /// Auto-increment row ID.
    pub id: i64,
    /// Decoded message payload, stored verbatim.
    pub status: String,
    /// Server-side insert timestamp (`DEFAULT CURRENT_TIMESTAMP`).
    pub recorded_at: DateTime<Utc>,
}
