//! Bridge error types.
//!
//! [`BridgeError`] is the central error type. Every failure is handled at
//! the point of occurrence: per-message errors (decode, storage) are logged
//! and the receive loop continues; connection errors end the loop; startup
//! errors (config, opening the database) propagate out of `main`.

use std::str::Utf8Error;

/// Central error enum for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Configuration could not be loaded or validated.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The broker refused the session or the transport failed.
    #[error("broker connection error: {0}")]
    Connection(String),

    /// A message payload was not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Decode(#[from] Utf8Error),

    /// The storage layer failed to persist or open the record store.
    #[error("storage error: {0}")]
    Storage(String),
}
