//! Bridge configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`) with defaults matching the original
//! deployment: a local broker on port 1883, topic `test`, database file
//! `door_data.db` in the working directory.

use std::path::PathBuf;

use crate::error::BridgeError;

/// Top-level bridge configuration.
///
/// Loaded once at startup via [`BridgeConfig::from_env`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Broker hostname or IP address.
    pub broker_host: String,

    /// Broker TCP port.
    pub broker_port: u16,

    /// MQTT keepalive interval in seconds.
    pub keepalive_secs: u64,

    /// Topic to subscribe to.
    pub topic: String,

    /// Client identifier presented to the broker.
    pub client_id: String,

    /// Path of the SQLite database file; created on first use if absent.
    pub database_path: PathBuf,
}

impl BridgeConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or does not
    /// parse. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if `BROKER_HOST`, `BROKER_TOPIC`,
    /// `MQTT_CLIENT_ID`, or `DATABASE_PATH` is set to an empty string.
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok();

        let broker_host = non_empty("BROKER_HOST", "localhost")?;
        let broker_port = parse_env("BROKER_PORT", 1883);
        let keepalive_secs = parse_env("BROKER_KEEPALIVE_SECS", 60);
        let topic = non_empty("BROKER_TOPIC", "test")?;
        let client_id = non_empty("MQTT_CLIENT_ID", "door-bridge")?;
        let database_path = PathBuf::from(non_empty("DATABASE_PATH", "door_data.db")?);

        Ok(Self {
            broker_host,
            broker_port,
            keepalive_secs,
            topic,
            client_id,
            database_path,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok(), default)
}

/// Parses an optional string as `T`, returning `default` on `None` or
/// parse failure.
fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Reads an environment variable, substituting `default` when unset and
/// rejecting empty values.
fn non_empty(key: &str, default: &str) -> Result<String, BridgeError> {
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    if value.is_empty() {
        return Err(BridgeError::Config(format!("{key} must not be empty")));
    }
    Ok(value)
}
