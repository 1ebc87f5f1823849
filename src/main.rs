//! door-bridge entry point.
//!
//! Wires configuration, the SQLite persister, and the broker connection
//! manager, then runs the receive loop until fatal connection loss or
//! ctrl-c.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use door_bridge::broker::ConnectionManager;
use door_bridge::config::BridgeConfig;
use door_bridge::persistence::SqlitePersister;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = BridgeConfig::from_env()?;
    tracing::info!(
        host = %config.broker_host,
        port = config.broker_port,
        topic = %config.topic,
        "starting door-bridge"
    );

    // Open the record store; failure here is fatal.
    let persister = Arc::new(SqlitePersister::connect(&config.database_path).await?);
    tracing::info!(path = %config.database_path.display(), "record store ready");

    let mut manager = ConnectionManager::new(&config, persister);

    tokio::select! {
        state = manager.run() => {
            anyhow::bail!("receive loop ended in state {state}");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
