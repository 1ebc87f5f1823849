//! Broker connection manager: MQTT session, subscription, and dispatch.
//!
//! [`ConnectionManager`] owns the `rumqttc` client and event loop and runs
//! one sequential receive loop: connect, subscribe on CONNACK, hand each
//! inbound PUBLISH to the [`StatusSink`]. Each message is handled to
//! completion (including the storage round trip) before the next broker
//! event is polled, so insertion order matches arrival order.

pub mod state;

pub use state::ConnectionState;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::persistence::StatusSink;

/// Capacity of the client's outgoing-request channel. Only CONNECT and a
/// single SUBSCRIBE ever pass through it.
const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Manages the MQTT session lifecycle and dispatches inbound messages.
///
/// Lifecycle: construct with [`ConnectionManager::new`], then drive with
/// [`ConnectionManager::run`] until fatal connection loss or process
/// shutdown. There is no reconnect: `run` returns the terminal state and
/// the caller decides whether to exit.
pub struct ConnectionManager {
    client: AsyncClient,
    event_loop: EventLoop,
    topic: String,
    sink: Arc<dyn StatusSink>,
    state: ConnectionState,
}

impl ConnectionManager {
    /// Builds a manager for the configured broker, wired to the given
    /// sink. No network activity happens until [`run`](Self::run).
    #[must_use]
    pub fn new(config: &BridgeConfig, sink: Arc<dyn StatusSink>) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.as_str(),
            config.broker_host.as_str(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(config.keepalive_secs));

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        Self {
            client,
            event_loop,
            topic: config.topic.clone(),
            sink,
            state: ConnectionState::Disconnected,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Runs the receive loop until fatal connection loss, returning the
    /// terminal state.
    ///
    /// On CONNACK success the manager issues the subscribe request and
    /// transitions to [`ConnectionState::SubscriptionActive`]; on refusal
    /// it transitions to [`ConnectionState::Failed`] and returns without
    /// ever subscribing. Per-message failures (non-UTF-8 payload, storage
    /// error) are logged and do not end the loop; a transport error does.
    pub async fn run(&mut self) -> ConnectionState {
        self.state = ConnectionState::Connecting;
        tracing::info!(topic = %self.topic, "connecting to broker");

        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        self.state = ConnectionState::Connected;
                        tracing::info!("connected to broker");

                        match self
                            .client
                            .subscribe(self.topic.as_str(), QoS::AtMostOnce)
                            .await
                        {
                            Ok(()) => {
                                self.state = ConnectionState::SubscriptionActive;
                                tracing::info!(topic = %self.topic, "subscribed to topic");
                            }
                            Err(e) => {
                                self.state = ConnectionState::Failed;
                                let err = BridgeError::Connection(e.to_string());
                                tracing::error!(error = %err, "failed to issue subscribe request");
                                break;
                            }
                        }
                    } else {
                        self.state = ConnectionState::Failed;
                        tracing::error!(code = ?ack.code, "broker refused session");
                        break;
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    handle_publish(&publish.topic, &publish.payload, self.sink.as_ref()).await;
                }
                Ok(_) => {}
                Err(e) => {
                    // No reconnect: a lost or refused connection is terminal.
                    self.state = error_state(self.state);
                    let err = BridgeError::Connection(e.to_string());
                    tracing::error!(error = %err, state = %self.state, "connection lost");
                    break;
                }
            }
        }

        self.state
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("topic", &self.topic)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Terminal state after a transport error. A failure while still in
/// `Connecting` is a refused session; any later failure is a dropped one.
fn error_state(prev: ConnectionState) -> ConnectionState {
    if prev == ConnectionState::Connecting {
        ConnectionState::Failed
    } else {
        ConnectionState::Disconnected
    }
}

/// Dispatches one inbound PUBLISH: decodes the payload as UTF-8 and hands
/// the text to the sink.
///
/// Per-message failures are logged and swallowed so the receive loop keeps
/// running: a non-UTF-8 payload produces no record, and a storage failure
/// loses that one event.
pub async fn handle_publish(topic: &str, payload: &[u8], sink: &dyn StatusSink) {
    let status = match std::str::from_utf8(payload).map_err(BridgeError::Decode) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(%topic, error = %e, "dropping message");
            return;
        }
    };

    tracing::info!(%topic, %status, "message received");

    match sink.record_status(status).await {
        Ok(id) => tracing::debug!(row_id = id, "status recorded"),
        Err(e) => tracing::error!(error = %e, "failed to persist status; event lost"),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Sink that records every payload it receives, optionally failing
    /// each call.
    #[derive(Debug, Default)]
    struct RecordingSink {
        statuses: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingSink {
        fn failing() -> Self {
            Self {
                statuses: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn recorded(&self) -> Vec<String> {
            match self.statuses.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            }
        }
    }

    #[async_trait]
    impl StatusSink for RecordingSink {
        async fn record_status(&self, status: &str) -> Result<i64, BridgeError> {
            if self.fail {
                return Err(BridgeError::Storage("database is locked".to_string()));
            }
            let mut guard = match self.statuses.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.push(status.to_string());
            Ok(guard.len() as i64)
        }
    }

    fn test_config() -> BridgeConfig {
        BridgeConfig {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            keepalive_secs: 60,
            topic: "test".to_string(),
            client_id: "door-bridge-test".to_string(),
            database_path: "door_data.db".into(),
        }
    }

    #[tokio::test]
    async fn publish_records_decoded_payload() {
        let sink = RecordingSink::default();
        handle_publish("test", b"closed", &sink).await;
        assert_eq!(sink.recorded(), ["closed"]);
    }

    #[tokio::test]
    async fn messages_are_recorded_in_arrival_order() {
        let sink = RecordingSink::default();
        handle_publish("test", b"open", &sink).await;
        handle_publish("test", b"closed", &sink).await;
        assert_eq!(sink.recorded(), ["open", "closed"]);
    }

    #[tokio::test]
    async fn invalid_utf8_payload_produces_no_record() {
        let sink = RecordingSink::default();
        handle_publish("test", &[0xff, 0xfe, 0xfd], &sink).await;
        assert!(sink.recorded().is_empty());
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        // A storage error must not propagate out of dispatch; the next
        // message is still processed independently.
        let failing = RecordingSink::failing();
        handle_publish("test", b"open", &failing).await;

        let working = RecordingSink::default();
        handle_publish("test", b"closed", &working).await;
        assert_eq!(working.recorded(), ["closed"]);
    }

    #[tokio::test]
    async fn new_manager_starts_disconnected() {
        let manager = ConnectionManager::new(&test_config(), Arc::new(RecordingSink::default()));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn transport_error_while_connecting_lands_in_failed() {
        assert_eq!(
            error_state(ConnectionState::Connecting),
            ConnectionState::Failed
        );
    }

    #[test]
    fn drop_after_subscription_lands_in_disconnected() {
        assert_eq!(
            error_state(ConnectionState::SubscriptionActive),
            ConnectionState::Disconnected
        );
        assert_eq!(
            error_state(ConnectionState::Connected),
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn connect_refusal_ends_in_failed_without_subscribing() {
        // Nothing is listening on this port, so the transport fails while
        // still in Connecting; the manager must land in Failed and never
        // reach SubscriptionActive.
        let sink = Arc::new(RecordingSink::default());
        let mut config = test_config();
        config.broker_port = 1;

        let mut manager = ConnectionManager::new(&config, Arc::clone(&sink) as Arc<dyn StatusSink>);
        let state = manager.run().await;

        assert_eq!(state, ConnectionState::Failed);
        assert!(sink.recorded().is_empty());
    }
}
