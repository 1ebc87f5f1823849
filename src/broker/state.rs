//! Connection lifecycle state machine.

use std::fmt;

/// Lifecycle state of the broker session.
///
/// Transitions: `Disconnected` → `Connecting` on a connect attempt,
/// `Connecting` → `Connected` on CONNACK success, `Connected` →
/// `SubscriptionActive` once the subscribe request is issued,
/// `Connecting` → `Failed` on CONNACK refusal or transport failure, and
/// any connected state → `Disconnected` on connection drop.
///
/// `Failed` and post-drop `Disconnected` are terminal: no automatic
/// reconnect is attempted, matching the original behavior. External
/// process supervision is expected to restart a dead subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session established, or the session has been lost.
    Disconnected,
    /// Connect attempt in flight, awaiting the broker's CONNACK.
    Connecting,
    /// CONNACK accepted; the subscribe request has not been issued yet.
    Connected,
    /// Subscribed to the configured topic and receiving messages.
    SubscriptionActive,
    /// The broker refused the session or the transport failed.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::SubscriptionActive => "subscription_active",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_stable() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(
            ConnectionState::SubscriptionActive.to_string(),
            "subscription_active"
        );
        assert_eq!(ConnectionState::Failed.to_string(), "failed");
    }
}
