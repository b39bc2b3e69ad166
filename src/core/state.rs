//! Connection lifecycle state

use serde::{Deserialize, Serialize};

/// Lifecycle of the session with the gateway
///
/// The normal cycle is `Idle -> Connecting -> Connected -> Idle`. A failed
/// handshake drops `Connecting` back to `Idle`. A transport error while
/// connected moves to `Degraded`, which recovers to `Connected` when the
/// event stream delivers again, or returns to `Idle` on disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No session in progress
    #[default]
    Idle,

    /// Handshake in flight
    Connecting,

    /// Handshake succeeded and the event stream is running
    Connected,

    /// Connected, but the event stream reported an error
    Degraded,
}

impl ConnectionStatus {
    /// Check whether a transition to `next` is allowed
    pub fn can_transition_to(self, next: ConnectionStatus) -> bool {
        use ConnectionStatus::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Connected)
                | (Connecting, Idle)
                | (Connected, Idle)
                | (Connected, Degraded)
                | (Degraded, Connected)
                | (Degraded, Idle)
        )
    }

    /// A connect request is only accepted from `Idle`
    pub fn can_connect(self) -> bool {
        self == ConnectionStatus::Idle
    }

    /// A live session (healthy or not) can be torn down
    pub fn can_disconnect(self) -> bool {
        matches!(self, ConnectionStatus::Connected | ConnectionStatus::Degraded)
    }

    /// Only a healthy session accepts user input
    pub fn accepts_input(self) -> bool {
        self == ConnectionStatus::Connected
    }

    /// Enabled state of every control for this status
    pub fn controls(self) -> Controls {
        Controls {
            identifiers_editable: self == ConnectionStatus::Idle,
            connect_enabled: self.can_connect(),
            disconnect_enabled: self.can_disconnect(),
            composer_enabled: self.accepts_input(),
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Idle => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Degraded => write!(f, "Connected (stream error)"),
        }
    }
}

/// Which user-facing controls are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Session ID / agent ID fields accept edits
    pub identifiers_editable: bool,
    /// Connect button
    pub connect_enabled: bool,
    /// Disconnect button
    pub disconnect_enabled: bool,
    /// Text composer and send button
    pub composer_enabled: bool,
}
