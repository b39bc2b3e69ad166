//! Gateway client trait
//!
//! Abstracts the session client so the controller can run against the real
//! HTTP gateway or an in-memory double.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core::ChatResult;

use super::events::GatewayEvent;

/// Message type used for text typed by the user
pub const USER_MESSAGE_TYPE: &str = "user_message";

/// Identifiers resolved by a successful handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub agent_id: String,
}

impl SessionInfo {
    pub fn new(session_id: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            agent_id: agent_id.into(),
        }
    }
}

/// Body of an outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub text: String,
}

impl MessagePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Capabilities the chat controller needs from a gateway session
///
/// Inbound events are delivered through [`subscribe`](GatewayClient::subscribe);
/// subscribers only see events emitted after they subscribed.
#[async_trait::async_trait]
pub trait GatewayClient: Send + Sync {
    /// Establish a session. On success `session_id()`/`agent_id()` are populated.
    async fn handshake(&self) -> ChatResult<SessionInfo>;

    /// Send a typed message to the agent. Resolves once the gateway acknowledges it.
    async fn send_message(&self, message_type: &str, payload: MessagePayload) -> ChatResult<()>;

    /// Open the server-push channel. Starting a running stream is a no-op.
    async fn start_event_stream(&self) -> ChatResult<()>;

    /// Close the server-push channel. Stopping a stopped stream is a no-op.
    fn stop_event_stream(&self);

    /// Subscribe to inbound `ui` and `error` events
    fn subscribe(&self) -> broadcast::Receiver<GatewayEvent>;

    /// Session identifier, once a handshake has succeeded
    fn session_id(&self) -> Option<String>;

    /// Agent identifier resolved by the handshake
    fn agent_id(&self) -> Option<String>;
}
