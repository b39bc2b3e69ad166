//! Gateway session client
//!
//! The chat controller talks to the agent gateway only through the
//! [`GatewayClient`] trait. [`WorkmindClient`] implements it over HTTP with a
//! server-sent event stream for inbound events.

pub mod client;
pub mod config;
pub mod events;
pub mod sse;
pub mod workmind;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{GatewayClient, MessagePayload, SessionInfo, USER_MESSAGE_TYPE};
pub use config::{GatewayConfig, DEFAULT_AGENT_ID, DEFAULT_BASE_URL};
pub use events::{
    create_event_channel, ui_message_text, EventReceiver, EventSender, GatewayEvent,
};
pub use sse::{SseDecoder, SseEvent};
pub use workmind::WorkmindClient;
