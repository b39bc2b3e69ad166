//! Chat session controller
//!
//! This module provides `ChatController`, the view-model that sits between a
//! front-end and a [`GatewayClient`](crate::gateway::GatewayClient): it runs
//! the connection lifecycle, keeps the transcript and decides when new
//! entries scroll into view.

mod chat;
mod composer;

pub use chat::{
    ChatController, ControllerEvent, COMPLETION_CHANNEL_SIZE, CONNECTED_TEXT,
    CONNECTING_TEXT, CONNECTION_ERROR_TEXT, HANDSHAKE_FAILED_TEXT, SEND_FAILED_TEXT,
    SESSION_TERMINATED_TEXT,
};
pub use composer::{Composer, ComposerKey};
