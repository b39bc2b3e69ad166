//! Workmind chat client
//!
//! A session controller for testing Workmind agents: it performs the gateway
//! handshake, streams agent events into a transcript, sends user messages
//! and decides when the transcript should follow new entries.

pub mod core;
pub mod controller;
pub mod gateway;
pub mod scroll;
pub mod transcript;

// Optional components
pub mod cli;
pub mod config;
pub mod logging;

pub use config::{ChatConfig, LoggingConfig};
pub use controller::{ChatController, ControllerEvent};
pub use crate::core::{ChatError, ChatResult, ConnectionStatus};
pub use gateway::{GatewayClient, GatewayConfig, GatewayEvent, WorkmindClient};
