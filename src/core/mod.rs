//! Core types for the chat client
//!
//! - `ConnectionStatus` / `Controls` - Session lifecycle and control gating
//! - `ChatError` - Error types

pub mod error;
pub mod state;

pub use error::{ChatError, ChatResult};
pub use state::{ConnectionStatus, Controls};
