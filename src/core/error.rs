//! Chat client error types

use thiserror::Error;

/// Errors that can occur while talking to the gateway or running the client
#[derive(Error, Debug)]
pub enum ChatError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway answered with a non-success status
    #[error("Gateway error ({status}): {body}")]
    Gateway { status: u16, body: String },

    /// Operation needs a session but no handshake has completed
    #[error("No active session")]
    NoSession,

    /// Event stream failed or closed unexpectedly
    #[error("Event stream error: {0}")]
    EventStream(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        ChatError::Other(msg.into())
    }

    /// Create an event stream error
    pub fn event_stream(msg: impl Into<String>) -> Self {
        ChatError::EventStream(msg.into())
    }
}

/// Result type alias for chat client operations
pub type ChatResult<T> = Result<T, ChatError>;
