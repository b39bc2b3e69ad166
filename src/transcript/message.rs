use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Text from the remote agent, or a failure reported in its lane
    Agent,
    /// Text the user submitted
    User,
    /// Connection lifecycle notice; never sent to the agent
    Status,
}

/// Horizontal lane a message renders in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl MessageKind {
    /// Lane used when rendering messages of this kind
    pub fn lane(self) -> Lane {
        match self {
            MessageKind::Agent => Lane::Left,
            MessageKind::Status => Lane::Center,
            MessageKind::User => Lane::Right,
        }
    }

    /// Whether messages of this kind carry a speaker avatar
    pub fn has_avatar(self) -> bool {
        !matches!(self, MessageKind::Status)
    }
}

/// One entry in the visible transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message of the given kind stamped with the current time
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new agent message
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Agent, text)
    }

    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageKind::User, text)
    }

    /// Create a new status message
    pub fn status(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Status, text)
    }
}
