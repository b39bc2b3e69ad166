use super::message::{Message, MessageKind};

/// What to draw in the avatar column next to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSlot {
    /// First message of a same-speaker run
    Avatar,
    /// Later message in the run; blank space of avatar size
    Placeholder,
    /// Status messages have no avatar column
    None,
}

/// Append-only, ordered list of displayed messages
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its index
    pub fn push(&mut self, message: Message) -> usize {
        tracing::debug!(kind = ?message.kind, "Appending transcript entry");
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// All messages in display order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Message at `index`
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Most recently appended message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Kinds of all messages, in order
    pub fn kinds(&self) -> Vec<MessageKind> {
        self.messages.iter().map(|m| m.kind).collect()
    }

    /// Texts of all messages, in order
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.text.as_str()).collect()
    }

    /// Avatar treatment for the message at `index`
    ///
    /// Only the first message of a run of consecutive same-kind messages shows
    /// an avatar. A status message in between ends the run.
    pub fn avatar_slot(&self, index: usize) -> AvatarSlot {
        let Some(message) = self.messages.get(index) else {
            return AvatarSlot::None;
        };
        if !message.kind.has_avatar() {
            return AvatarSlot::None;
        }

        let continues_run = index
            .checked_sub(1)
            .and_then(|prev| self.messages.get(prev))
            .is_some_and(|prev| prev.kind == message.kind);

        if continues_run {
            AvatarSlot::Placeholder
        } else {
            AvatarSlot::Avatar
        }
    }
}
