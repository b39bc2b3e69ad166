//! Conversation transcript
//!
//! The transcript is the ordered list of messages shown to the user. It only
//! ever grows: entries are never reordered, edited or removed.

mod message;
#[allow(clippy::module_inception)]
mod transcript;

pub use message::{Lane, Message, MessageKind};
pub use transcript::{AvatarSlot, Transcript};
