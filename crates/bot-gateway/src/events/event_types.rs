//! Gateway event types
//!
//! Event names carried in the `t` field of dispatch frames.

use bot_core::Intents;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch event types this client understands
///
/// Anything else the server sends is passed over silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Connection events
    /// Sent after successful Identify
    Ready,
    /// Sent after successful Resume
    Resumed,

    // Message events
    /// Message that @-mentions the bot in a public guild channel
    AtMessageCreate,
    /// Any message in a guild channel (private bots only)
    MessageCreate,
    /// Direct message to the bot
    DirectMessageCreate,
}

impl EventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::AtMessageCreate => "AT_MESSAGE_CREATE",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::DirectMessageCreate => "DIRECT_MESSAGE_CREATE",
        }
    }

    /// Parse an event type from its wire name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "READY" => Some(Self::Ready),
            "RESUMED" => Some(Self::Resumed),
            "AT_MESSAGE_CREATE" => Some(Self::AtMessageCreate),
            "MESSAGE_CREATE" => Some(Self::MessageCreate),
            "DIRECT_MESSAGE_CREATE" => Some(Self::DirectMessageCreate),
            _ => None,
        }
    }

    /// Intent a session must request to receive this event
    #[must_use]
    pub const fn required_intents(self) -> Intents {
        match self {
            Self::Ready | Self::Resumed => Intents::empty(),
            Self::AtMessageCreate => Intents::PUBLIC_GUILD_MESSAGES,
            Self::MessageCreate => Intents::GUILD_MESSAGES,
            Self::DirectMessageCreate => Intents::DIRECT_MESSAGE,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
