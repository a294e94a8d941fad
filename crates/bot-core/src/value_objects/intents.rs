//! Gateway intents bitflags
//!
//! Intents select which categories of events a shard subscribes to during Identify.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Event subscription flags sent in the Identify payload
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Intents: u32 {
        /// Guild create/update/delete, channel create/update/delete
        const GUILDS                  = 1 << 0;
        /// Guild member add/update/remove
        const GUILD_MEMBERS           = 1 << 1;
        /// All messages in guild channels (private bots only)
        const GUILD_MESSAGES          = 1 << 9;
        /// Message reaction add/remove
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        /// Direct messages
        const DIRECT_MESSAGE          = 1 << 12;
        /// Interaction create
        const INTERACTION             = 1 << 26;
        /// Message audit pass/reject
        const MESSAGE_AUDIT           = 1 << 27;
        /// Forum thread and post events
        const FORUMS_EVENT            = 1 << 28;
        /// Audio start/finish/on-mic/off-mic
        const AUDIO_ACTION            = 1 << 29;
        /// Messages that @-mention the bot
        const PUBLIC_GUILD_MESSAGES   = 1 << 30;

        /// Minimal subscription used when nothing was requested
        const MINIMAL = Self::GUILDS.bits();
    }
}

impl Intents {
    /// Intents to put on the wire: an empty set falls back to [`Intents::MINIMAL`]
    #[must_use]
    pub fn or_minimal(self) -> Self {
        if self.is_empty() {
            Self::MINIMAL
        } else {
            self
        }
    }

    /// Get a list of the named flags that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Intents::from_bits_truncate(bits))
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}
