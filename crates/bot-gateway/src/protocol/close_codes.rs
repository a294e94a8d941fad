//! WebSocket close codes sent by the gateway

use serde::{Deserialize, Serialize};

/// Gateway close codes
///
/// `4900..=4913` are all reported as [`CloseCode::InternalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloseCode {
    /// Invalid opcode sent
    InvalidOpcode,
    /// Invalid payload sent
    InvalidPayload,
    /// Sequence number out of order
    InvalidSequence,
    /// Payloads sent too quickly
    RateLimited,
    /// Session expired, reconnect and resume
    SessionTimedOut,
    /// Invalid shard
    InvalidShard,
    /// Too many guilds for one connection
    ShardingRequired,
    /// Invalid gateway version
    InvalidVersion,
    /// Invalid intents
    InvalidIntents,
    /// Intents not permitted for this bot
    DisallowedIntents,
    /// Server-side failure, reconnect
    InternalError(u16),
    /// Bot is offline, only sandbox connections allowed
    BotOffline,
    /// Bot is banned
    BotBanned,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4001 => Some(Self::InvalidOpcode),
            4002 => Some(Self::InvalidPayload),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimedOut),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidVersion),
            4013 => Some(Self::InvalidIntents),
            4014 => Some(Self::DisallowedIntents),
            4900..=4913 => Some(Self::InternalError(value)),
            4914 => Some(Self::BotOffline),
            4915 => Some(Self::BotBanned),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::InvalidOpcode => 4001,
            Self::InvalidPayload => 4002,
            Self::InvalidSequence => 4007,
            Self::RateLimited => 4008,
            Self::SessionTimedOut => 4009,
            Self::InvalidShard => 4010,
            Self::ShardingRequired => 4011,
            Self::InvalidVersion => 4012,
            Self::InvalidIntents => 4013,
            Self::DisallowedIntents => 4014,
            Self::InternalError(code) => code,
            Self::BotOffline => 4914,
            Self::BotBanned => 4915,
        }
    }

    /// The bot cannot use this environment at all
    #[must_use]
    pub const fn is_bot_unavailable(self) -> bool {
        matches!(self, Self::BotOffline | Self::BotBanned)
    }

    /// The server expects the next connection to resume
    #[must_use]
    pub const fn is_resumable(self) -> bool {
        matches!(self, Self::SessionTimedOut | Self::InternalError(_))
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidOpcode => "Invalid opcode",
            Self::InvalidPayload => "Invalid payload",
            Self::InvalidSequence => "Invalid sequence number",
            Self::RateLimited => "Payloads sent too quickly",
            Self::SessionTimedOut => "Session timed out, reconnect and resume",
            Self::InvalidShard => "Invalid shard",
            Self::ShardingRequired => "Too many guilds, sharding required",
            Self::InvalidVersion => "Invalid gateway version",
            Self::InvalidIntents => "Invalid intents",
            Self::DisallowedIntents => "Intents not permitted",
            Self::InternalError(_) => "Internal server error, reconnect",
            Self::BotOffline => "Bot is offline, sandbox only",
            Self::BotBanned => "Bot is banned",
        }
    }

    /// Get the name of this close code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidOpcode => "InvalidOpcode",
            Self::InvalidPayload => "InvalidPayload",
            Self::InvalidSequence => "InvalidSequence",
            Self::RateLimited => "RateLimited",
            Self::SessionTimedOut => "SessionTimedOut",
            Self::InvalidShard => "InvalidShard",
            Self::ShardingRequired => "ShardingRequired",
            Self::InvalidVersion => "InvalidVersion",
            Self::InvalidIntents => "InvalidIntents",
            Self::DisallowedIntents => "DisallowedIntents",
            Self::InternalError(_) => "InternalError",
            Self::BotOffline => "BotOffline",
            Self::BotBanned => "BotBanned",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
