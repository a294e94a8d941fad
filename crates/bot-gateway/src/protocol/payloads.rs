//! Payload definitions
//!
//! Client payloads (Identify, Resume) and the server payloads the connection consumes itself
//! (Hello, Ready).

use bot_core::{Intents, ShardConfig, Token};
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// `<app_id>.<secret>`
    pub token: String,

    /// Event categories requested for this session
    pub intents: Intents,

    /// `[shard_id, shard_count]`
    pub shard: [u32; 2],
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: &Token, intents: Intents, shard: ShardConfig) -> Self {
        Self {
            token: token.as_auth_string(),
            intents,
            shard: shard.as_array(),
        }
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to continue a dropped session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// `<app_id>.<secret>`
    pub token: String,

    /// Session ID from the previous Ready
    pub session_id: String,

    /// Last sequence number received
    pub seq: u64,
}

impl ResumePayload {
    #[must_use]
    pub fn new(token: &Token, session_id: impl Into<String>, seq: u64) -> Self {
        Self {
            token: token.as_auth_string(),
            session_id: session_id.into(),
            seq,
        }
    }
}

/// Data of the READY dispatch event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyPayload {
    #[serde(default)]
    pub version: i32,
    pub session_id: String,
    #[serde(default)]
    pub user: ReadyUser,
    #[serde(default)]
    pub shard: [u32; 2],
}

/// Bot account reported in READY
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}
