//! Gateway bootstrap metadata
//!
//! Returned once by the REST bootstrap call and read-only afterwards.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// WebSocket access point information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayInfo {
    /// Gateway WebSocket URL
    pub url: String,
    /// Recommended shard count
    pub shards: u32,
    /// Session start rate limit
    pub session_start_limit: SessionStartLimit,
}

/// Rate limit on starting new gateway sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStartLimit {
    /// Total session starts allowed per window
    #[serde(default)]
    pub total: u32,
    /// Remaining session starts
    #[serde(default)]
    pub remaining: u32,
    /// Milliseconds until the limit resets
    #[serde(default)]
    pub reset_after: u32,
    /// Number of sessions that may be started concurrently per window
    #[serde(default)]
    pub max_concurrency: u32,
}

impl GatewayInfo {
    /// Check that the metadata can seed a session pool
    pub fn validate(&self) -> Result<(), DomainError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(DomainError::EmptyGatewayUrl);
        }
        let scheme = url.split("://").next().unwrap_or_default();
        if !url.contains("://") || !matches!(scheme, "ws" | "wss") {
            return Err(DomainError::UnsupportedScheme(scheme.to_string()));
        }
        if self.shards == 0 {
            return Err(DomainError::NoShards);
        }
        Ok(())
    }
}

/// A shard tuple: which partition of the event stream a connection carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardConfig {
    pub shard_id: u32,
    pub shard_count: u32,
}

impl ShardConfig {
    /// Create a shard tuple
    #[must_use]
    pub const fn new(shard_id: u32, shard_count: u32) -> Self {
        Self {
            shard_id,
            shard_count,
        }
    }

    /// Wire representation `[shard_id, shard_count]`
    #[must_use]
    pub const fn as_array(self) -> [u32; 2] {
        [self.shard_id, self.shard_count]
    }
}

impl std::fmt::Display for ShardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.shard_id, self.shard_count)
    }
}
