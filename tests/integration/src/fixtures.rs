//! Test fixtures and frame builders
//!
//! Server-side gateway frames as the mock gateway sends them.

use bot_core::{GatewayInfo, SessionStartLimit, Token};
use serde_json::{json, Value};

/// Credentials used by every test
pub fn test_token() -> Token {
    Token::new(102_001, "s3cret")
}

/// Gateway metadata pointing at a mock gateway
pub fn gateway_info(url: &str, shards: u32, max_concurrency: u32) -> GatewayInfo {
    GatewayInfo {
        url: url.to_string(),
        shards,
        session_start_limit: SessionStartLimit {
            total: 1000,
            remaining: 1000,
            reset_after: 86_400_000,
            max_concurrency,
        },
    }
}

/// op 10
pub fn hello(heartbeat_interval_ms: u64) -> Value {
    json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval_ms}})
}

/// op 11
pub fn heartbeat_ack() -> Value {
    json!({"op": 11})
}

/// op 7
pub fn reconnect() -> Value {
    json!({"op": 7})
}

/// op 9
pub fn invalid_session() -> Value {
    json!({"op": 9, "d": false})
}

/// READY dispatch
pub fn ready(seq: u64, session_id: &str, shard: [u32; 2]) -> Value {
    json!({
        "op": 0,
        "s": seq,
        "t": "READY",
        "d": {
            "version": 1,
            "session_id": session_id,
            "user": {"id": "6158788878435714165", "username": "test-bot", "bot": true},
            "shard": shard,
        }
    })
}

/// RESUMED dispatch
pub fn resumed(seq: u64) -> Value {
    json!({"op": 0, "s": seq, "t": "RESUMED", "d": ""})
}

/// Message dispatch of the given event type
pub fn message_event(event: &str, seq: u64, message_id: &str, channel_id: &str, content: &str) -> Value {
    json!({
        "op": 0,
        "s": seq,
        "t": event,
        "id": format!("{event}:{message_id}"),
        "d": {
            "id": message_id,
            "channel_id": channel_id,
            "guild_id": "guild-1",
            "content": content,
            "timestamp": "2024-01-01T00:00:00+08:00",
            "author": {"id": "user-1", "username": "alice", "bot": false},
        }
    })
}

/// AT_MESSAGE_CREATE dispatch
pub fn at_message(seq: u64, message_id: &str, channel_id: &str, content: &str) -> Value {
    message_event("AT_MESSAGE_CREATE", seq, message_id, channel_id, content)
}
