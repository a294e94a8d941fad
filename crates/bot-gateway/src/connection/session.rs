//! Shard session state and the retry queue
//!
//! A `Session` is a plain value. It is moved into a connection, updated there, and moved back
//! into the queue when the connection ends, so exactly one owner exists at any time.

use crate::protocol::{ReadyPayload, ReadyUser};
use bot_core::{Intents, ShardConfig, Token};
use std::fmt;
use tokio::sync::mpsc;

/// Everything needed to (re)connect one shard
#[derive(Debug, Clone)]
pub struct Session {
    /// Server-issued session ID; empty until the first Ready
    pub id: String,
    /// Gateway WebSocket URL
    pub url: String,
    pub token: Token,
    pub intents: Intents,
    /// Highest non-zero sequence number received
    pub last_seq: u64,
    pub shard: ShardConfig,
    /// Gateway protocol version from the last READY
    pub version: i32,
    /// Bot account from the last READY
    pub user: ReadyUser,
}

impl Session {
    #[must_use]
    pub fn new(url: impl Into<String>, token: Token, intents: Intents, shard: ShardConfig) -> Self {
        Self {
            id: String::new(),
            url: url.into(),
            token,
            intents,
            last_seq: 0,
            shard,
            version: 0,
            user: ReadyUser::default(),
        }
    }

    /// A session that has seen READY is resumed instead of identified
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        !self.id.is_empty()
    }

    /// Record the sequence number of an inbound frame; never moves backwards
    pub fn observe_seq(&mut self, seq: u64) {
        self.last_seq = self.last_seq.max(seq);
    }

    /// Take over the session ID, bot identity and shard assignment from READY
    pub fn apply_ready(&mut self, ready: &ReadyPayload) {
        self.id.clone_from(&ready.session_id);
        self.version = ready.version;
        self.user.clone_from(&ready.user);
        if ready.shard[1] > 0 {
            self.shard = ShardConfig::new(ready.shard[0], ready.shard[1]);
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shard {} session_id={} last_seq={}",
            self.shard, self.id, self.last_seq
        )
    }
}

/// Sessions waiting to be (re)connected
///
/// Capacity equals the shard count, and each shard owns at most one session, so `push` never
/// has to wait.
#[derive(Debug, Clone)]
pub struct SessionQueue {
    tx: mpsc::Sender<Session>,
}

impl SessionQueue {
    /// Create a queue and the receiving end the manager drains
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Session>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue a session without blocking
    pub fn push(&self, session: Session) {
        if let Err(e) = self.tx.try_send(session) {
            let (reason, session) = match e {
                mpsc::error::TrySendError::Full(session) => ("queue full", session),
                mpsc::error::TrySendError::Closed(session) => ("queue closed", session),
            };
            tracing::error!(
                shard = %session.shard,
                session_id = %session.id,
                reason,
                "Failed to re-queue session"
            );
        }
    }
}
