//! Operator-triggered resume
//!
//! Triggering the signal makes every live connection stop listening and re-queue its session,
//! so each shard reconnects and resumes.

use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide resume trigger shared by every connection
///
/// Each trigger bumps a generation counter; connections subscribed before the bump observe it
/// exactly once.
#[derive(Debug, Clone)]
pub struct ResumeSignal {
    generation: Arc<watch::Sender<u64>>,
}

impl ResumeSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            generation: Arc::new(tx),
        }
    }

    /// Ask every live connection to reconnect
    pub fn trigger(&self) {
        self.generation.send_modify(|generation| *generation = generation.wrapping_add(1));
        tracing::info!(
            connections = self.generation.receiver_count(),
            "Resume signal triggered"
        );
    }

    /// Receiver that resolves `changed()` on the next trigger
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

impl Default for ResumeSignal {
    fn default() -> Self {
        Self::new()
    }
}
