//! Session manager
//!
//! Owns the retry queue and starts one connection per queued session, paced so the gateway's
//! session start limit is never exceeded. Initial starts and reconnects share the same queue and
//! the same pacing.

use super::connection::{ConnectionConfig, GatewayConnection};
use super::session::{Session, SessionQueue};
use crate::error::GatewayResult;
use crate::interval::IntervalCalculator;
use crate::resume::ResumeSignal;
use crate::router::EventRouter;
use bot_common::GatewayConfig;
use bot_core::{GatewayInfo, Intents, ShardConfig, Token};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Session manager settings
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Window over which `max_concurrency` sessions may start
    pub start_window: Duration,
    /// Granularity the pacing interval is rounded to
    pub start_unit: Duration,
    /// Settings handed to every connection
    pub connection: ConnectionConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            start_window: Duration::from_secs(2),
            start_unit: IntervalCalculator::DEFAULT_UNIT,
            connection: ConnectionConfig::default(),
        }
    }
}

impl From<&GatewayConfig> for ManagerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            start_window: config.start_window(),
            start_unit: config.start_unit(),
            connection: ConnectionConfig {
                default_heartbeat: config.default_heartbeat(),
                message_queue_size: config.message_queue_size,
                ..ConnectionConfig::default()
            },
        }
    }
}

/// Starts and restarts gateway sessions for every shard
pub struct SessionManager {
    config: ManagerConfig,
    router: Arc<EventRouter>,
    resume: ResumeSignal,
}

impl SessionManager {
    pub fn new(config: ManagerConfig, router: EventRouter) -> Self {
        Self {
            config,
            router: Arc::new(router),
            resume: ResumeSignal::new(),
        }
    }

    /// Share an externally owned resume signal
    #[must_use]
    pub fn with_resume_signal(mut self, resume: ResumeSignal) -> Self {
        self.resume = resume;
        self
    }

    /// Handle that forces every live connection to reconnect and resume
    pub fn resume_signal(&self) -> ResumeSignal {
        self.resume.clone()
    }

    /// Intents needed by the registered handlers
    pub fn intents(&self) -> Intents {
        self.router.intents()
    }

    /// Start every shard and keep restarting sessions for the lifetime of the process
    ///
    /// Returns only if the gateway metadata is unusable.
    pub async fn start(&self, info: &GatewayInfo, token: &Token, intents: Intents) -> GatewayResult<()> {
        if let Err(e) = info.validate() {
            tracing::error!(error = %e, code = e.code(), url = %info.url, "Gateway metadata rejected");
            return Err(e.into());
        }

        let limit = &info.session_start_limit;
        let interval = IntervalCalculator::new(self.config.start_unit)
            .interval(self.config.start_window, limit.max_concurrency);
        tracing::info!(
            url = %info.url,
            shards = info.shards,
            max_concurrency = limit.max_concurrency,
            remaining = limit.remaining,
            interval_ms = interval.as_millis() as u64,
            intents = %intents,
            "Starting session manager"
        );
        if limit.remaining < info.shards {
            tracing::warn!(
                remaining = limit.remaining,
                shards = info.shards,
                "Session start limit lower than shard count"
            );
        }

        let (queue, mut pending) = SessionQueue::bounded(info.shards as usize);
        for shard_id in 0..info.shards {
            queue.push(Session::new(
                info.url.clone(),
                token.clone(),
                intents,
                ShardConfig::new(shard_id, info.shards),
            ));
        }

        while let Some(session) = pending.recv().await {
            tokio::time::sleep(interval).await;

            let span = tracing::info_span!(
                "gateway",
                shard_id = session.shard.shard_id,
                shard_count = session.shard.shard_count,
                session_id = %session.id
            );
            tracing::debug!(parent: &span, session = %session, "Starting connection");
            let connection = GatewayConnection::new(
                session,
                self.config.connection.clone(),
                self.router.clone(),
                queue.clone(),
                self.resume.clone(),
            );
            tokio::spawn(connection.run().instrument(span));
        }

        Ok(())
    }
}
