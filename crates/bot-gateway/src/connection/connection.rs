//! Per-shard connection state machine
//!
//! `Disconnected -> Connecting -> Handshaking -> Listening -> Closing -> Disconnected`
//!
//! Every run ends in exactly one of three ways:
//! - dial failed: session re-queued unchanged
//! - handshake send failed: transport closed, session dropped
//! - listen ended: transport closed, heartbeat stopped, session re-queued with its latest ID and
//!   sequence number

use super::pumps::{raise, DispatchPump, ReadPump};
use super::session::{Session, SessionQueue};
use crate::error::{GatewayError, GatewayResult};
use crate::events::EventEnvelope;
use crate::protocol::{CloseCode, GatewayMessage, IdentifyPayload, ReadyPayload, ResumePayload};
use crate::resume::ResumeSignal;
use crate::router::EventRouter;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::Instrument;

/// Buffered close conditions; only the first is acted on
const CLOSE_CHANNEL_SIZE: usize = 10;

/// Outbound half of a gateway transport
pub trait FrameSink: Sink<WsMessage, Error = WsError> + Unpin + Send {}
impl<T> FrameSink for T where T: Sink<WsMessage, Error = WsError> + Unpin + Send {}

/// Inbound half of a gateway transport
pub trait FrameStream: Stream<Item = Result<WsMessage, WsError>> + Unpin + Send + 'static {}
impl<T> FrameStream for T where T: Stream<Item = Result<WsMessage, WsError>> + Unpin + Send + 'static {}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Dialing the gateway
    Connecting,
    /// Sending Identify or Resume
    Handshaking,
    /// Pumps running, heartbeat armed
    Listening,
    /// Tearing down the transport
    Closing,
}

/// Per-connection settings
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Heartbeat cadence until the server's Hello arrives
    pub default_heartbeat: Duration,
    /// Capacity of the delivery queue between the read and dispatch pumps
    pub message_queue_size: usize,
    /// How long teardown waits for queued events to finish dispatching
    pub drain_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_heartbeat: Duration::from_secs(60),
            message_queue_size: 2000,
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// One shard's connection attempt
pub struct GatewayConnection {
    session: Session,
    config: ConnectionConfig,
    router: Arc<EventRouter>,
    retry: SessionQueue,
    resume: ResumeSignal,
    state: ConnectionState,
}

impl GatewayConnection {
    pub fn new(
        session: Session,
        config: ConnectionConfig,
        router: Arc<EventRouter>,
        retry: SessionQueue,
        resume: ResumeSignal,
    ) -> Self {
        Self {
            session,
            config,
            router,
            retry,
            resume,
            state: ConnectionState::Disconnected,
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Dial the gateway and drive the connection until it ends
    pub async fn run(mut self) {
        self.transition(ConnectionState::Connecting);

        let transport = match tokio_tungstenite::connect_async(self.session.url.as_str()).await {
            Ok((transport, _response)) => transport,
            Err(e) => {
                tracing::warn!(url = %self.session.url, error = %e, "Failed to connect, re-queueing session");
                self.transition(ConnectionState::Disconnected);
                self.retry.push(self.session);
                return;
            }
        };
        tracing::info!(url = %self.session.url, "Connected");

        let (sink, stream) = transport.split();
        self.drive(sink, stream).await;
    }

    /// Handshake and listen over an established transport
    pub async fn drive<S: FrameSink, R: FrameStream>(mut self, mut sink: S, stream: R) {
        self.transition(ConnectionState::Handshaking);

        if let Err(e) = self.handshake(&mut sink).await {
            // The session is not re-queued; the shard stays down until the process restarts.
            tracing::error!(error = %e, session = %self.session, "Handshake failed, dropping session");
            self.transition(ConnectionState::Closing);
            if let Err(e) = sink.close().await {
                tracing::debug!(error = %e, "Failed to close transport");
            }
            self.transition(ConnectionState::Disconnected);
            return;
        }

        self.transition(ConnectionState::Listening);
        let err = self.listen(sink, stream).await;

        tracing::warn!(
            error = %err,
            kind = ?err.kind(),
            session = %self.session,
            "Listening stopped, re-queueing session"
        );
        self.transition(ConnectionState::Disconnected);
        self.retry.push(self.session);
    }

    async fn handshake<S: FrameSink>(&mut self, sink: &mut S) -> GatewayResult<()> {
        let frame = if self.session.is_resumable() {
            tracing::info!(
                session_id = %self.session.id,
                seq = self.session.last_seq,
                "Resuming session"
            );
            let payload =
                ResumePayload::new(&self.session.token, &self.session.id, self.session.last_seq);
            GatewayMessage::resume(&payload)
        } else {
            self.session.intents = self.session.intents.or_minimal();
            tracing::info!(
                intents = %self.session.intents,
                names = ?self.session.intents.list(),
                "Identifying"
            );
            let payload = IdentifyPayload::new(
                &self.session.token,
                self.session.intents,
                self.session.shard,
            );
            GatewayMessage::identify(&payload)
        }
        .map_err(GatewayError::Protocol)?;

        send_frame(sink, &frame).await
    }

    /// Run until the first close condition, then tear down
    async fn listen<S: FrameSink, R: FrameStream>(&mut self, mut sink: S, stream: R) -> GatewayError {
        let (close_tx, mut close_rx) = mpsc::channel(CLOSE_CHANNEL_SIZE);
        let (queue_tx, queue_rx) = mpsc::channel::<EventEnvelope>(self.config.message_queue_size.max(1));
        let (heartbeat_tx, mut heartbeat_rx) = watch::channel(self.config.default_heartbeat);
        let (ready_tx, ready_rx) = watch::channel::<Option<ReadyPayload>>(None);
        let last_seq = Arc::new(AtomicU64::new(self.session.last_seq));

        let read = tokio::spawn(
            ReadPump {
                stream,
                queue: queue_tx,
                close: close_tx.clone(),
                heartbeat: heartbeat_tx,
                last_seq: last_seq.clone(),
            }
            .run()
            .in_current_span(),
        );
        let mut dispatch = tokio::spawn(
            DispatchPump {
                queue: queue_rx,
                close: close_tx.clone(),
                ready: ready_tx,
                router: self.router.clone(),
            }
            .run()
            .in_current_span(),
        );

        let mut resume = self.resume.subscribe();
        let mut heartbeat = heartbeat_timer(self.config.default_heartbeat);
        let mut resume_open = true;
        let mut hello_open = true;

        let err = loop {
            tokio::select! {
                Some(err) = close_rx.recv() => break normalize_close(err),
                changed = resume.changed(), if resume_open => {
                    if changed.is_ok() {
                        break GatewayError::ResumeSignal;
                    }
                    resume_open = false;
                }
                changed = heartbeat_rx.changed(), if hello_open => {
                    if changed.is_ok() {
                        let period = *heartbeat_rx.borrow_and_update();
                        heartbeat = heartbeat_timer(period);
                        tracing::debug!(period_ms = period.as_millis() as u64, "Heartbeat re-armed");
                    } else {
                        hello_open = false;
                    }
                }
                _ = heartbeat.tick() => {
                    let seq = last_seq.load(Ordering::Acquire);
                    if let Err(e) = send_frame(&mut sink, &GatewayMessage::heartbeat(seq)).await {
                        raise(&close_tx, e);
                    }
                }
            }
        };

        self.transition(ConnectionState::Closing);
        drop(heartbeat);
        if let Err(e) = sink.close().await {
            tracing::debug!(error = %e, "Failed to close transport");
        }
        read.abort();

        match tokio::time::timeout(self.config.drain_timeout, &mut dispatch).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.is_cancelled() => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Dispatch pump failed"),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.drain_timeout.as_millis() as u64,
                    "Dispatch pump did not drain in time, aborting"
                );
                dispatch.abort();
            }
        }

        self.session.observe_seq(last_seq.load(Ordering::Acquire));
        if let Some(ready) = ready_rx.borrow().as_ref() {
            self.session.apply_ready(ready);
        }
        err
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::debug!(from = ?self.state, to = ?next, "Connection state changed");
        self.state = next;
    }
}

/// First tick one full period from now
fn heartbeat_timer(period: Duration) -> Interval {
    let mut timer = tokio::time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn send_frame<S: FrameSink>(sink: &mut S, frame: &GatewayMessage) -> GatewayResult<()> {
    let json = frame.to_json().map_err(GatewayError::Protocol)?;
    tracing::debug!(frame = %frame, "Sending frame");
    sink.send(WsMessage::Text(json)).await?;
    Ok(())
}

/// Log close codes that need operator attention; the error itself is passed on re-wrapped
fn normalize_close(err: GatewayError) -> GatewayError {
    let GatewayError::Closed { code, reason } = err else {
        return err;
    };

    match CloseCode::from_u16(code) {
        Some(known) if known.is_bot_unavailable() => {
            tracing::error!(close_code = %known, reason = %reason, "Bot cannot connect to this environment");
            GatewayError::closed(code, reason)
        }
        Some(known) if known.is_resumable() => {
            tracing::info!(close_code = %known, reason = %reason, "Server closed, session will resume");
            GatewayError::closed(code, reason)
        }
        other => {
            tracing::warn!(code, close_code = ?other, reason = %reason, "Unexpected close");
            GatewayError::closed(code, reason)
        }
    }
}
