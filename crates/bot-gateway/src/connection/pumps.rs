//! Read and dispatch pumps
//!
//! The read pump owns the inbound half of the transport. It decodes frames, tracks the sequence
//! number, consumes built-in ops and forwards everything else to the delivery queue. The dispatch
//! pump drains that queue and runs handlers, so a slow handler never stalls reads or heartbeats.

use super::connection::FrameStream;
use crate::error::GatewayError;
use crate::events::{EventEnvelope, EventType};
use crate::protocol::{HelloPayload, OpCode, ReadyPayload};
use crate::router::EventRouter;
use futures::FutureExt;
use futures_util::StreamExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Post a close condition without waiting; the first one ends the connection
pub(crate) fn raise(close: &mpsc::Sender<GatewayError>, err: GatewayError) {
    if let Err(e) = close.try_send(err) {
        tracing::debug!(error = %e, "Close condition dropped, connection already closing");
    }
}

pub(crate) struct ReadPump<R> {
    pub stream: R,
    pub queue: mpsc::Sender<EventEnvelope>,
    pub close: mpsc::Sender<GatewayError>,
    pub heartbeat: watch::Sender<Duration>,
    pub last_seq: Arc<AtomicU64>,
}

impl<R: FrameStream> ReadPump<R> {
    pub(crate) async fn run(mut self) {
        let err = loop {
            let text = match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => text,
                Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "Non UTF-8 binary frame, skipping");
                        continue;
                    }
                },
                Some(Ok(WsMessage::Close(frame))) => {
                    break match frame {
                        Some(frame) => {
                            GatewayError::closed(u16::from(frame.code), frame.reason.into_owned())
                        }
                        None => GatewayError::StreamEnded,
                    };
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => break GatewayError::Transport(e),
                None => break GatewayError::StreamEnded,
            };

            let envelope = match EventEnvelope::decode(text) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::warn!(error = %GatewayError::Protocol(e), "Malformed frame, skipping");
                    continue;
                }
            };

            if let Some(seq) = envelope.sequence() {
                self.last_seq.fetch_max(seq, Ordering::AcqRel);
            }

            if envelope.op.is_builtin() {
                self.on_builtin(&envelope);
                continue;
            }
            if let OpCode::Unknown(op) = envelope.op {
                tracing::debug!(op, seq = ?envelope.seq, "Unknown op code, forwarding");
            }
            if self.queue.send(envelope).await.is_err() {
                tracing::debug!("Dispatch pump stopped, read pump exiting");
                return;
            }
        };

        tracing::debug!(error = %err, "Read pump stopped");
        drop(self.queue);
        raise(&self.close, err);
    }

    fn on_builtin(&self, envelope: &EventEnvelope) {
        match envelope.op {
            OpCode::Hello => self.on_hello(envelope),
            OpCode::HeartbeatAck => tracing::trace!("Heartbeat acknowledged"),
            OpCode::Reconnect => {
                tracing::info!("Server requested reconnect");
                raise(&self.close, GatewayError::ReconnectRequested);
            }
            OpCode::InvalidSession => {
                tracing::warn!("Server invalidated the session");
                raise(&self.close, GatewayError::InvalidSession);
            }
            _ => {}
        }
    }

    fn on_hello(&self, envelope: &EventEnvelope) {
        match envelope.data_as::<HelloPayload>() {
            Ok(hello) if hello.heartbeat_interval > 0 => {
                let period = Duration::from_millis(hello.heartbeat_interval);
                self.heartbeat.send_replace(period);
                tracing::info!(heartbeat_interval_ms = hello.heartbeat_interval, "Hello received");
            }
            Ok(_) => tracing::warn!("Hello without heartbeat interval, keeping current cadence"),
            Err(e) => tracing::warn!(error = %e, "Failed to decode Hello"),
        }
    }
}

pub(crate) struct DispatchPump {
    pub queue: mpsc::Receiver<EventEnvelope>,
    pub close: mpsc::Sender<GatewayError>,
    pub ready: watch::Sender<Option<ReadyPayload>>,
    pub router: Arc<EventRouter>,
}

impl DispatchPump {
    pub(crate) async fn run(mut self) {
        while let Some(envelope) = self.queue.recv().await {
            match envelope.event() {
                Some(EventType::Ready) => {
                    self.on_ready(&envelope);
                    continue;
                }
                Some(EventType::Resumed) => tracing::info!("Session resumed"),
                _ => {}
            }

            let event = envelope.event_type.as_deref().unwrap_or_default();
            match AssertUnwindSafe(self.router.dispatch(&envelope))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, kind = ?e.kind(), event, seq = ?envelope.seq, "Event dispatch failed");
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        panic = %message,
                        event,
                        seq = ?envelope.seq,
                        backtrace = %Backtrace::force_capture(),
                        "Event handler panicked"
                    );
                    raise(&self.close, GatewayError::HandlerPanic(message));
                    return;
                }
            }
        }
        tracing::debug!("Delivery queue closed, dispatch pump stopped");
    }

    fn on_ready(&self, envelope: &EventEnvelope) {
        match envelope.data_as::<ReadyPayload>() {
            Ok(ready) => {
                tracing::info!(
                    session_id = %ready.session_id,
                    version = ready.version,
                    bot = %ready.user.username,
                    shard = ?ready.shard,
                    "Session ready"
                );
                self.ready.send_replace(Some(ready));
            }
            Err(e) => tracing::warn!(error = %e, "Failed to decode READY"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
