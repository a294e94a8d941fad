//! Test helpers for integration tests
//!
//! Provides a mock gateway that hands every accepted connection to the test, a mock REST API
//! recording posted messages, and shortcuts for running the session manager.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use bot_core::{GatewayInfo, Intents, Message};
use bot_gateway::{
    ConnectionConfig, EventEnvelope, EventRouter, GatewayResult, ManagerConfig, MessageHandler,
    SessionManager,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;

use crate::fixtures::test_token;

/// How long helpers wait for anything before giving up
pub const WAIT: Duration = Duration::from_secs(5);

/// Pacing small enough to keep tests fast
pub fn test_manager_config() -> ManagerConfig {
    ManagerConfig {
        start_window: Duration::from_millis(100),
        start_unit: Duration::from_millis(100),
        connection: ConnectionConfig {
            default_heartbeat: Duration::from_secs(60),
            message_queue_size: 100,
            drain_timeout: Duration::from_secs(1),
        },
    }
}

/// Run a session manager in the background
pub fn spawn_manager(manager: SessionManager, info: GatewayInfo, intents: Intents) -> JoinHandle<GatewayResult<()>> {
    tokio::spawn(async move { manager.start(&info, &test_token(), intents).await })
}

// ============================================================================
// Mock gateway
// ============================================================================

/// WebSocket server standing in for the gateway
pub struct MockGateway {
    pub url: String,
    connections: mpsc::UnboundedReceiver<MockConnection>,
    accepted: Arc<AtomicUsize>,
    _handle: JoinHandle<()>,
}

impl MockGateway {
    /// Start listening on a random local port
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("ws://{}/websocket", listener.local_addr()?);
        let (tx, connections) = mpsc::unbounded_channel();
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = accepted.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };
                let index = counter.fetch_add(1, Ordering::SeqCst);
                if tx.send(MockConnection { ws, index }).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            url,
            connections,
            accepted,
            _handle: handle,
        })
    }

    /// Wait for the next client connection
    pub async fn next_connection(&mut self) -> Option<MockConnection> {
        tokio::time::timeout(WAIT, self.connections.recv()).await.ok()?
    }

    /// Check that no client connects within `window`
    pub async fn no_connection_within(&mut self, window: Duration) -> bool {
        tokio::time::timeout(window, self.connections.recv()).await.is_err()
    }

    /// Number of connections accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

/// Server side of one client connection
pub struct MockConnection {
    ws: WebSocketStream<TcpStream>,
    pub index: usize,
}

impl MockConnection {
    /// Next JSON text frame, or `None` once the client closed or nothing arrived in time
    pub async fn recv_json(&mut self) -> Option<Value> {
        loop {
            let frame = tokio::time::timeout(WAIT, self.ws.next()).await.ok()??.ok()?;
            match frame {
                WsMessage::Text(text) => return serde_json::from_str(&text).ok(),
                WsMessage::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Next frame with the given op, skipping others such as heartbeats
    pub async fn recv_op(&mut self, op: u8) -> Option<Value> {
        loop {
            let frame = self.recv_json().await?;
            if frame["op"] == op {
                return Some(frame);
            }
        }
    }

    pub async fn send_json(&mut self, frame: &Value) -> Result<()> {
        self.ws.send(WsMessage::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Close with a gateway close code
    pub async fn close_with(&mut self, code: u16, reason: &str) -> Result<()> {
        self.ws
            .close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.to_string().into(),
            }))
            .await?;
        Ok(())
    }

    /// Wait until the client closes the connection; `false` on timeout
    pub async fn wait_closed(&mut self) -> bool {
        loop {
            match tokio::time::timeout(WAIT, self.ws.next()).await {
                Err(_) => return false,
                Ok(None | Some(Err(_) | Ok(WsMessage::Close(_)))) => return true,
                Ok(Some(Ok(_))) => continue,
            }
        }
    }

    /// Consume the handshake and send Hello; returns the handshake frame
    pub async fn accept_handshake(&mut self, heartbeat_interval_ms: u64) -> Option<Value> {
        let handshake = self.recv_json().await?;
        self.send_json(&crate::fixtures::hello(heartbeat_interval_ms))
            .await
            .ok()?;
        Some(handshake)
    }
}

// ============================================================================
// Mock REST API
// ============================================================================

/// Messages posted to the mock REST API as `(channel_id, body)`
pub type Posted = Arc<Mutex<Vec<(String, Value)>>>;

#[derive(Clone)]
struct RestState {
    gateway: Arc<GatewayInfo>,
    posted: Posted,
}

/// HTTP server standing in for the REST API
pub struct MockRest {
    pub base_url: String,
    pub posted: Posted,
    _handle: JoinHandle<()>,
}

impl MockRest {
    /// Serve `gateway` from `/gateway/bot` and record posted messages
    pub async fn start(gateway: GatewayInfo) -> Result<Self> {
        let posted = Posted::default();
        let state = RestState {
            gateway: Arc::new(gateway),
            posted: posted.clone(),
        };

        let app = Router::new()
            .route(
                "/gateway/bot",
                get(|State(state): State<RestState>| async move { Json(state.gateway.as_ref().clone()) }),
            )
            .route(
                "/channels/:channel_id/messages",
                post(
                    |State(state): State<RestState>,
                     Path(channel_id): Path<String>,
                     Json(body): Json<Value>| async move {
                        let mut posted = state.posted.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                        posted.push((channel_id.clone(), body.clone()));
                        Json(serde_json::json!({
                            "id": format!("reply-{}", posted.len()),
                            "channel_id": channel_id,
                            "content": body["content"],
                        }))
                    },
                ),
            )
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            base_url,
            posted,
            _handle: handle,
        })
    }

    /// Snapshot of posted messages
    pub fn posted(&self) -> Vec<(String, Value)> {
        self.posted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Forwards every message it handles to a channel
pub struct RecordingHandler {
    tx: mpsc::UnboundedSender<(Option<String>, Message)>,
}

impl RecordingHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(Option<String>, Message)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(&self, event: &EventEnvelope, message: Message) -> anyhow::Result<()> {
        self.tx.send((event.event_type.clone(), message))?;
        Ok(())
    }
}

/// Router with a recording at-message handler
pub fn recording_router() -> (EventRouter, mpsc::UnboundedReceiver<(Option<String>, Message)>) {
    let (handler, rx) = RecordingHandler::new();
    (EventRouter::new().on_at_message(handler), rx)
}
