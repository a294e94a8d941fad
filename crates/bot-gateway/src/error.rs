//! Gateway errors
//!
//! Every way a connection can stop, plus bootstrap failures raised before any connection exists.

use bot_core::DomainError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Broad classification used for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Gateway metadata unusable, nothing was started
    Bootstrap,
    /// Dial, read or write failed
    Transport,
    /// A frame could not be decoded
    Protocol,
    /// The server (or the operator) ended the session
    FatalSession,
    /// An event handler panicked
    HandlerPanic,
    /// An event handler returned an error
    Handler,
}

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid gateway info: {0}")]
    InvalidGatewayInfo(#[from] DomainError),

    #[error("WebSocket error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("Connection closed by server: {code} {reason}")]
    Closed { code: u16, reason: String },

    #[error("Connection stream ended")]
    StreamEnded,

    #[error("Malformed frame: {0}")]
    Protocol(#[source] serde_json::Error),

    #[error("Failed to decode event data: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Server requested reconnect")]
    ReconnectRequested,

    #[error("Server invalidated the session")]
    InvalidSession,

    #[error("Resume signal received")]
    ResumeSignal,

    #[error("Event handler panicked: {0}")]
    HandlerPanic(String),

    #[error("Event handler failed: {0}")]
    Handler(#[source] anyhow::Error),
}

impl GatewayError {
    /// Close frame error
    #[must_use]
    pub fn closed(code: u16, reason: impl Into<String>) -> Self {
        Self::Closed {
            code,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGatewayInfo(_) => ErrorKind::Bootstrap,
            Self::Transport(_) | Self::StreamEnded => ErrorKind::Transport,
            Self::Protocol(_) | Self::Decode(_) => ErrorKind::Protocol,
            Self::Closed { .. } | Self::ReconnectRequested | Self::InvalidSession | Self::ResumeSignal => {
                ErrorKind::FatalSession
            }
            Self::HandlerPanic(_) => ErrorKind::HandlerPanic,
            Self::Handler(_) => ErrorKind::Handler,
        }
    }

    /// Raw close code, if the server closed the connection with one
    #[must_use]
    pub fn close_code(&self) -> Option<u16> {
        match self {
            Self::Closed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
