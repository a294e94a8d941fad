//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    // =========================================================================
    // Gateway Metadata Errors
    // =========================================================================
    #[error("Gateway URL is empty")]
    EmptyGatewayUrl,

    #[error("Gateway URL has unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Gateway reported zero shards")]
    NoShards,

    // =========================================================================
    // Token Errors
    // =========================================================================
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl DomainError {
    /// Get error code for logs
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyGatewayUrl => "EMPTY_GATEWAY_URL",
            Self::UnsupportedScheme(_) => "UNSUPPORTED_SCHEME",
            Self::NoShards => "NO_SHARDS",
            Self::InvalidToken(_) => "INVALID_TOKEN",
        }
    }
}
