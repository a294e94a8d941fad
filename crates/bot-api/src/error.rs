//! REST client error types

use thiserror::Error;

/// REST client error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be built or sent, or the body could not be read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Credentials cannot be sent as an `Authorization` header
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Base URL or path could not be joined into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status code, if the server answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::InvalidToken(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Check if the credentials were rejected
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// REST client result type
pub type ApiResult<T> = Result<T, ApiError>;
