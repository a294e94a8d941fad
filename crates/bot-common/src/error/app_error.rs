//! Application error types
//!
//! Unified error type for the bot process entry point.

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Startup errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    /// Fetching gateway metadata failed; no shard was started
    #[error("Gateway bootstrap failed: {0}")]
    Bootstrap(String),

    // Runtime errors
    #[error("Gateway error: {0}")]
    Gateway(String),
}

impl AppError {
    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Tracing(_) => 78,
            Self::Bootstrap(_) => 69,
            Self::Gateway(_) => 70,
        }
    }

    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Tracing(_) => "TRACING_ERROR",
            Self::Bootstrap(_) => "BOOTSTRAP_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
        }
    }

    /// Create a bootstrap error from any displayable cause
    pub fn bootstrap(cause: impl std::fmt::Display) -> Self {
        Self::Bootstrap(cause.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
