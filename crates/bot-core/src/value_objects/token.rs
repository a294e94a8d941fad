//! Bot credentials
//!
//! A token is an application ID plus its secret. Both the REST `Authorization` header and
//! the gateway handshake use the same `"<app_id>.<secret>"` rendering.

use crate::error::DomainError;
use std::fmt;

/// Authorization scheme used by the open platform REST API
pub const AUTH_SCHEME: &str = "Bot";

/// Bot application credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    app_id: u64,
    secret: String,
}

impl Token {
    /// Create a token from an application ID and its secret
    pub fn new(app_id: u64, secret: impl Into<String>) -> Self {
        Self {
            app_id,
            secret: secret.into(),
        }
    }

    /// Create a token, rejecting a zero application ID or an empty secret
    pub fn try_new(app_id: u64, secret: impl Into<String>) -> Result<Self, DomainError> {
        let secret = secret.into();
        if app_id == 0 {
            return Err(DomainError::InvalidToken("app_id must be non-zero".to_string()));
        }
        if secret.trim().is_empty() {
            return Err(DomainError::InvalidToken("secret must not be empty".to_string()));
        }
        Ok(Self::new(app_id, secret))
    }

    /// Application ID
    #[inline]
    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    /// Render the token the way the gateway handshake expects it
    pub fn as_auth_string(&self) -> String {
        format!("{}.{}", self.app_id, self.secret)
    }

    /// Full `Authorization` header value for REST calls
    pub fn authorization_header(&self) -> String {
        format!("{AUTH_SCHEME} {}", self.as_auth_string())
    }
}

// Never print the secret.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("app_id", &self.app_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
