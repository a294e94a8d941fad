//! # bot-api
//!
//! Thin REST client for the open platform: the one-time gateway bootstrap call and
//! outbound message posting used by application handlers.

mod client;
mod error;

pub use client::{ApiClient, ApiClientConfig, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
