//! REST client
//!
//! One `reqwest::Client` is built per process and reused for every call.

use crate::error::{ApiError, ApiResult};
use bot_core::{GatewayInfo, Message, MessageToCreate, Token};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Gateway bootstrap endpoint
const GATEWAY_BOT_PATH: &str = "/gateway/bot";

/// REST client configuration
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL, e.g. `https://api.sgroup.qq.com`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Authenticated client for the open platform REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client that sends `Authorization: Bot <app_id>.<secret>` on every request
    pub fn new(config: &ApiClientConfig, token: &Token) -> ApiResult<Self> {
        let mut auth = HeaderValue::from_str(&token.authorization_header())
            .map_err(|_| ApiError::InvalidToken("contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }

        Ok(Self { http, base_url })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the gateway URL, recommended shard count and session start limit
    pub async fn gateway_info(&self) -> ApiResult<GatewayInfo> {
        let url = self.url(GATEWAY_BOT_PATH);
        tracing::debug!(url = %url, "Fetching gateway info");

        let response = self.http.get(&url).send().await?;
        let info: GatewayInfo = Self::decode(response).await?;

        tracing::info!(
            url = %info.url,
            shards = info.shards,
            max_concurrency = info.session_start_limit.max_concurrency,
            remaining = info.session_start_limit.remaining,
            "Gateway info fetched"
        );
        Ok(info)
    }

    /// Post a message to a channel
    pub async fn post_message(
        &self,
        channel_id: &str,
        message: &MessageToCreate,
    ) -> ApiResult<Message> {
        if channel_id.is_empty() || channel_id.contains('/') {
            return Err(ApiError::InvalidUrl(format!("bad channel id: {channel_id:?}")));
        }
        let url = self.url(&format!("/channels/{channel_id}/messages"));
        tracing::debug!(
            channel_id = %channel_id,
            passive = message.is_passive(),
            "Posting message"
        );

        let response = self.http.post(&url).json(message).send().await?;
        Self::decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "REST call failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
