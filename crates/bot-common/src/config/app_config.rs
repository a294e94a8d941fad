//! Application configuration structs
//!
//! Loads configuration from an optional YAML file layered under environment variables.

use bot_core::Token;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "BOT_CONFIG";

/// Prefix for environment overrides, e.g. `BOT__BOT__APP_ID`, `BOT__GATEWAY__START_WINDOW_MS`
const ENV_PREFIX: &str = "BOT";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bot: BotConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Bot credentials
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    #[serde(alias = "appid")]
    pub app_id: u64,
    pub token: String,
}

impl BotConfig {
    /// Build the credentials used for REST and gateway authentication
    pub fn token(&self) -> Result<Token, ConfigError> {
        Token::try_new(self.app_id, self.token.clone())
            .map_err(|e| ConfigError::InvalidValue("bot", e.to_string()))
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("app_id", &self.app_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Open platform REST API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// Gateway session settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Rate-limit window over which `max_concurrency` sessions may start
    #[serde(default = "default_start_window_ms")]
    pub start_window_ms: u64,
    /// Granularity the pacing interval is rounded to
    #[serde(default = "default_start_unit_ms")]
    pub start_unit_ms: u64,
    /// Heartbeat cadence used until the server's Hello arrives
    #[serde(default = "default_heartbeat_ms")]
    pub default_heartbeat_ms: u64,
    /// Capacity of each connection's inbound delivery queue
    #[serde(default = "default_message_queue_size")]
    pub message_queue_size: usize,
    /// Force every shard to reconnect (and resume) on SIGHUP
    #[serde(default = "default_resume_on_sighup")]
    pub resume_on_sighup: bool,
}

impl GatewayConfig {
    #[must_use]
    pub fn start_window(&self) -> Duration {
        Duration::from_millis(self.start_window_ms)
    }

    #[must_use]
    pub fn start_unit(&self) -> Duration {
        Duration::from_millis(self.start_unit_ms)
    }

    #[must_use]
    pub fn default_heartbeat(&self) -> Duration {
        Duration::from_millis(self.default_heartbeat_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            start_window_ms: default_start_window_ms(),
            start_unit_ms: default_start_unit_ms(),
            default_heartbeat_ms: default_heartbeat_ms(),
            message_queue_size: default_message_queue_size(),
            resume_on_sighup: default_resume_on_sighup(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_api_base_url() -> String {
    "https://api.sgroup.qq.com".to_string()
}

fn default_api_timeout_secs() -> u64 {
    3
}

fn default_start_window_ms() -> u64 {
    2000
}

fn default_start_unit_ms() -> u64 {
    1000
}

fn default_heartbeat_ms() -> u64 {
    60_000
}

fn default_message_queue_size() -> usize {
    2000
}

fn default_resume_on_sighup() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from `.env`, the file named by `BOT_CONFIG` and `BOT__*` variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let path = env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref().map(Path::new))
    }

    /// Load configuration from an optional YAML file plus `BOT__*` environment overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text (no environment layering)
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = ::config::Config::builder()
            .add_source(::config::File::from_str(yaml, ::config::FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bot.token()?;
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("api.base_url", "must not be empty".into()));
        }
        if self.gateway.start_window_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway.start_window_ms",
                "must be greater than zero".into(),
            ));
        }
        if self.gateway.start_unit_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway.start_unit_ms",
                "must be greater than zero".into(),
            ));
        }
        if self.gateway.default_heartbeat_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway.default_heartbeat_ms",
                "must be greater than zero".into(),
            ));
        }
        if self.gateway.message_queue_size == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway.message_queue_size",
                "must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
