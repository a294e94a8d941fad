//! Configuration structs

mod app_config;

pub use app_config::{
    ApiConfig, AppConfig, BotConfig, ConfigError, GatewayConfig, LogConfig, CONFIG_PATH_ENV,
};
