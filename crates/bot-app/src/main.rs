//! Bot process entry point
//!
//! Run with:
//! ```bash
//! BOT_CONFIG=config.yaml cargo run -p bot-app
//! ```
//!
//! Configuration is loaded from the YAML file named by `BOT_CONFIG` and `BOT__*` environment
//! variables.

mod handlers;

use bot_api::{ApiClient, ApiClientConfig};
use bot_common::{try_init_tracing_with_config, AppConfig, AppError, AppResult, TracingConfig};
use bot_gateway::{EventRouter, ManagerConfig, ResumeSignal, SessionManager};
use handlers::EchoHandler;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(AppError::from(e).exit_code());
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::from(&config.log)) {
        eprintln!("Failed to initialize tracing: {e}");
        std::process::exit(AppError::from(e).exit_code());
    }

    if let Err(e) = run(config).await {
        error!(error = %e, code = e.error_code(), "Bot stopped");
        std::process::exit(e.exit_code());
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    let token = config.bot.token()?;
    info!(
        app_id = token.app_id(),
        base_url = %config.api.base_url,
        "Configuration loaded"
    );

    let api_config = ApiClientConfig::new(&config.api.base_url).with_timeout(config.api.timeout());
    let api = ApiClient::new(&api_config, &token).map_err(AppError::bootstrap)?;

    // No shard can start without gateway metadata.
    let gateway = api.gateway_info().await.map_err(AppError::bootstrap)?;

    let router = EventRouter::new().on_at_message(EchoHandler::new(api.clone()));
    let intents = router.intents();
    let manager = SessionManager::new(ManagerConfig::from(&config.gateway), router);

    if config.gateway.resume_on_sighup {
        spawn_resume_on_sighup(manager.resume_signal());
    }

    tokio::select! {
        result = manager.start(&gateway, &token, intents) => {
            result.map_err(|e| AppError::Gateway(e.to_string()))?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

#[cfg(unix)]
fn spawn_resume_on_sighup(resume: ResumeSignal) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(e) => {
                warn!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, resuming all shards");
            resume.trigger();
        }
    });
}

#[cfg(not(unix))]
fn spawn_resume_on_sighup(_resume: ResumeSignal) {
    warn!("Resume on SIGHUP is only available on unix");
}
