mod config;
mod handlers;
mod routes;
mod state;
mod translate;
mod utils;
mod websocket;

use anyhow::Result;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linguaforge_backend=debug,tower_http=debug")),
        )
        .init();

    let config = load_config();
    if config.translator_config.resolved_api_key().is_none() {
        warn!(
            "No translation API key found; set translator_config.api_key or {}",
            config::API_KEY_ENV
        );
    }

    let app_state = AppState::new(config.clone());
    let app = routes::create_app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.system_config.host, config.system_config.port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from `CONFIG_PATH` or the usual file names, falling
/// back to built-in defaults.
fn load_config() -> Config {
    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("conf.json".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    for path in &config_paths {
        match Config::load(path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                return cfg;
            }
            Err(e) => {
                tracing::debug!("Failed to load config from {}: {:#}", path, e);
            }
        }
    }

    warn!("No configuration file found (tried {:?}), using defaults", config_paths);
    Config::default()
}
