//! Blender Builder server.
//!
//! Loads the configuration, initializes logging and serves the render API.

use tracing_subscriber::{EnvFilter, fmt};

use builder_core::config::AppConfig;
use builder_core::config::logging::LoggingConfig;

#[tokio::main]
async fn main() {
    let config_path = AppConfig::path_from_env();
    let config = match AppConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load configuration from '{}': {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    tracing::info!(
        "Starting Blender Builder v{} (config: {})",
        env!("CARGO_PKG_VERSION"),
        config_path.display()
    );

    if let Err(e) = builder_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
