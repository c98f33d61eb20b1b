//! Server runner: wires configuration, render pipeline and router into a
//! listening Axum server.

use builder_core::config::AppConfig;
use builder_core::error::AppError;
use builder_core::result::AppResult;

use crate::router::build_router;
use crate::state::AppState;

/// Runs the Blender Builder server until Ctrl-C.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    let script = config.render.effective_script_path();
    if !script.is_file() {
        tracing::warn!(
            script = %script.display(),
            "Control script not found; renders will fail until it is installed"
        );
    }

    tracing::info!(
        tool = %config.tool_path(),
        script = %script.display(),
        output_dir = %config.render.effective_output_dir().display(),
        max_concurrent_renders = ?config.render.concurrency_limit(),
        timeout_seconds = ?config.render.timeout().map(|t| t.as_secs()),
        "Render pipeline configured"
    );

    let addr = config.server.bind_address();
    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Blender Builder listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
