//! Route definitions for the Blender Builder HTTP API.
//!
//! Routes are mounted at the root; a reverse proxy exposes them under
//! `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(render_routes())
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Render submission, accepted values and metrics.
fn render_routes() -> Router<AppState> {
    Router::new()
        .route("/render", post(handlers::render::render))
        .route("/render/options", get(handlers::render::options))
        .route("/render/metrics", get(handlers::render::metrics))
}

/// Health endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
