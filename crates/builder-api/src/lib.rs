//! # builder-api
//!
//! HTTP API layer for Blender Builder built on Axum.
//!
//! Exposes `POST /render` plus health, options and metrics endpoints,
//! the CORS and request-logging middleware, and the mapping from
//! [`AppError`](builder_core::AppError) to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use router::build_router;
pub use state::AppState;
