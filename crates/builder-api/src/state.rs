//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use builder_core::config::AppConfig;
use builder_render::RenderProcessor;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Immutable startup configuration.
    pub config: Arc<AppConfig>,
    /// Render pipeline.
    pub processor: RenderProcessor,
    /// When the state was built, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// State running real render processes.
    pub fn new(config: AppConfig) -> Self {
        let processor = RenderProcessor::new(&config);
        Self::with_processor(config, processor)
    }

    /// State around an already-built processor.
    pub fn with_processor(config: AppConfig, processor: RenderProcessor) -> Self {
        Self {
            config: Arc::new(config),
            processor,
            started_at: Instant::now(),
        }
    }
}
