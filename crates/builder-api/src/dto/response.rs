//! Response DTOs.
//!
//! The render result bodies themselves are
//! [`RenderReport`](builder_render::RenderReport).

use builder_render::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Accepted values for each render parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptionsResponse {
    /// Accepted `postCount` values.
    pub post_counts: Vec<String>,
    /// Accepted `color` values.
    pub colors: Vec<String>,
}

/// Render metrics plus admission gate state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMetricsResponse {
    /// Counters and percentiles.
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    /// Free render slots; absent when renders are unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<usize>,
}
