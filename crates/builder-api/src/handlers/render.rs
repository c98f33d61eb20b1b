//! Render handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use builder_core::error::AppError;
use builder_render::{Color, PostCount, RenderReport};

use crate::dto::request::RenderRequestBody;
use crate::dto::response::{RenderMetricsResponse, RenderOptionsResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /render
///
/// Validates the body, runs the render to completion and answers with
/// 200 on success or 500 with the tool's diagnostics. Invalid input is
/// answered with 400 before any process is started.
pub async fn render(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<RenderReport>), ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        state.processor.metrics().record_rejected();
        AppError::validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let request = state.processor.validate(body.post_count(), body.color())?;
    let report = state.processor.submit(request).await?;

    Ok((status_for(&report), Json(report)))
}

/// 200 for a produced image, 500 for any failed render.
fn status_for(report: &RenderReport) -> StatusCode {
    if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// GET /render/options
pub async fn options() -> Json<RenderOptionsResponse> {
    Json(RenderOptionsResponse {
        post_counts: PostCount::ALL.iter().map(|p| p.as_str().to_string()).collect(),
        colors: Color::ALL.iter().map(|c| c.as_str().to_string()).collect(),
    })
}

/// GET /render/metrics
pub async fn metrics(State(state): State<AppState>) -> Json<RenderMetricsResponse> {
    Json(RenderMetricsResponse {
        metrics: state.processor.metrics_snapshot(),
        available_slots: state.processor.available_slots(),
    })
}
