//! Maps domain errors to HTTP responses.
//!
//! Client errors become `400 {"error": message}`; everything else is
//! logged and becomes a 5xx with the message in `details`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use builder_core::error::{AppError, ErrorKind};
use builder_render::RenderError;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable error.
    pub error: String,
    /// Optional diagnostic detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler error wrapping [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, body) = match err.kind {
            ErrorKind::Validation => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse {
                    error: err.message,
                    details: None,
                },
            ),
            ErrorKind::ServiceUnavailable => {
                tracing::warn!(error = %err.message, "Service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiErrorResponse {
                        error: "Service unavailable".to_string(),
                        details: Some(err.message),
                    },
                )
            }
            _ => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse {
                        error: "Internal server error".to_string(),
                        details: Some(err.message),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
