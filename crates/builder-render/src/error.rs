//! Error type for the render pipeline.
//!
//! Only failures that prevent a [`ProcessOutcome`](crate::ProcessOutcome)
//! from being produced live here. A tool that runs and fails is an
//! outcome, not an error.

use builder_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Errors raised while handling a render request.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A request field is missing or outside its closed set of values.
    #[error("{message}")]
    InvalidInput {
        /// Name of the offending field as it appears on the wire.
        field: &'static str,
        /// Message naming the field and its allowed values.
        message: String,
    },

    /// The admission gate was closed while a request was waiting on it.
    #[error("Render admission gate closed: {reason}")]
    SemaphoreClosed {
        /// Description of the failure.
        reason: String,
    },

    /// The task running a render panicked or was aborted.
    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// I/O error outside the child process itself (output directory,
    /// waiting on the child).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Create an invalid-input error for `field`.
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::InvalidInput { .. } => AppError::validation(err.to_string()),
            RenderError::SemaphoreClosed { .. } => AppError::service_unavailable(err.to_string()),
            RenderError::Io(e) => AppError::with_source(ErrorKind::Io, e.to_string(), e),
            RenderError::Join(_) => AppError::internal(err.to_string()),
        }
    }
}
