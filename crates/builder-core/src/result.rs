//! Convenience result type alias for Blender Builder.

use crate::error::AppError;

/// A specialized `Result` type for Builder operations.
pub type AppResult<T> = Result<T, AppError>;
