//! # builder-core
//!
//! Core crate for Blender Builder. Contains the configuration schemas
//! loaded once at startup and the unified error system.
//!
//! This crate has **no** internal dependencies on other Builder crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::AppError;
pub use result::AppResult;
