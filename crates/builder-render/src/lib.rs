//! # builder-render
//!
//! Turns a render request (post count + color) into a headless Blender
//! run and reports the outcome.
//!
//! The pipeline is: [`RequestValidator`] → [`CommandBuilder`] →
//! [`ProcessRunner`] → [`reporter::report`], driven per request by the
//! [`RenderProcessor`], which also applies the optional admission gate
//! and records [`RenderMetrics`].

pub mod command;
pub mod error;
pub mod metrics;
pub mod models;
pub mod processor;
pub mod reporter;
pub mod runner;
pub mod validator;

pub use command::CommandBuilder;
pub use error::RenderError;
pub use metrics::{MetricsSnapshot, RenderMetrics};
pub use models::{Color, PostCount, ProcessOutcome, RenderJobSpec, RenderRequest};
pub use processor::RenderProcessor;
pub use reporter::{RenderFailure, RenderReport, RenderSuccess};
pub use runner::{JobRunner, ProcessRunner};
pub use validator::RequestValidator;
