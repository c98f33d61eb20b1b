//! Maps process outcomes to response payloads.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::ProcessOutcome;

/// Message returned with a successful render.
pub const SUCCESS_MESSAGE: &str = "Render completed successfully";
/// Error label for a tool that exited unsuccessfully.
pub const TOOL_FAILURE_ERROR: &str = "Blender render failed";
/// Error label for a tool that could not be started.
pub const LAUNCH_FAILURE_ERROR: &str = "Failed to start Blender process";
/// Error label for a tool killed at its deadline.
pub const TIMEOUT_ERROR: &str = "Blender render timed out";

/// Body of a successful render response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSuccess {
    /// Always `true`.
    pub success: bool,
    /// Where the image was written.
    pub output_path: String,
    /// Human-readable status.
    pub message: String,
}

/// Body of a failed render response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFailure {
    /// What went wrong, in one phrase.
    pub error: String,
    /// Diagnostic text from the tool or the OS.
    pub details: String,
    /// Exit status, when the tool ran to completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// The exceeded deadline, for timeouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// Response payload for one render job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderReport {
    /// The render produced an image.
    Completed(RenderSuccess),
    /// The render failed.
    Failed(RenderFailure),
}

impl RenderReport {
    /// Whether the render succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Total mapping from a [`ProcessOutcome`] to its response payload.
pub fn report(outcome: ProcessOutcome, output_path: &Path) -> RenderReport {
    match outcome {
        ProcessOutcome::Success => RenderReport::Completed(RenderSuccess {
            success: true,
            output_path: output_path.display().to_string(),
            message: SUCCESS_MESSAGE.to_string(),
        }),
        ProcessOutcome::ToolFailure {
            exit_code,
            stdout,
            stderr,
        } => RenderReport::Failed(RenderFailure {
            error: TOOL_FAILURE_ERROR.to_string(),
            details: prefer_stderr(stdout, stderr),
            exit_code,
            timeout_seconds: None,
        }),
        ProcessOutcome::LaunchFailure { error } => RenderReport::Failed(RenderFailure {
            error: LAUNCH_FAILURE_ERROR.to_string(),
            details: error,
            exit_code: None,
            timeout_seconds: None,
        }),
        ProcessOutcome::Timeout {
            timeout_seconds,
            stdout,
            stderr,
        } => RenderReport::Failed(RenderFailure {
            error: TIMEOUT_ERROR.to_string(),
            details: prefer_stderr(stdout, stderr),
            exit_code: None,
            timeout_seconds: Some(timeout_seconds),
        }),
    }
}

fn prefer_stderr(stdout: String, stderr: String) -> String {
    if stderr.is_empty() { stdout } else { stderr }
}
