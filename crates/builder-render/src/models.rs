//! Domain models for the render pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Number of posts in the rendered rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostCount {
    /// Four-post rack.
    #[serde(rename = "4")]
    Four,
    /// Six-post rack.
    #[serde(rename = "6")]
    Six,
}

impl PostCount {
    /// Every accepted post count, in wire order.
    pub const ALL: [PostCount; 2] = [PostCount::Four, PostCount::Six];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Four => "4",
            Self::Six => "6",
        }
    }

    /// Parse the exact wire representation. No trimming or numeric
    /// coercion is applied.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for PostCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paint color applied to the rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Red.
    Red,
    /// Blue.
    Blue,
    /// White.
    White,
}

impl Color {
    /// Every accepted color, in wire order.
    pub const ALL: [Color; 3] = [Color::Red, Color::Blue, Color::White];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::White => "white",
        }
    }

    /// Parse the exact wire representation (case-sensitive).
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Post count variant.
    pub post_count: PostCount,
    /// Color variant.
    pub color: Color,
}

/// Fully resolved invocation of the rendering tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJobSpec {
    /// Executable to launch.
    pub executable_path: String,
    /// Arguments in the exact order the control script expects.
    pub arguments: Vec<String>,
    /// Image the control script is told to write.
    pub output_path: PathBuf,
}

impl RenderJobSpec {
    /// Shell-like rendering of the command line, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable_path.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Terminal state of one render process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The tool exited with status zero.
    Success,
    /// The tool ran and exited unsuccessfully.
    ToolFailure {
        /// Exit status; `None` when the process was ended by a signal.
        exit_code: Option<i32>,
        /// Everything written to stdout, in arrival order.
        stdout: String,
        /// Everything written to stderr, in arrival order.
        stderr: String,
    },
    /// The tool could not be started.
    LaunchFailure {
        /// Description of the launch error.
        error: String,
    },
    /// The tool exceeded the configured deadline and was killed.
    Timeout {
        /// The deadline that was exceeded.
        timeout_seconds: u64,
        /// Output captured before the kill.
        stdout: String,
        /// Error output captured before the kill.
        stderr: String,
    },
}

impl ProcessOutcome {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ToolFailure { .. } => "tool_failure",
            Self::LaunchFailure { .. } => "launch_failure",
            Self::Timeout { .. } => "timeout",
        }
    }
}
