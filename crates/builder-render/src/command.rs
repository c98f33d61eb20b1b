//! Deterministic construction of the rendering tool command line.
//!
//! The argument order and `--name=value` flag names form the contract
//! with the control script and must not change:
//!
//! ```text
//! <tool> --background --python <script> -- \
//!     --base-file=<..> --component-file=<..> --post-count=<..> \
//!     --color=<..> --output=<..> --spacing=<..>
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use builder_core::config::AppConfig;

use crate::models::{RenderJobSpec, RenderRequest};

/// Runs the tool without its UI.
pub const BACKGROUND_FLAG: &str = "--background";
/// Tells the tool to execute the following script.
pub const SCRIPT_FLAG: &str = "--python";
/// Everything after this token is passed to the script.
pub const ARGUMENT_SEPARATOR: &str = "--";

/// Builds [`RenderJobSpec`]s from validated requests and the startup
/// configuration.
#[derive(Debug)]
pub struct CommandBuilder {
    executable: String,
    script_path: PathBuf,
    base_file: PathBuf,
    component_file: PathBuf,
    spacing: f64,
    output_dir: PathBuf,
    stamps: MonotonicMillis,
}

impl CommandBuilder {
    /// Capture everything needed from the configuration up front.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            executable: config.tool_path().to_string(),
            script_path: config.render.effective_script_path(),
            base_file: config.base_file_path(),
            component_file: config.component_file_path(),
            spacing: config.spacing(),
            output_dir: config.render.effective_output_dir(),
            stamps: MonotonicMillis::default(),
        }
    }

    /// Directory generated output paths live in.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the job for `request`. Each call yields a fresh output path.
    pub fn build(&self, request: &RenderRequest) -> RenderJobSpec {
        let output_path = self
            .output_dir
            .join(Self::output_file_name(request, self.stamps.next()));

        let arguments = vec![
            BACKGROUND_FLAG.to_string(),
            SCRIPT_FLAG.to_string(),
            self.script_path.display().to_string(),
            ARGUMENT_SEPARATOR.to_string(),
            format!("--base-file={}", self.base_file.display()),
            format!("--component-file={}", self.component_file.display()),
            format!("--post-count={}", request.post_count),
            format!("--color={}", request.color),
            format!("--output={}", output_path.display()),
            format!("--spacing={}", self.spacing),
        ];

        RenderJobSpec {
            executable_path: self.executable.clone(),
            arguments,
            output_path,
        }
    }

    /// `render_{postCount}post_{color}_{timestamp}.png`
    pub fn output_file_name(request: &RenderRequest, timestamp: i64) -> String {
        format!(
            "render_{}post_{}_{}.png",
            request.post_count, request.color, timestamp
        )
    }
}

/// Milliseconds since the epoch, bumped past the previous value when the
/// clock has not advanced, so no two calls return the same stamp.
#[derive(Debug, Default)]
struct MonotonicMillis {
    last: AtomicI64,
}

impl MonotonicMillis {
    fn next(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            }) {
            Ok(p) | Err(p) => p,
        };
        now.max(previous + 1)
    }
}
