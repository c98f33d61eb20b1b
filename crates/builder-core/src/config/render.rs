//! Render pipeline configuration.
//!
//! Paths given here, and the scene files named at the top level, are
//! resolved against a fixed installation directory rather than the
//! process working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for building and running render jobs.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    /// Directory the control script and relative scene paths live in.
    ///
    /// When absent from the file, the loader fills in the directory
    /// containing the configuration file.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,

    /// Control script executed by the rendering tool.
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Directory rendered images are written to (default `~/Desktop`).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrently running render processes; 0 means unlimited.
    #[serde(default)]
    #[validate(range(max = 64))]
    pub max_concurrent_renders: usize,

    /// Per-render deadline in seconds; 0 lets a render run indefinitely.
    #[serde(default)]
    #[validate(range(max = 86400))]
    pub timeout_seconds: u64,

    /// Forward tool stdout/stderr lines to the log as they arrive.
    #[serde(default = "default_true")]
    pub log_tool_output: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            install_dir: None,
            script_path: default_script_path(),
            output_dir: None,
            max_concurrent_renders: 0,
            timeout_seconds: 0,
            log_tool_output: true,
        }
    }
}

impl RenderSettings {
    /// The installation directory, or the working directory if none was
    /// configured or inferred.
    pub fn effective_install_dir(&self) -> PathBuf {
        self.install_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve `path` against the installation directory. Absolute paths
    /// are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.effective_install_dir().join(path)
    }

    /// Absolute location of the control script.
    pub fn effective_script_path(&self) -> PathBuf {
        self.resolve(&self.script_path)
    }

    /// Directory rendered images are written to.
    ///
    /// Falls back to the user's desktop, then to the installation
    /// directory when no home directory can be determined.
    pub fn effective_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => self.resolve(dir),
            None => home_dir()
                .map(|home| home.join("Desktop"))
                .unwrap_or_else(|| self.effective_install_dir()),
        }
    }

    /// Render deadline, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    /// Concurrency limit, if one is configured.
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent_renders > 0).then_some(self.max_concurrent_renders)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

fn default_script_path() -> PathBuf {
    PathBuf::from("scripts").join("blender_render.py")
}

fn default_true() -> bool {
    true
}
