//! Application configuration schemas.
//!
//! The configuration is a single JSON document loaded once at process
//! start via the `config` crate, with `BUILDER__`-prefixed environment
//! variables layered on top (`BUILDER__RENDER__TIMEOUT_SECONDS=30`
//! overrides `render.timeoutSeconds`). It is immutable afterwards and
//! handed to the render pipeline explicitly.

pub mod app;
pub mod logging;
pub mod render;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::app::ServerConfig;
use self::logging::LoggingConfig;
use self::render::RenderSettings;

use crate::error::AppError;
use crate::result::AppResult;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "BUILDER_CONFIG";

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "BUILDER";

/// Separates the prefix and nested key segments in override names.
pub const ENV_SEPARATOR: &str = "__";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Rendering tool invoked when `blenderPath` is not configured.
pub const DEFAULT_TOOL_PATH: &str = "blender";

/// Spacing passed to the control script when `spacing` is not configured.
pub const DEFAULT_SPACING: f64 = 2.0;

/// Root application configuration.
///
/// The four top-level scene keys keep the camelCase names of the
/// on-disk format; the remaining sections are optional and fully
/// defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Rendering tool executable. Falls back to [`DEFAULT_TOOL_PATH`].
    #[serde(default)]
    pub blender_path: Option<String>,
    /// Base scene file handed to the control script.
    #[validate(length(min = 1))]
    pub base_file: String,
    /// Component file handed to the control script.
    #[validate(length(min = 1))]
    pub component_file: String,
    /// Component spacing. Falls back to [`DEFAULT_SPACING`].
    #[serde(default)]
    pub spacing: Option<f64>,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Render pipeline settings.
    #[serde(default)]
    #[validate(nested)]
    pub render: RenderSettings,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the configuration file at `path`, applying `BUILDER__`
    /// overrides from the process environment.
    ///
    /// The file must exist and parse, and every override must name a
    /// known key; failures are reported as
    /// [`ErrorKind::Configuration`](crate::error::ErrorKind::Configuration)
    /// and are meant to abort startup.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        Self::load_with_env(path.as_ref(), None)
    }

    /// Like [`AppConfig::load`], reading overrides from `env` instead of
    /// the process environment when given.
    fn load_with_env(
        path: &Path,
        env: Option<config::Map<String, String>>,
    ) -> AppResult<Self> {
        if !path.is_file() {
            return Err(AppError::configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let overrides = environment(env);

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json))
            .add_source(overrides.clone())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to read config: {e}")))?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.reject_unknown_overrides(overrides)?;

        if config.render.install_dir.is_none() {
            let absolute = std::path::absolute(path)?;
            config.render.install_dir = absolute.parent().map(Path::to_path_buf);
        }

        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            tool = %config.tool_path(),
            install_dir = %config.render.effective_install_dir().display(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Fail on environment overrides that match no configuration key.
    /// `try_deserialize` drops such keys without complaint.
    fn reject_unknown_overrides(&self, overrides: config::Environment) -> AppResult<()> {
        let overrides: serde_json::Value = config::Config::builder()
            .add_source(overrides)
            .build()?
            .try_deserialize()?;
        let known = serde_json::to_value(self)?;

        let mut unknown = Vec::new();
        collect_unknown_keys("", &overrides, &known, &mut unknown);
        if unknown.is_empty() {
            return Ok(());
        }

        Err(AppError::configuration(format!(
            "Unknown {ENV_PREFIX}{ENV_SEPARATOR} override(s): {} \
             (use SCREAMING_SNAKE_CASE key names, e.g. {ENV_PREFIX}{ENV_SEPARATOR}RENDER{ENV_SEPARATOR}TIMEOUT_SECONDS)",
            unknown.join(", ")
        )))
    }

    /// Resolve the configuration path from the environment.
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// The rendering tool to execute. Blank values count as unset.
    pub fn tool_path(&self) -> &str {
        self.blender_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_TOOL_PATH)
    }

    /// Effective component spacing.
    pub fn spacing(&self) -> f64 {
        self.spacing.unwrap_or(DEFAULT_SPACING)
    }

    /// Base scene file resolved against the installation directory.
    pub fn base_file_path(&self) -> PathBuf {
        self.render.resolve(&self.base_file)
    }

    /// Component file resolved against the installation directory.
    pub fn component_file_path(&self) -> PathBuf {
        self.render.resolve(&self.component_file)
    }
}

/// Environment source: `BUILDER__SECTION__SNAKE_KEY` becomes
/// `section.snakeKey`, matching the camelCase file keys.
fn environment(vars: Option<config::Map<String, String>>) -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .convert_case(config::Case::Camel)
        .try_parsing(true)
        .source(vars)
}

/// Dotted paths present in `overrides` but absent from `known`.
fn collect_unknown_keys(
    prefix: &str,
    overrides: &serde_json::Value,
    known: &serde_json::Value,
    unknown: &mut Vec<String>,
) {
    let serde_json::Value::Object(entries) = overrides else {
        return;
    };

    for (key, value) in entries {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match known.get(key) {
            None => unknown.push(path),
            Some(section) if section.is_object() => {
                collect_unknown_keys(&path, value, section, unknown)
            }
            Some(_) if value.is_object() => unknown.push(path),
            Some(_) => {}
        }
    }
}
