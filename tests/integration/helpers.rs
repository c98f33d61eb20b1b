//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use builder_api::{AppState, build_router};
use builder_core::config::AppConfig;
use builder_core::config::render::RenderSettings;
use builder_render::{JobRunner, ProcessOutcome, RenderError, RenderJobSpec, RenderProcessor};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Directory renders are written to
    pub output_dir: PathBuf,
    /// Installation directory (config location)
    pub install_dir: PathBuf,
    _temp: TempDir,
}

impl TestApp {
    /// App whose rendering tool is a shell script with `body`.
    #[cfg(unix)]
    pub fn with_fake_blender(body: &str) -> Self {
        Self::with_fake_blender_configured(body, |_| {})
    }

    /// Like [`TestApp::with_fake_blender`], with a chance to adjust the
    /// configuration first.
    #[cfg(unix)]
    pub fn with_fake_blender_configured(body: &str, configure: impl FnOnce(&mut AppConfig)) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let tool = write_script(temp.path(), "blender", body);
        let mut config = test_config(temp.path(), Some(tool.display().to_string()));
        configure(&mut config);
        Self::from_state(temp, AppState::new(config))
    }

    /// App configured with an arbitrary tool path.
    pub fn with_tool_path(tool: &str) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path(), Some(tool.to_string()));
        Self::from_state(temp, AppState::new(config))
    }

    /// App whose renders are handled by `runner` instead of a process.
    pub fn with_runner(runner: Arc<dyn JobRunner>) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path(), None);
        let processor = RenderProcessor::with_runner(&config, runner);
        Self::from_state(temp, AppState::with_processor(config, processor))
    }

    fn from_state(temp: TempDir, state: AppState) -> Self {
        Self {
            output_dir: state.config.render.effective_output_dir(),
            install_dir: state.config.render.effective_install_dir(),
            router: build_router(state),
            _temp: temp,
        }
    }

    /// File the fake tool records its arguments into.
    pub fn args_file(&self) -> PathBuf {
        self.install_dir.join("args.txt")
    }

    /// Make an HTTP request with an optional JSON body.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.request_raw(method, path, body_str, Some("application/json"))
            .await
    }

    /// Make an HTTP request with a raw body.
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: String,
        content_type: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            req = req.header("Content-Type", content_type);
        }
        let req = req
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// POST /render with the given parameters.
    pub async fn render(&self, post_count: Value, color: Value) -> TestResponse {
        self.request(
            "POST",
            "/render",
            Some(serde_json::json!({ "postCount": post_count, "color": color })),
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Runner that counts invocations and always succeeds.
#[derive(Default)]
pub struct CountingRunner {
    pub calls: AtomicUsize,
}

impl CountingRunner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRunner for CountingRunner {
    async fn run(&self, _spec: &RenderJobSpec) -> Result<ProcessOutcome, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProcessOutcome::Success)
    }
}

fn test_config(install_dir: &Path, tool: Option<String>) -> AppConfig {
    AppConfig {
        blender_path: tool,
        base_file: "scenes/base.blend".to_string(),
        component_file: "scenes/post.blend".to_string(),
        spacing: None,
        server: Default::default(),
        render: RenderSettings {
            install_dir: Some(install_dir.to_path_buf()),
            output_dir: Some(PathBuf::from("renders")),
            ..Default::default()
        },
        logging: Default::default(),
    }
}

/// Write an executable `/bin/sh` script. The script records its
/// arguments, one per line, into `args.txt` next to it before running
/// `body`.
#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let args_file = dir.join("args.txt");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{}\n",
        args_file.display(),
        body
    );
    std::fs::write(&path, script).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}
