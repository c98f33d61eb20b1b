//! Render endpoint tests.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{CountingRunner, TestApp};

/// Fake tool body that creates the file named by `--output=`.
#[cfg(unix)]
const TOUCH_OUTPUT: &str = r#"for arg in "$@"; do
  case "$arg" in
    --output=*) : > "${arg#--output=}" ;;
  esac
done"#;

#[cfg(unix)]
#[tokio::test]
async fn test_render_success_reports_output_path() {
    let app = TestApp::with_fake_blender(TOUCH_OUTPUT);

    let response = app.render(json!("4"), json!("red")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["message"], "Render completed successfully");

    let output_path = response.body["outputPath"].as_str().unwrap().to_string();
    assert!(output_path.starts_with(&app.output_dir.display().to_string()));
    let name = std::path::Path::new(&output_path)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    assert!(name.starts_with("render_4post_red_"), "{name}");
    assert!(name.ends_with(".png"), "{name}");
    assert!(std::path::Path::new(&output_path).is_file());

    let args = std::fs::read_to_string(app.args_file()).unwrap();
    let args: Vec<&str> = args.lines().collect();
    let install = app.install_dir.display().to_string();
    assert_eq!(
        args,
        vec![
            "--background".to_string(),
            "--python".to_string(),
            format!("{install}/scripts/blender_render.py"),
            "--".to_string(),
            format!("--base-file={install}/scenes/base.blend"),
            format!("--component-file={install}/scenes/post.blend"),
            "--post-count=4".to_string(),
            "--color=red".to_string(),
            format!("--output={output_path}"),
            "--spacing=2".to_string(),
        ]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_render_six_blue() {
    let app = TestApp::with_fake_blender(TOUCH_OUTPUT);

    let response = app.render(json!("6"), json!("blue")).await;

    assert_eq!(response.status, StatusCode::OK);
    let args = std::fs::read_to_string(app.args_file()).unwrap();
    assert!(args.lines().any(|l| l == "--post-count=6"));
    assert!(args.lines().any(|l| l == "--color=blue"));
}

#[tokio::test]
async fn test_render_invalid_post_count() {
    let runner = Arc::new(CountingRunner::default());
    let app = TestApp::with_runner(runner.clone());

    for post_count in [json!("5"), json!(4), json!(""), Value::Null] {
        let response = app.render(post_count.clone(), json!("red")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{post_count}");
        assert_eq!(
            response.body,
            json!({ "error": "Invalid postCount. Must be \"4\" or \"6\"" })
        );
    }

    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_render_invalid_color() {
    let runner = Arc::new(CountingRunner::default());
    let app = TestApp::with_runner(runner.clone());

    for color in [json!("green"), json!("Red"), json!(1)] {
        let response = app.render(json!("6"), color.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{color}");
        assert_eq!(
            response.body,
            json!({ "error": "Invalid color. Must be \"red\", \"blue\", or \"white\"" })
        );
    }

    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_render_post_count_checked_before_color() {
    let app = TestApp::with_runner(Arc::new(CountingRunner::default()));

    let response = app.render(json!("8"), json!("green")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Invalid postCount. Must be \"4\" or \"6\""
    );
}

#[tokio::test]
async fn test_render_missing_fields() {
    let runner = Arc::new(CountingRunner::default());
    let app = TestApp::with_runner(runner.clone());

    let response = app.request("POST", "/render", Some(json!({}))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Invalid postCount. Must be \"4\" or \"6\""
    );
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_render_malformed_body() {
    let runner = Arc::new(CountingRunner::default());
    let app = TestApp::with_runner(runner.clone());

    let response = app
        .request_raw(
            "POST",
            "/render",
            "{\"postCount\": ".to_string(),
            Some("application/json"),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body")
    );
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_render_counting_runner_success() {
    let runner = Arc::new(CountingRunner::default());
    let app = TestApp::with_runner(runner.clone());

    let response = app.render(json!("4"), json!("white")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(runner.calls(), 1);
    assert!(app.output_dir.is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn test_render_tool_failure() {
    let app = TestApp::with_fake_blender("printf boom >&2\nexit 1");

    let response = app.render(json!("4"), json!("red")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({
            "error": "Blender render failed",
            "details": "boom",
            "exitCode": 1,
        })
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_render_tool_failure_falls_back_to_stdout() {
    let app = TestApp::with_fake_blender("echo 'scene not found'\nexit 3");

    let response = app.render(json!("6"), json!("white")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["exitCode"], 3);
    assert!(
        response.body["details"]
            .as_str()
            .unwrap()
            .contains("scene not found")
    );
}

#[tokio::test]
async fn test_render_launch_failure() {
    let app = TestApp::with_tool_path("/nonexistent/path/to/blender");

    let response = app.render(json!("4"), json!("blue")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Failed to start Blender process");
    assert!(!response.body["details"].as_str().unwrap().is_empty());
    assert!(response.body.get("exitCode").is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_render_timeout_kills_tool() {
    let app = TestApp::with_fake_blender_configured("exec sleep 30", |config| {
        config.render.timeout_seconds = 1;
    });

    let started = std::time::Instant::now();
    let response = app.render(json!("4"), json!("red")).await;

    assert!(started.elapsed() < std::time::Duration::from_secs(15));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Blender render timed out");
    assert_eq!(response.body["timeoutSeconds"], 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_concurrent_renders_are_independent() {
    let app = TestApp::with_fake_blender(&format!("sleep 0.2\n{TOUCH_OUTPUT}"));

    let (first, second) = tokio::join!(
        app.render(json!("4"), json!("red")),
        app.render(json!("6"), json!("blue")),
    );

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);

    let first_path = first.body["outputPath"].as_str().unwrap();
    let second_path = second.body["outputPath"].as_str().unwrap();
    assert_ne!(first_path, second_path);
    assert!(first_path.contains("render_4post_red_"));
    assert!(second_path.contains("render_6post_blue_"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_same_parameters_get_distinct_outputs() {
    let app = TestApp::with_fake_blender(TOUCH_OUTPUT);

    let mut paths = Vec::new();
    for _ in 0..5 {
        let response = app.render(json!("4"), json!("red")).await;
        assert_eq!(response.status, StatusCode::OK);
        paths.push(response.body["outputPath"].as_str().unwrap().to_string());
    }

    let mut unique = paths.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), paths.len());
}

#[tokio::test]
async fn test_render_options() {
    let app = TestApp::with_runner(Arc::new(CountingRunner::default()));

    let response = app.request("GET", "/render/options", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "postCounts": ["4", "6"],
            "colors": ["red", "blue", "white"],
        })
    );
}

#[tokio::test]
async fn test_render_metrics_track_outcomes() {
    let app = TestApp::with_runner(Arc::new(CountingRunner::default()));

    app.render(json!("4"), json!("red")).await;
    app.render(json!("6"), json!("blue")).await;
    app.render(json!("5"), json!("red")).await;

    let response = app.request("GET", "/render/metrics", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["rendersStarted"], 2);
    assert_eq!(response.body["rendersSucceeded"], 2);
    assert_eq!(response.body["rejectedRequests"], 1);
    assert_eq!(response.body["inFlight"], 0);
    assert_eq!(response.body["sampleCount"], 2);
    assert!(response.body.get("availableSlots").is_none());
}

#[tokio::test]
async fn test_render_rejects_get() {
    let app = TestApp::with_runner(Arc::new(CountingRunner::default()));

    let response = app.request("GET", "/render", None).await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
