//! Health endpoint tests.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::helpers::{CountingRunner, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::with_runner(Arc::new(CountingRunner::default()));

    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["version"].is_string());
    assert!(response.body["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::with_runner(Arc::new(CountingRunner::default()));

    let response = app.request("GET", "/does-not-exist", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight_allows_render() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = TestApp::with_runner(Arc::new(CountingRunner::default()));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/render")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
