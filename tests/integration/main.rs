//! HTTP integration tests for the render service.

mod helpers;

mod health_test;
mod render_test;
