//! System endpoint integration tests
//!
//! Covers:
//! - GET /api/health: plain liveness check
//! - GET /api/version: build information
//! - GET /api/openapi.json: generated API description

use axum::http::StatusCode;
use http_body_util::BodyExt;

mod common;
use common::{get, json_body, spawn_app};

#[tokio::test]
async fn test_health_check_body_is_ok() {
    let app = spawn_app().await;
    let response = get(&app.router, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(String::from_utf8_lossy(&body_bytes).trim(), "OK");
}

#[tokio::test]
async fn test_version_reports_package_version() {
    let app = spawn_app().await;
    let (status, body) = json_body(get(&app.router, "/api/version").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["backend"], "rust");
}

#[tokio::test]
async fn test_openapi_lists_public_routes() {
    let app = spawn_app().await;
    let (status, body) = json_body(get(&app.router, "/api/openapi.json").await).await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().expect("paths object");
    for path in [
        "/login",
        "/tasks",
        "/tasks/{id}",
        "/notifications/read-all",
        "/import-payments",
        "/api/sync/sales",
        "/bi/summary",
        "/announcements",
        "/dept-messages/{dept}",
        "/finance",
        "/finance/{id}/status",
    ] {
        assert!(paths.contains_key(path), "{} missing from OpenAPI", path);
    }
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = spawn_app().await;
    let response = get(&app.router, "/api/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
