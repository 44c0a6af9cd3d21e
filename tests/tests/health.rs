//! Tests for health check endpoints.

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use integration_tests::setup::TestContext;
use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["store_backend"], "memory");
    assert!(body["database_connected"].is_boolean());
    assert!(body["settings_loaded"].is_boolean());
    assert!(body["metrics"]["actions_dispatched"].is_u64());

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        matches!(status, "healthy" | "degraded" | "unhealthy"),
        "unexpected status {}",
        status
    );
}

#[tokio::test]
async fn test_ready_after_store_check() {
    let ctx = TestContext::new().await;
    assert!(site_store::health::check_connection(&ctx.store).await);

    ctx.server.get("/health/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/health/live")
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoints_no_auth_required() {
    let ctx = TestContext::with_admin_token().await;

    for path in ["/health", "/health/live"] {
        assert_ne!(
            ctx.server.get(path).await.status_code(),
            StatusCode::UNAUTHORIZED,
            "{} should not require auth",
            path
        );
    }
}

#[tokio::test]
async fn test_counters_move() {
    let ctx = TestContext::new().await;

    let before: Value = ctx.server.get("/health").await.json();
    ctx.server
        .post("/api/webhooks/impact")
        .await
        .assert_status_ok();
    let after: Value = ctx.server.get("/health").await.json();

    let received = |body: &Value| body["metrics"]["webhooks_received"].as_u64().unwrap();
    assert!(received(&after) > received(&before));
}

#[tokio::test]
async fn test_cors_headers_on_compressed_responses() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/settings")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://hostvoucher.example"),
        )
        .add_header(
            HeaderName::from_static("accept-encoding"),
            HeaderValue::from_static("gzip"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_cors_preflight() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .method(Method::OPTIONS, "/api/actions")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://hostvoucher.example"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-method"),
            HeaderValue::from_static("POST"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
