//! Tests for `/api/webhooks/:provider`.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use integration_tests::setup::TestContext;
use serde_json::{json, Value};

#[tokio::test]
async fn test_post_payload_is_logged() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/webhooks/Impact")
        .add_query_param("campaign", "42")
        .add_header(
            HeaderName::from_static("x-impact-signature"),
            HeaderValue::from_static("sig"),
        )
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer secret"),
        )
        .json(&json!({ "event": "conversion", "amount": 12.5 }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["received"], json!(true));

    let logs = ctx.store.webhook_logs();
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.provider, "impact");
    assert_eq!(log.method, "POST");
    assert_eq!(log.query.as_deref(), Some("campaign=42"));
    assert_eq!(log.payload["event"], "conversion");
    assert_eq!(log.headers["x-impact-signature"], "sig");
    assert!(log.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_get_and_non_json_bodies() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/api/webhooks/some-network")
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/webhooks/awin")
        .content_type("application/x-www-form-urlencoded")
        .text("txn=1&status=ok")
        .await
        .assert_status_ok();

    let logs = ctx.store.webhook_logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].method, "GET");
    assert_eq!(logs[0].payload, Value::Null);
    assert_eq!(logs[1].payload, json!("txn=1&status=ok"));
}

#[tokio::test]
async fn test_logging_failure_is_still_acknowledged() {
    let ctx = TestContext::new().await;
    ctx.store.set_should_fail(true);

    let response = ctx
        .server
        .post("/api/webhooks/cj")
        .json(&json!({ "id": 1 }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["received"], json!(true));
}

#[tokio::test]
async fn test_invalid_provider_segment() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/webhooks/bad.provider")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
