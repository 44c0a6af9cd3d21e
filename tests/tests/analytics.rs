//! Tests for `/api/analytics/*`.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};

async fn visit(ctx: &TestContext, session: &str, user_agent: &'static str, country: &'static str) {
    ctx.server
        .post("/api/analytics/visit")
        .add_header(
            HeaderName::from_static("user-agent"),
            HeaderValue::from_static(user_agent),
        )
        .add_header(
            HeaderName::from_static("x-country"),
            HeaderValue::from_static(country),
        )
        .add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        )
        .json(&json!({ "sessionId": session, "page": "/vps", "referrer": "https://google.com" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_visit_enriched_from_headers() {
    let ctx = TestContext::new().await;
    visit(&ctx, "s-1", fixtures::CHROME_UA, "sg").await;

    let visits = ctx.store.visits();
    assert_eq!(visits.len(), 1);
    let v = &visits[0];
    assert_eq!(v.path, "/vps");
    assert_eq!(v.browser, "Chrome");
    assert_eq!(v.device_type, "desktop");
    assert_eq!(v.country.as_deref(), Some("SG"));
    assert_eq!(v.ip_address.as_deref(), Some("203.0.113.5"));
}

#[tokio::test]
async fn test_pageview_recorded() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/analytics/pageview")
        .json(&json!({ "sessionId": "s-1", "path": "/", "title": "Home", "duration": "12" }))
        .await
        .assert_status_ok();

    let pageviews = ctx.store.pageviews();
    assert_eq!(pageviews.len(), 1);
    assert_eq!(pageviews[0].duration_seconds, Some(12));
}

#[tokio::test]
async fn test_pageview_requires_session() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/analytics/pageview")
        .json(&json!({ "path": "/" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_aggregates() {
    let ctx = TestContext::new().await;

    visit(&ctx, "s-1", fixtures::CHROME_UA, "SG").await;
    visit(&ctx, "s-1", fixtures::CHROME_UA, "SG").await;
    visit(&ctx, "s-2", fixtures::IPHONE_UA, "ID").await;
    ctx.server
        .post("/api/analytics/pageview")
        .json(&json!({ "sessionId": "s-1", "path": "/" }))
        .await
        .assert_status_ok();

    let product: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product("Alpha")))
        .await
        .json();
    ctx.server
        .post("/api/actions")
        .add_query_param("type", "track_click")
        .json(&json!({ "productId": product["data"]["id"] }))
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .get("/api/analytics/dashboard")
        .add_query_param("days", "7")
        .await;
    response.assert_status_ok();
    let stats = &response.json::<Value>()["data"];

    assert_eq!(stats["visitors"]["today"], 3);
    assert_eq!(stats["visitors"]["all_time"], 3);
    assert_eq!(stats["unique_sessions_month"], 2);
    assert_eq!(stats["total_pageviews"], 1);
    assert_eq!(stats["total_clicks"], 1);
    assert_eq!(stats["top_countries"][0], json!({ "label": "SG", "count": 2 }));
    assert_eq!(stats["top_browsers"][0]["label"], "Chrome");

    let daily = stats["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 7);
    assert_eq!(daily[6]["visitors"], 3);
    assert_eq!(daily[6]["pageviews"], 1);
    assert_eq!(daily[0]["visitors"], 0);

    assert_eq!(stats["top_products"][0]["name"], "Alpha");
    assert_eq!(stats["top_products"][0]["clicks"], 1);
}

#[tokio::test]
async fn test_dashboard_requires_admin() {
    let ctx = TestContext::with_admin_token().await;

    ctx.server
        .get("/api/analytics/dashboard")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = TestContext::bearer_header();
    ctx.server
        .get("/api/analytics/dashboard")
        .add_header(name, value)
        .await
        .assert_status_ok();
}
