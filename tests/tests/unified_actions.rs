//! Tests for `/api/actions?type=`.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};
use site_store::GamificationStore;

async fn create_product(ctx: &TestContext, name: &str) -> String {
    let body: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product(name)))
        .await
        .json();
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_track_click_counts_and_logs() {
    let ctx = TestContext::new().await;
    let id = create_product(&ctx, "Alpha").await;

    for _ in 0..2 {
        ctx.server
            .post("/api/actions")
            .add_query_param("type", "track_click")
            .add_header(
                HeaderName::from_static("user-agent"),
                HeaderValue::from_static(fixtures::CHROME_UA),
            )
            .add_header(
                HeaderName::from_static("cf-ipcountry"),
                HeaderValue::from_static("sg"),
            )
            .json(&json!({ "productId": id, "source": "deals_page" }))
            .await
            .assert_status_ok();
    }

    let events = ctx.store.click_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].source.as_deref(), Some("deals_page"));
    assert_eq!(events[0].country.as_deref(), Some("SG"));

    let deals: Value = ctx
        .server
        .get("/api/data")
        .add_query_param("type", "deals")
        .await
        .json();
    assert_eq!(deals["data"][0]["clicks"], 2);
}

#[tokio::test]
async fn test_track_click_unknown_product() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "track_click")
        .json(&json!({ "productId": "missing" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(ctx.store.click_events().is_empty());
}

#[tokio::test]
async fn test_purchase_request_lifecycle() {
    let ctx = TestContext::with_admin_token().await;

    let created: Value = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "request")
        .json(&fixtures::purchase_request(None))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["status"], "pending");

    // Listing needs the admin token
    ctx.server
        .get("/api/actions")
        .add_query_param("type", "requests")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = TestContext::admin_header();
    let updated: Value = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "request_status")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "id": id, "status": "approved" }))
        .await
        .json();
    assert_eq!(updated["data"]["status"], "approved");

    let approved: Value = ctx
        .server
        .get("/api/actions")
        .add_query_param("type", "requests")
        .add_query_param("status", "approved")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(approved["data"].as_array().unwrap().len(), 1);

    let pending: Value = ctx
        .server
        .get("/api/actions")
        .add_query_param("type", "requests")
        .add_query_param("status", "pending")
        .add_header(name, value)
        .await
        .json();
    assert!(pending["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_status_unknown_id() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "request_status")
        .json(&json!({ "id": "missing", "status": "completed" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_purchase_request_validation() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "request")
        .json(&json!({ "productName": "VPS", "name": "Dana", "email": "nope" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_badges_are_a_set() {
    let ctx = TestContext::new().await;

    let award = |badge: &'static str| {
        ctx.server
            .post("/api/actions")
            .add_query_param("type", "gamification")
            .json(&json!({ "action": "award_badge", "userId": "u-1", "badge": badge }))
    };

    let first: Value = award("early_bird").await.json();
    assert_eq!(first["data"]["newly_awarded"], json!(true));

    let second: Value = award("Early_Bird").await.json();
    assert_eq!(second["data"]["newly_awarded"], json!(false));
    assert_eq!(second["data"]["user"]["badges"], json!(["early_bird"]));

    let user: Value = ctx
        .server
        .get("/api/actions")
        .add_query_param("type", "gamification")
        .add_query_param("userId", "u-1")
        .await
        .json();
    assert_eq!(user["data"]["badges"], json!(["early_bird"]));
}

#[tokio::test]
async fn test_points_from_configured_reason() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/settings")
        .json(&json!({ "section": "gamificationPoints", "data": { "dailyLogin": 5 } }))
        .await
        .assert_status_ok();

    for _ in 0..2 {
        ctx.server
            .post("/api/actions")
            .add_query_param("type", "gamification")
            .json(&json!({ "action": "award_points", "userId": "u-2", "reason": "dailyLogin" }))
            .await
            .assert_status_ok();
    }

    let explicit: Value = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "gamification")
        .json(&json!({ "action": "award_points", "userId": "u-2", "points": 7 }))
        .await
        .json();
    assert_eq!(explicit["data"]["awarded"], 7);
    assert_eq!(explicit["data"]["user"]["points"], 17);

    let unknown = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "gamification")
        .json(&json!({ "action": "award_points", "userId": "u-2", "reason": "shareDeal" }))
        .await;
    unknown.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_user_id_is_rejected() {
    let ctx = TestContext::new().await;

    for body in [
        json!({ "action": "award_points", "userId": "   ", "points": 5 }),
        json!({ "action": "award_badge", "userId": "", "badge": "early_bird" }),
    ] {
        let response = ctx
            .server
            .post("/api/actions")
            .add_query_param("type", "gamification")
            .json(&body)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "VALID_001");
    }

    assert!(ctx.store.get_gamification_user("").await.unwrap().is_none());

    ctx.server
        .get("/api/actions")
        .add_query_param("type", "gamification")
        .add_query_param("userId", "  ")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_padded_user_id_is_trimmed() {
    let ctx = TestContext::new().await;

    let body: Value = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "gamification")
        .json(&json!({ "action": "award_points", "userId": "  u-3 ", "points": 4 }))
        .await
        .json();
    assert_eq!(body["data"]["user"]["user_id"], "u-3");
}

#[tokio::test]
async fn test_gamification_user_not_found() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/api/actions")
        .add_query_param("type", "gamification")
        .add_query_param("userId", "nobody")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_or_missing_type() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/actions")
        .add_query_param("type", "launch")
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALID_002");

    let response = ctx.server.get("/api/actions").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALID_002");
}
