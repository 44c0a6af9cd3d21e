//! End-to-end tests against MySQL.
//!
//! Run with `cargo test -p integration-tests --test mysql_e2e -- --ignored`.
//! Needs Docker, or `HOSTVOUCHER_TEST_MYSQL_URL` pointing at a server.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::MySqlTestContext};
use serde_json::{json, Value};
use site_core::SettingsSection;
use site_store::{ProductStore, SettingsStore};
use uuid::Uuid;

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

async fn create_product(ctx: &MySqlTestContext, name: &str) -> Value {
    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product(name)))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
#[ignore]
async fn test_catalog_numbers_and_reorder() {
    let ctx = MySqlTestContext::new().await;

    let a = create_product(&ctx, &unique("A")).await;
    let b = create_product(&ctx, &unique("B")).await;
    assert_eq!(
        b["catalog_number"].as_i64().unwrap(),
        a["catalog_number"].as_i64().unwrap() + 1
    );

    ctx.server
        .post("/api/catalog/order")
        .json(&json!({ "items": [{ "id": a["id"], "order": -2 }, { "id": b["id"], "order": -1 }] }))
        .await
        .assert_status_ok();

    let a_id = a["id"].as_str().unwrap();
    let stored = ctx.store.get_product(a_id).await.unwrap().unwrap();
    assert_eq!(stored.fields.display_order, -2);

    // One bad id rolls the whole batch back
    ctx.server
        .post("/api/catalog/order")
        .json(&json!({ "items": [{ "id": a_id, "order": 50 }, { "id": "missing", "order": 1 }] }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let stored = ctx.store.get_product(a_id).await.unwrap().unwrap();
    assert_eq!(stored.fields.display_order, -2);
}

#[tokio::test]
#[ignore]
async fn test_product_update_round_trip() {
    let ctx = MySqlTestContext::new().await;
    let created = create_product(&ctx, &unique("Alpha")).await;

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "saveProduct",
            json!({ "id": created["id"], "price": "3.25", "features": ["SSD"] }),
        ))
        .await;
    response.assert_status_ok();

    let updated = &response.json::<Value>()["data"];
    assert_eq!(updated["catalog_number"], created["catalog_number"]);
    assert_eq!(updated["price"], json!(3.25));
    assert_eq!(updated["features"], json!(["SSD"]));
    assert_eq!(updated["name"], created["name"]);
}

#[tokio::test]
#[ignore]
async fn test_newsletter_dedupe() {
    let ctx = MySqlTestContext::new().await;
    let email = format!("{}@example.com", unique("reader"));

    let mut flags = Vec::new();
    for _ in 0..2 {
        let body: Value = ctx
            .server
            .post("/api/action")
            .json(&fixtures::action(
                "subscribeToNewsletter",
                json!({ "email": email.to_uppercase() }),
            ))
            .await
            .json();
        flags.push(body["data"]["alreadySubscribed"].clone());
    }

    assert_eq!(flags, vec![json!(false), json!(true)]);
}

#[tokio::test]
#[ignore]
async fn test_badges_and_points() {
    let ctx = MySqlTestContext::new().await;
    let user = unique("user");

    for badge in ["Early_Bird", "early_bird"] {
        ctx.server
            .post("/api/actions")
            .add_query_param("type", "gamification")
            .json(&json!({ "action": "award_badge", "userId": user, "badge": badge }))
            .await
            .assert_status_ok();
    }
    ctx.server
        .post("/api/actions")
        .add_query_param("type", "gamification")
        .json(&json!({ "action": "award_points", "userId": user, "points": 12 }))
        .await
        .assert_status_ok();

    let body: Value = ctx
        .server
        .get("/api/actions")
        .add_query_param("type", "gamification")
        .add_query_param("userId", &user)
        .await
        .json();
    assert_eq!(body["data"]["badges"], json!(["early_bird"]));
    assert_eq!(body["data"]["points"], 12);
}

#[tokio::test]
#[ignore]
async fn test_settings_round_trip() {
    let ctx = MySqlTestContext::new().await;

    ctx.server
        .post("/api/settings")
        .json(&json!({ "section": "gamificationPoints", "data": { "dailyLogin": 9 } }))
        .await
        .assert_status_ok();

    let raw = ctx.store.load_settings().await.unwrap().unwrap();
    assert!(raw
        .columns
        .contains_key(&SettingsSection::GamificationPoints));

    let body: Value = ctx.server.get("/api/settings").await.json();
    assert_eq!(body["data"]["gamificationPoints"]["dailyLogin"], 9);
}

#[tokio::test]
#[ignore]
async fn test_click_and_dashboard() {
    let ctx = MySqlTestContext::new().await;
    let product = create_product(&ctx, &unique("Clicked")).await;

    ctx.server
        .post("/api/actions")
        .add_query_param("type", "track_click")
        .json(&json!({ "productId": product["id"] }))
        .await
        .assert_status_ok();
    ctx.server
        .post("/api/analytics/visit")
        .json(&json!({ "sessionId": unique("s"), "page": "/" }))
        .await
        .assert_status_ok();

    let stored = ctx
        .store
        .get_product(product["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.clicks, 1);

    let response = ctx
        .server
        .get("/api/analytics/dashboard")
        .add_query_param("days", "3")
        .await;
    response.assert_status_ok();
    let stats = &response.json::<Value>()["data"];
    assert!(stats["visitors"]["today"].as_i64().unwrap() >= 1);
    assert!(stats["total_clicks"].as_i64().unwrap() >= 1);
    assert_eq!(stats["daily"].as_array().unwrap().len(), 3);
}
