//! Tests for `POST /api/action`.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};
use site_core::SettingsSection;

#[tokio::test]
async fn test_save_product_assigns_increasing_catalog_numbers() {
    let ctx = TestContext::new().await;

    let mut numbers = Vec::new();
    for name in ["Alpha", "Beta", "Gamma"] {
        let response = ctx
            .server
            .post("/api/action")
            .json(&fixtures::action("saveProduct", fixtures::product(name)))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        numbers.push(body["data"]["catalog_number"].as_i64().unwrap());
    }

    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_save_product_normalizes_form_values() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product("Alpha")))
        .await;
    response.assert_status_ok();

    let product = &response.json::<Value>()["data"];
    assert_eq!(product["price"], json!(4.99));
    assert_eq!(product["is_featured"], json!(false));
    assert_eq!(product["show_on_landing"], json!(false));
    assert_eq!(product["features"], json!(["2 vCPU", "4 GB RAM"]));
    assert_eq!(product["product_type"], "vps");
}

#[tokio::test]
async fn test_update_keeps_catalog_number_and_unspecified_fields() {
    let ctx = TestContext::new().await;

    let created: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product("Alpha")))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // A second product moves MAX(catalog_number) forward
    ctx.server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product("Beta")))
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "saveProduct",
            json!({ "id": id, "price": 2.5, "isFeatured": true }),
        ))
        .await;
    response.assert_status_ok();

    let updated = &response.json::<Value>()["data"];
    assert_eq!(updated["catalog_number"], 1);
    assert_eq!(updated["price"], json!(2.5));
    assert_eq!(updated["is_featured"], json!(true));
    assert_eq!(updated["name"], "Alpha");
    assert_eq!(updated["provider"], "Acme Hosting");
}

#[tokio::test]
async fn test_update_unknown_product_is_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "saveProduct",
            json!({ "id": "missing", "name": "Ghost" }),
        ))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_action_type() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("dropTables", json!({})))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALID_002");
}

#[tokio::test]
async fn test_malformed_body() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/action")
        .content_type("application/json")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALID_001");
}

#[tokio::test]
async fn test_newsletter_subscription_is_idempotent() {
    let ctx = TestContext::new().await;

    let first: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "subscribeToNewsletter",
            json!({ "email": "Reader@Example.com" }),
        ))
        .await
        .json();
    assert_eq!(first["data"]["alreadySubscribed"], json!(false));
    assert_eq!(first["data"]["subscription"]["email"], "reader@example.com");

    let second: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "subscribeToNewsletter",
            json!({ "email": " reader@example.com " }),
        ))
        .await
        .json();
    assert_eq!(second["data"]["alreadySubscribed"], json!(true));

    assert_eq!(ctx.store.newsletter_subscriptions().len(), 1);
}

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "subscribeToNewsletter",
            json!({ "email": "not-an-email" }),
        ))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.store.newsletter_subscriptions().is_empty());
}

#[tokio::test]
async fn test_public_submissions_are_stored_pending() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/action")
        .json(&fixtures::action("submitVoucher", fixtures::voucher()))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/action")
        .json(&fixtures::action(
            "submitDealRequest",
            json!({ "name": "Sam", "email": "sam@example.com", "type": "vpn" }),
        ))
        .await
        .assert_status_ok();

    let vouchers = ctx.store.vouchers();
    assert_eq!(vouchers.len(), 1);
    assert_eq!(vouchers[0].code, "SAVE20");
    assert_eq!(
        vouchers[0].submitter_email.as_deref(),
        Some("submitter@example.com")
    );
    assert_eq!(vouchers[0].status.as_str(), "pending");

    let requests = ctx.store.deal_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].product_type.as_deref(), Some("vpn"));
}

#[tokio::test]
async fn test_save_testimonial_insert_then_update() {
    let ctx = TestContext::new().await;

    let created: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "saveTestimonial",
            json!({ "name": "Lee", "content": "Great deals", "rating": "5" }),
        ))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let created_at = created["data"]["created_at"].clone();

    let updated: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "saveTestimonial",
            json!({ "id": id, "name": "Lee", "content": "Even better now", "rating": 4 }),
        ))
        .await
        .json();
    assert_eq!(updated["data"]["content"], "Even better now");
    assert_eq!(updated["data"]["created_at"], created_at);

    let list: Value = ctx
        .server
        .get("/api/data")
        .add_query_param("type", "testimonials")
        .await
        .json();
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_item_rejects_unsafe_item_type() {
    let ctx = TestContext::new().await;

    for item_type in ["products; DROP TABLE products", "products--", "users"] {
        let response = ctx
            .server
            .post("/api/action")
            .json(&fixtures::action(
                "deleteItem",
                json!({ "itemType": item_type, "id": "x" }),
            ))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "VALID_003", "{}", item_type);
    }
}

#[tokio::test]
async fn test_delete_item_removes_product() {
    let ctx = TestContext::new().await;

    let created: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product("Alpha")))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let deleted: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "deleteItem",
            json!({ "itemType": "products", "id": id }),
        ))
        .await
        .json();
    assert_eq!(deleted["data"]["deleted"], json!(true));

    let again: Value = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action(
            "deleteItem",
            json!({ "itemType": "products", "id": id }),
        ))
        .await
        .json();
    assert_eq!(again["data"]["deleted"], json!(false));
}

#[tokio::test]
async fn test_save_settings_action_updates_snapshot() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/action")
        .json(&fixtures::action(
            "saveSettings",
            json!({ "siteAppearance": { "siteName": "HostVoucher" } }),
        ))
        .await
        .assert_status_ok();

    let snapshot = ctx.state.settings.snapshot();
    assert_eq!(
        snapshot.section_value(SettingsSection::SiteAppearance),
        json!({ "siteName": "HostVoucher" })
    );
}

#[tokio::test]
async fn test_admin_actions_require_token() {
    let ctx = TestContext::with_admin_token().await;

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("saveProduct", fixtures::product("Alpha")))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], "AUTH_001");

    let (name, value) = TestContext::admin_header();
    ctx.server
        .post("/api/action")
        .add_header(name, value)
        .json(&fixtures::action("saveProduct", fixtures::product("Alpha")))
        .await
        .assert_status_ok();

    let (name, value) = TestContext::bearer_header();
    ctx.server
        .post("/api/action")
        .add_header(name, value)
        .json(&fixtures::action("saveProduct", fixtures::product("Beta")))
        .await
        .assert_status_ok();

    // Public submissions stay open
    ctx.server
        .post("/api/action")
        .json(&fixtures::action("submitVoucher", fixtures::voucher()))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_storage_failure_maps_to_db_error() {
    let ctx = TestContext::new().await;
    ctx.store.set_should_fail(true);

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("submitVoucher", fixtures::voucher()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["code"], "DB_001");
}

#[tokio::test]
async fn test_submissions_are_rate_limited() {
    let mut config = integration_tests::setup::test_config();
    config.submission_rate_limit.rate = 1;
    config.submission_rate_limit.burst = 2;
    let ctx = TestContext::with_config(config).await;

    for _ in 0..2 {
        ctx.server
            .post("/api/action")
            .json(&fixtures::action("submitVoucher", fixtures::voucher()))
            .await
            .assert_status_ok();
    }

    let response = ctx
        .server
        .post("/api/action")
        .json(&fixtures::action("submitVoucher", fixtures::voucher()))
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json::<Value>()["code"], "RATE_001");
    assert!(response.headers().get("retry-after").is_some());
}
