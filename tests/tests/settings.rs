//! Tests for `/api/settings`.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;
use serde_json::{json, Value};
use site_core::{RawSettings, SettingsSection, CURRENT_SCHEMA_VERSION};
use std::collections::BTreeMap;

#[tokio::test]
async fn test_defaults_without_row() {
    let ctx = TestContext::new().await;

    let body: Value = ctx.server.get("/api/settings").await.json();
    assert_eq!(body["data"]["schemaVersion"], CURRENT_SCHEMA_VERSION);
    assert_eq!(body["data"]["siteAppearance"], json!({}));
}

#[tokio::test]
async fn test_each_section_round_trips() {
    let ctx = TestContext::new().await;

    let sections = [
        (
            "siteAppearance",
            json!({ "siteName": "HostVoucher", "primaryColor": "#0f766e", "heroTitle": "Deals" }),
        ),
        (
            "pageBanners",
            json!({ "home": { "enabled": true, "title": "Spring sale" }, "vps": { "imageUrl": "/uploads/banners/v.png" } }),
        ),
        (
            "popupModal",
            json!({ "enabled": true, "title": "Join", "delaySeconds": 5, "showOnce": true }),
        ),
        (
            "currencyRates",
            json!({ "base": "USD", "rates": { "IDR": 15500, "EUR": 0.92 } }),
        ),
        ("gamificationPoints", json!({ "dailyLogin": 5, "clickDeal": 1 })),
    ];

    for (section, data) in &sections {
        ctx.server
            .post("/api/settings")
            .json(&json!({ "section": section, "data": data }))
            .await
            .assert_status_ok();
    }

    let body: Value = ctx.server.get("/api/settings").await.json();
    for (section, data) in &sections {
        assert_eq!(&body["data"][section], data, "{}", section);
    }
}

#[tokio::test]
async fn test_unknown_keys_rejected_and_nothing_written() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/settings")
        .json(&json!({ "section": "popupModal", "data": { "title": "x", "blink": true } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.store.raw_settings().is_none());
}

#[tokio::test]
async fn test_unknown_section() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/settings")
        .json(&json!({ "section": "footer", "data": {} }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALID_002");
}

#[tokio::test]
async fn test_put_replaces_every_section() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/settings")
        .json(&json!({ "section": "popupModal", "data": { "title": "Old" } }))
        .await
        .assert_status_ok();

    ctx.server
        .put("/api/settings")
        .json(&json!({ "siteAppearance": { "siteName": "HV" } }))
        .await
        .assert_status_ok();

    let body: Value = ctx.server.get("/api/settings").await.json();
    assert_eq!(body["data"]["siteAppearance"], json!({ "siteName": "HV" }));
    assert_eq!(body["data"]["popupModal"], json!({}));

    let raw = ctx.store.raw_settings().unwrap();
    assert_eq!(raw.columns.len(), SettingsSection::ALL.len());
}

#[tokio::test]
async fn test_writes_require_admin_token() {
    let ctx = TestContext::with_admin_token().await;

    ctx.server
        .post("/api/settings")
        .json(&json!({ "section": "siteAppearance", "data": {} }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Reads stay public
    ctx.server.get("/api/settings").await.assert_status_ok();

    let (name, value) = TestContext::admin_header();
    ctx.server
        .post("/api/settings")
        .add_header(name, value)
        .json(&json!({ "section": "siteAppearance", "data": { "tagline": "Save" } }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_legacy_string_encoded_column_is_read() {
    let ctx = TestContext::new().await;

    let inner = json!({ "siteName": "Legacy" }).to_string();
    let mut columns = BTreeMap::new();
    columns.insert(
        SettingsSection::SiteAppearance,
        Value::String(inner).to_string(),
    );
    columns.insert(SettingsSection::PopupModal, "{not json".to_string());
    ctx.store.seed_raw_settings(RawSettings {
        schema_version: CURRENT_SCHEMA_VERSION,
        columns,
    });

    ctx.state.settings.reload().await.unwrap();

    let body: Value = ctx.server.get("/api/settings").await.json();
    assert_eq!(body["data"]["siteAppearance"]["siteName"], "Legacy");
    // The broken section falls back to defaults
    assert_eq!(body["data"]["popupModal"], json!({}));
}
