//! Tests for `GET /api/data`.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};

async fn get_data(ctx: &TestContext, kind: &str) -> Value {
    let response = ctx
        .server
        .get("/api/data")
        .add_query_param("type", kind)
        .await;
    response.assert_status_ok();
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
async fn test_deals_filters() {
    let ctx = TestContext::new().await;

    let mut featured = fixtures::product("Featured");
    featured["isFeatured"] = json!("true");
    featured["showOnHome"] = json!(1);
    for payload in [featured, fixtures::product("Plain")] {
        ctx.server
            .post("/api/action")
            .json(&fixtures::action("saveProduct", payload))
            .await
            .assert_status_ok();
    }

    let all = get_data(&ctx, "deals").await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let response = ctx
        .server
        .get("/api/data")
        .add_query_param("type", "deals")
        .add_query_param("featured", "true")
        .await;
    let featured: Value = response.json();
    let featured = featured["data"].as_array().unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0]["name"], "Featured");
    assert_eq!(featured[0]["show_on_home"], json!(true));
    assert!(featured[0]["price"].is_number());
    assert!(featured[0]["features"].is_array());
}

#[tokio::test]
async fn test_blog_posts_published_only() {
    let ctx = TestContext::new().await;
    ctx.store.seed_blog_post(fixtures::blog_post("Live Post", true));
    ctx.store.seed_blog_post(fixtures::blog_post("Draft Post", false));

    let posts = get_data(&ctx, "blog_posts").await;
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Live Post");
}

#[tokio::test]
async fn test_mining_tasks_and_banners_active_and_ordered() {
    let ctx = TestContext::new().await;
    ctx.store.seed_mining_task(fixtures::mining_task("Second", true, 2));
    ctx.store.seed_mining_task(fixtures::mining_task("Hidden", false, 0));
    ctx.store.seed_mining_task(fixtures::mining_task("First", true, 1));
    ctx.store.seed_banner(fixtures::banner("/b2.png", true, 2));
    ctx.store.seed_banner(fixtures::banner("/b1.png", true, 1));
    ctx.store.seed_banner(fixtures::banner("/off.png", false, 0));

    let tasks = get_data(&ctx, "mining_tasks").await;
    let titles: Vec<_> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let banners = get_data(&ctx, "banners").await;
    let images: Vec<_> = banners
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["image"].as_str().unwrap())
        .collect();
    assert_eq!(images, vec!["/b1.png", "/b2.png"]);
}

#[tokio::test]
async fn test_site_settings_snapshot() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/settings")
        .json(&json!({ "section": "siteAppearance", "data": { "siteName": "HV" } }))
        .await
        .assert_status_ok();

    let settings = get_data(&ctx, "siteSettings").await;
    assert_eq!(settings["siteAppearance"]["siteName"], "HV");
}

#[tokio::test]
async fn test_unknown_type() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/data")
        .add_query_param("type", "users")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALID_002");
}
