//! Tests for `/api/upload`, `/uploads` and `/api/image-proxy`.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use integration_tests::{
    fixtures,
    setup::{test_config, TestContext},
};
use serde_json::Value;

fn image_form(bytes: Vec<u8>, file_name: &str, mime: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("category", "Deal Logos!")
        .add_part("file", Part::bytes(bytes).file_name(file_name).mime_type(mime))
}

#[tokio::test]
async fn test_upload_stores_and_serves_file() {
    let ctx = TestContext::new().await;
    let bytes = fixtures::png_bytes(256);

    let response = ctx
        .server
        .post("/api/upload")
        .multipart(image_form(bytes.clone(), "My Logo (1).PNG", "image/png"))
        .await;
    response.assert_status_ok();

    let data = &response.json::<Value>()["data"];
    let url = data["url"].as_str().unwrap().to_string();
    let filename = data["filename"].as_str().unwrap();
    assert_eq!(data["category"], "deallogos");
    assert_eq!(data["size"], 256);
    assert!(filename.ends_with("-my-logo-1.png"), "{}", filename);
    assert!(url.starts_with("/uploads/deallogos/"));

    let on_disk = ctx.uploads_root.join("deallogos").join(filename);
    assert_eq!(std::fs::read(on_disk).unwrap(), bytes);

    let served = ctx.server.get(&url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().to_vec(), bytes);
}

#[tokio::test]
async fn test_repeat_upload_keeps_both_files() {
    let ctx = TestContext::new().await;
    let first_bytes = fixtures::png_bytes(64);
    let second_bytes = fixtures::png_bytes(128);

    let mut names = Vec::new();
    for bytes in [&first_bytes, &second_bytes] {
        let response = ctx
            .server
            .post("/api/upload")
            .multipart(image_form(bytes.clone(), "logo.png", "image/png"))
            .await;
        response.assert_status_ok();
        names.push(response.json::<Value>()["data"]["filename"].as_str().unwrap().to_string());
    }

    assert_ne!(names[0], names[1]);
    let dir = ctx.uploads_root.join("deallogos");
    assert_eq!(std::fs::read(dir.join(&names[0])).unwrap(), first_bytes);
    assert_eq!(std::fs::read(dir.join(&names[1])).unwrap(), second_bytes);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/upload")
        .multipart(image_form(b"<svg/>".to_vec(), "x.svg", "image/svg+xml"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "UPLOAD_002");
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let mut config = test_config();
    config.max_upload_bytes = 1024;
    let ctx = TestContext::with_config(config).await;

    let response = ctx
        .server
        .post("/api/upload")
        .multipart(image_form(fixtures::png_bytes(2048), "big.png", "image/png"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["code"], "UPLOAD_001");
    assert!(!ctx.uploads_root.exists());
}

#[tokio::test]
async fn test_upload_requires_file_field() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/upload")
        .multipart(MultipartForm::new().add_text("category", "general"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_requires_admin() {
    let ctx = TestContext::with_admin_token().await;

    ctx.server
        .post("/api/upload")
        .multipart(image_form(fixtures::png_bytes(64), "a.png", "image/png"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = TestContext::admin_header();
    ctx.server
        .post("/api/upload")
        .add_header(name, value)
        .multipart(image_form(fixtures::png_bytes(64), "a.png", "image/png"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_image_proxy_rejects_non_http_urls() {
    let ctx = TestContext::new().await;

    for url in ["ftp://example.com/a.png", "file:///etc/passwd", "not a url"] {
        ctx.server
            .get("/api/image-proxy")
            .add_query_param("url", url)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    ctx.server
        .get("/api/image-proxy")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_proxy_falls_back_to_placeholder() {
    let ctx = TestContext::new().await;

    // Nothing listens on port 9; the fetch fails fast
    let response = ctx
        .server
        .get("/api/image-proxy")
        .add_query_param("url", "http://127.0.0.1:9/logo.png")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/svg+xml");
    assert_eq!(response.header("cache-control"), "public, max-age=300");
    assert!(response.text().starts_with("<svg"));
}
