//! API routes.

pub mod action;
pub mod actions;
pub mod analytics;
pub mod catalog;
pub mod data;
pub mod health;
pub mod image_proxy;
pub mod settings;
pub mod upload;
pub mod webhooks;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use site_core::{limits::MAX_JSON_BODY_BYTES, Error, ValidationErrorCode};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::middleware::rate_limit::limit_submissions;
use crate::state::AppState;

/// Multipart framing allowance on top of the file size cap.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Decode a JSON request body, mapping failures to `VALID_001`.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> site_core::Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        Error::validation_code(
            ValidationErrorCode::InvalidPayload,
            format!("Invalid JSON body: {}", e),
        )
    })
}

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let limited = from_fn_with_state(state.clone(), limit_submissions);
    let upload_limit = state.upload_policy.max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Public submissions (rate limited per client)
        .route(
            "/api/action",
            post(action::action_handler).route_layer(limited.clone()),
        )
        .route(
            "/api/actions",
            post(actions::actions_post_handler)
                .route_layer(limited)
                .get(actions::actions_get_handler),
        )
        // Reads
        .route("/api/data", get(data::data_handler))
        .route(
            "/api/settings",
            get(settings::get_settings_handler)
                .post(settings::post_settings_handler)
                .put(settings::put_settings_handler),
        )
        .route(
            "/api/catalog/order",
            get(catalog::get_catalog_handler).post(catalog::reorder_catalog_handler),
        )
        // Tracking
        .route("/api/analytics/visit", post(analytics::visit_handler))
        .route("/api/analytics/pageview", post(analytics::pageview_handler))
        .route(
            "/api/analytics/dashboard",
            get(analytics::dashboard_handler),
        )
        // Files
        .route(
            "/api/upload",
            post(upload::upload_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/image-proxy", get(image_proxy::image_proxy_handler))
        .nest_service("/uploads", ServeDir::new(state.uploads_root.as_path()))
        // Callbacks
        .route(
            "/api/webhooks/:provider",
            get(webhooks::webhook_handler).post(webhooks::webhook_handler),
        )
        // Health
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
