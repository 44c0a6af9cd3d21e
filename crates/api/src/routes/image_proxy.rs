//! `GET /api/image-proxy?url=`: fetch remote images server-side.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use site_core::limits::{PLACEHOLDER_CACHE_CONTROL, PROXY_CACHE_CONTROL};
use site_core::{parse_proxy_url, PLACEHOLDER_CONTENT_TYPE, PLACEHOLDER_SVG};
use telemetry::metrics;
use tracing::debug;

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageProxyQuery {
    pub url: Option<String>,
}

/// GET /api/image-proxy?url=
///
/// A missing or non-http(s) URL is a 400. Upstream failures and non-image
/// responses are answered with the placeholder image.
pub async fn image_proxy_handler(
    State(state): State<AppState>,
    Query(query): Query<ImageProxyQuery>,
) -> Result<Response, ApiError> {
    let url = parse_proxy_url(query.url.as_deref().unwrap_or(""))?;

    let response = match state.image_proxy.fetch(&url).await {
        Ok(image) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, image.content_type),
                (header::CACHE_CONTROL, PROXY_CACHE_CONTROL.to_string()),
            ],
            image.bytes,
        )
            .into_response(),
        Err(e) => {
            metrics().image_proxy_fallbacks.inc();
            debug!(url = %url, error = %e, "Serving placeholder image");
            placeholder()
        }
    };

    Ok(response)
}

fn placeholder() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, PLACEHOLDER_CONTENT_TYPE),
            (header::CACHE_CONTROL, PLACEHOLDER_CACHE_CONTROL),
        ],
        PLACEHOLDER_SVG,
    )
        .into_response()
}
