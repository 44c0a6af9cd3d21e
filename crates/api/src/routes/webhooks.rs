//! `GET|POST /api/webhooks/:provider`: affiliate network callbacks.
//!
//! Every call is acknowledged; logging is best effort.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method},
    Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use site_core::{normalize_provider, parse_payload, KnownProvider, WebhookLog, LOGGED_HEADERS};
use telemetry::metrics;
use tracing::{info, warn};
use uuid::Uuid;

use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

fn logged_headers(headers: &HeaderMap) -> Value {
    let map: Map<String, Value> = LOGGED_HEADERS
        .iter()
        .filter_map(|name| {
            let value = headers.get(*name)?.to_str().ok()?;
            Some((name.to_string(), Value::String(value.to_string())))
        })
        .collect();
    Value::Object(map)
}

/// GET|POST /api/webhooks/:provider
pub async fn webhook_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DataResponse<Value>>, ApiError> {
    let provider = normalize_provider(&provider)?;
    metrics().webhooks_received.inc();

    match KnownProvider::from_slug(&provider) {
        Some(known) => info!(
            provider = %provider,
            method = %method,
            "{} webhook received",
            known.display_name()
        ),
        None => info!(provider = %provider, method = %method, "Webhook received"),
    }

    let log = WebhookLog {
        id: Uuid::new_v4().to_string(),
        provider,
        method: method.to_string(),
        headers: logged_headers(&headers),
        query,
        payload: parse_payload(&body),
        received_at: Utc::now(),
    };

    if let Err(e) = state.store.log_webhook(&log).await {
        metrics().webhook_log_failures.inc();
        warn!(provider = %log.provider, error = %e, "Failed to log webhook");
    }

    Ok(DataResponse::new(json!({ "received": true })))
}
