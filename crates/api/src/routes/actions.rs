//! `/api/actions?type=`: click tracking, purchase requests, gamification.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use site_core::{
    normalize_user_id, ClickInput, Error, GamificationAction, PurchaseRequestInput,
    RequestStatusUpdate, Result, SubmissionStatus,
};
use telemetry::metrics;
use tracing::{debug, info};
use uuid::Uuid;

use super::parse_json;
use crate::extractors::ClientMeta;
use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionsQuery {
    #[serde(rename = "type")]
    pub action_type: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

fn action_type(query: &ActionsQuery) -> Result<&str> {
    query
        .action_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::unknown_type("Missing type parameter"))
}

/// POST /api/actions?type=track_click|request|request_status|gamification
pub async fn actions_post_handler(
    State(state): State<AppState>,
    Query(query): Query<ActionsQuery>,
    ClientMeta(meta): ClientMeta,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<DataResponse<Value>>, ApiError> {
    let data = match action_type(&query)? {
        "track_click" => {
            let input: ClickInput = parse_json(&body)?;
            let event = input.into_event(Uuid::new_v4().to_string(), meta, Utc::now())?;
            if !state.store.record_click(&event).await? {
                return Err(Error::not_found(format!("product {}", event.product_id)).into());
            }
            metrics().clicks_tracked.inc();
            debug!(product_id = %event.product_id, source = ?event.source, "Click tracked");
            json!({ "tracked": true, "productId": event.product_id })
        }
        "request" => {
            let input: PurchaseRequestInput = parse_json(&body)?;
            let request = input.into_request(Uuid::new_v4().to_string(), Utc::now())?;
            state.store.insert_purchase_request(&request).await?;
            info!(id = %request.id, product = %request.product_name, "Purchase request received");
            serde_json::to_value(request).map_err(Error::from)?
        }
        "request_status" => {
            state.admin.verify(&headers)?;
            let update: RequestStatusUpdate = parse_json(&body)?;
            let request = state
                .store
                .update_purchase_request_status(&update.id, update.status)
                .await?
                .ok_or_else(|| Error::not_found(format!("purchase request {}", update.id)))?;
            info!(id = %request.id, status = request.status.as_str(), "Purchase request updated");
            serde_json::to_value(request).map_err(Error::from)?
        }
        "gamification" => {
            let action: GamificationAction = parse_json(&body)?;
            gamification(&state, action).await?
        }
        other => {
            return Err(Error::unknown_type(format!("Unknown action type: {}", other)).into());
        }
    };

    Ok(DataResponse::new(data))
}

/// GET /api/actions?type=requests|gamification
pub async fn actions_get_handler(
    State(state): State<AppState>,
    Query(query): Query<ActionsQuery>,
    headers: HeaderMap,
) -> std::result::Result<Json<DataResponse<Value>>, ApiError> {
    let data = match action_type(&query)? {
        "requests" => {
            state.admin.verify(&headers)?;
            let status = query
                .status
                .as_deref()
                .filter(|s| !s.is_empty() && *s != "all")
                .map(SubmissionStatus::parse)
                .transpose()?;
            let requests = state.store.list_purchase_requests(status).await?;
            serde_json::to_value(requests).map_err(Error::from)?
        }
        "gamification" => {
            let user_id = normalize_user_id(query.user_id.as_deref().unwrap_or(""))?;
            let user = state
                .store
                .get_gamification_user(&user_id)
                .await?
                .ok_or_else(|| Error::not_found(format!("user {}", user_id)))?;
            serde_json::to_value(user).map_err(Error::from)?
        }
        other => {
            return Err(Error::unknown_type(format!("Unknown action type: {}", other)).into());
        }
    };

    Ok(DataResponse::new(data))
}

async fn gamification(state: &AppState, action: GamificationAction) -> Result<Value> {
    match action {
        GamificationAction::AwardPoints(input) => {
            let (user_id, points) =
                input.resolve(&state.settings.snapshot().gamification_points)?;
            let user = state.store.award_points(&user_id, points).await?;
            Ok(json!({ "user": user, "awarded": points }))
        }
        GamificationAction::AwardBadge(input) => {
            let (user_id, badge) = input.normalized()?;
            let award = state.store.award_badge(&user_id, &badge).await?;
            Ok(serde_json::to_value(award)?)
        }
    }
}
