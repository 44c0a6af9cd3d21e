//! `POST /api/action`: typed action dispatcher.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde_json::{json, Value};
use site_core::{
    Action, ActionEnvelope, DeleteItemInput, Error, ProductInput, Result, SettingsUpdate,
    SubscribeOutcome, TestimonialInput, ValidationErrorCode,
};
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

/// POST /api/action
///
/// Body `{ "type": "...", "payload": {...} }`. Admin-only types need the
/// admin token when one is configured.
pub async fn action_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<DataResponse<Value>>, ApiError> {
    let start = Instant::now();
    metrics().actions_dispatched.inc();

    let result = dispatch(&state, &headers, &body).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().action_latency_ms.observe(latency_ms);

    match result {
        Ok(data) => Ok(DataResponse::new(data)),
        Err(e) => {
            metrics().actions_failed.inc();
            warn!(error = %e, code = e.error_code(), latency_ms, "Action failed");
            Err(e.into())
        }
    }
}

async fn dispatch(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<Value> {
    let envelope: ActionEnvelope = serde_json::from_slice(body).map_err(|e| {
        Error::validation_code(
            ValidationErrorCode::InvalidPayload,
            format!("Invalid action body: {}", e),
        )
    })?;

    let action = Action::parse(envelope)?;
    if action.requires_admin() {
        state.admin.verify(headers)?;
    }

    let name = action.name();
    debug!(action = name, "Dispatching action");

    let data = match action {
        Action::SaveProduct(input) => save_product(state, input).await?,
        Action::SaveSettings(update) => save_settings(state, update).await?,
        Action::SaveTestimonial(input) => save_testimonial(state, input).await?,
        Action::DeleteItem(input) => delete_item(state, input).await?,
        Action::SubmitVoucher(input) => {
            let voucher = input.into_submission(Uuid::new_v4().to_string(), Utc::now())?;
            state.store.insert_voucher(&voucher).await?;
            info!(id = %voucher.id, provider = %voucher.provider, "Voucher submitted");
            serde_json::to_value(voucher)?
        }
        Action::SubmitDealRequest(input) => {
            let request = input.into_request(Uuid::new_v4().to_string(), Utc::now())?;
            state.store.insert_deal_request(&request).await?;
            info!(id = %request.id, "Deal request submitted");
            serde_json::to_value(request)?
        }
        Action::SubscribeToNewsletter(input) => {
            let subscription = input.into_subscription(Uuid::new_v4().to_string(), Utc::now())?;
            match state.store.subscribe_newsletter(&subscription).await? {
                SubscribeOutcome::Subscribed(subscription) => {
                    json!({ "alreadySubscribed": false, "subscription": subscription })
                }
                SubscribeOutcome::AlreadySubscribed => json!({ "alreadySubscribed": true }),
            }
        }
    };

    Ok(data)
}

async fn save_product(state: &AppState, input: ProductInput) -> Result<Value> {
    let product = match input.existing_id() {
        Some(id) => state
            .store
            .update_product(id, &input)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {}", id)))?,
        None => state.store.insert_product(input.to_new_fields()?).await?,
    };

    info!(
        id = %product.id,
        catalog_number = product.catalog_number,
        "Product saved"
    );
    Ok(serde_json::to_value(product)?)
}

async fn save_settings(state: &AppState, update: SettingsUpdate) -> Result<Value> {
    let settings = state.settings.save(update.into_sections()?).await?;
    Ok(serde_json::to_value(settings.as_ref())?)
}

async fn save_testimonial(state: &AppState, input: TestimonialInput) -> Result<Value> {
    let testimonial = match input.existing_id().map(str::to_string) {
        Some(id) => {
            let existing = state
                .store
                .get_testimonial(&id)
                .await?
                .ok_or_else(|| Error::not_found(format!("testimonial {}", id)))?;
            let testimonial = input.into_testimonial(id, existing.created_at)?;
            if !state.store.update_testimonial(&testimonial).await? {
                return Err(Error::not_found(format!("testimonial {}", testimonial.id)));
            }
            testimonial
        }
        None => {
            let testimonial = input.into_testimonial(Uuid::new_v4().to_string(), Utc::now())?;
            state.store.insert_testimonial(&testimonial).await?;
            testimonial
        }
    };
    Ok(serde_json::to_value(testimonial)?)
}

async fn delete_item(state: &AppState, input: DeleteItemInput) -> Result<Value> {
    let target = input.into_target()?;
    let deleted = state.store.delete_item(&target).await?;
    Ok(json!({ "deleted": deleted }))
}
