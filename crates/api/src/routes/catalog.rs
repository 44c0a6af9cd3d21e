//! `/api/catalog/order`: ordered catalog read and batch reorder.

use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use site_core::{sort_catalog, CatalogOrderRequest, Product};
use tracing::info;

use super::parse_json;
use crate::extractors::AdminGuard;
use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

/// GET /api/catalog/order
pub async fn get_catalog_handler(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<Product>>>, ApiError> {
    let mut products = state.store.list_catalog().await?;
    sort_catalog(&mut products);
    Ok(DataResponse::new(products))
}

/// POST /api/catalog/order
///
/// All updates commit together or not at all.
pub async fn reorder_catalog_handler(
    State(state): State<AppState>,
    _admin: AdminGuard,
    body: Bytes,
) -> Result<Json<DataResponse<Value>>, ApiError> {
    let request: CatalogOrderRequest = parse_json(&body)?;
    let updates = request.into_updates()?;

    state.store.reorder_catalog(&updates).await?;
    info!(count = updates.len(), "Catalog reordered");

    Ok(DataResponse::new(json!({ "updated": updates.len() })))
}
