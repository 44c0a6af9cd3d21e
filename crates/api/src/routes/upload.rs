//! `POST /api/upload`: admin image uploads.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use site_core::{Error, UploadErrorCode};
use telemetry::metrics;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extractors::AdminGuard;
use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

struct FilePart {
    name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::upload(UploadErrorCode::TooLarge, e.body_text())
    } else {
        Error::validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// POST /api/upload
///
/// Multipart fields: `file` (required) and `category` (optional).
pub async fn upload_handler(
    State(state): State<AppState>,
    _admin: AdminGuard,
    multipart: Multipart,
) -> Result<Json<DataResponse<Value>>, ApiError> {
    match store_upload(&state, multipart).await {
        Ok(data) => {
            metrics().uploads_stored.inc();
            Ok(DataResponse::new(data))
        }
        Err(e) => {
            metrics().uploads_rejected.inc();
            warn!(error = %e, code = e.error_code(), "Upload rejected");
            Err(e.into())
        }
    }
}

async fn store_upload(state: &AppState, mut multipart: Multipart) -> Result<Value, Error> {
    let mut file: Option<FilePart> = None;
    let mut category: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(FilePart {
                    name,
                    content_type,
                    bytes,
                });
            }
            Some("category") => {
                category = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| Error::validation("file is required"))?;
    let plan = state.upload_policy.plan(
        file.name.as_deref(),
        file.content_type.as_deref(),
        file.bytes.len(),
        category.as_deref(),
        Utc::now().timestamp_millis(),
        &Uuid::new_v4().simple().to_string()[..8],
    )?;

    let dir = state.uploads_root.join(&plan.category);
    let path = dir.join(&plan.filename);
    let io_error = |e: std::io::Error| {
        error!(path = %path.display(), error = %e, "Failed to write upload");
        Error::internal("Failed to store file")
    };
    tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;
    // Never replace a stored file.
    let mut out = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(io_error)?;
    out.write_all(&file.bytes).await.map_err(io_error)?;
    out.flush().await.map_err(io_error)?;

    info!(
        category = %plan.category,
        filename = %plan.filename,
        size = file.bytes.len(),
        "Upload stored"
    );

    Ok(json!({
        "url": plan.public_url(),
        "filename": plan.filename,
        "category": plan.category,
        "size": file.bytes.len(),
        "contentType": plan.content_type,
    }))
}
