//! `/api/settings`: read the snapshot, write one or all sections.

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::{Map, Value};
use site_core::{Error, SettingsSection, SiteSettings, ValidationErrorCode};
use std::sync::Arc;

use super::parse_json;
use crate::extractors::AdminGuard;
use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

/// `POST /api/settings` body.
#[derive(Debug, Deserialize)]
pub struct SectionUpdate {
    pub section: String,
    pub data: Value,
}

/// GET /api/settings
pub async fn get_settings_handler(
    State(state): State<AppState>,
) -> Json<DataResponse<Arc<SiteSettings>>> {
    DataResponse::new(state.settings.snapshot())
}

/// POST /api/settings - replace one section.
pub async fn post_settings_handler(
    State(state): State<AppState>,
    _admin: AdminGuard,
    body: Bytes,
) -> Result<Json<DataResponse<Arc<SiteSettings>>>, ApiError> {
    let update: SectionUpdate = parse_json(&body)?;
    let section = SettingsSection::parse(&update.section)?;
    let settings = state.settings.save(vec![(section, update.data)]).await?;
    Ok(DataResponse::new(settings))
}

/// PUT /api/settings - replace every section.
///
/// Keys are section names (camelCase or column name). Sections missing from
/// the body are reset to their defaults.
pub async fn put_settings_handler(
    State(state): State<AppState>,
    _admin: AdminGuard,
    body: Bytes,
) -> Result<Json<DataResponse<Arc<SiteSettings>>>, ApiError> {
    let updates = full_update(parse_json(&body)?)?;
    let settings = state.settings.save(updates).await?;
    Ok(DataResponse::new(settings))
}

fn full_update(body: Map<String, Value>) -> Result<Vec<(SettingsSection, Value)>, Error> {
    let mut given = Vec::with_capacity(body.len());
    for (key, value) in body {
        if key == "schemaVersion" || key == "schema_version" {
            continue;
        }
        let section = SettingsSection::parse(&key)?;
        if given.iter().any(|(s, _)| *s == section) {
            return Err(Error::validation_code(
                ValidationErrorCode::InvalidPayload,
                format!("section {} given twice", section.column()),
            ));
        }
        given.push((section, value));
    }

    let defaults = SiteSettings::default();
    Ok(SettingsSection::ALL
        .into_iter()
        .map(|section| {
            let value = given
                .iter()
                .find(|(s, _)| *s == section)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| defaults.section_value(section));
            (section, value)
        })
        .collect())
}
