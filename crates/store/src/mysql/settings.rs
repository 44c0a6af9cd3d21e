use super::{db_err, MySqlStore};
use crate::traits::SettingsStore;
use async_trait::async_trait;
use chrono::Utc;
use site_core::{
    RawSettings, Result, SectionWrite, SettingsSection, CURRENT_SCHEMA_VERSION, SETTINGS_ROW_ID,
};
use sqlx::FromRow;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(FromRow)]
struct SettingsRow {
    schema_version: i32,
    site_appearance: Option<String>,
    page_banners: Option<String>,
    popup_modal: Option<String>,
    currency_rates: Option<String>,
    gamification_points: Option<String>,
}

impl SettingsRow {
    fn into_raw(self) -> RawSettings {
        let mut columns = BTreeMap::new();
        for (section, text) in [
            (SettingsSection::SiteAppearance, self.site_appearance),
            (SettingsSection::PageBanners, self.page_banners),
            (SettingsSection::PopupModal, self.popup_modal),
            (SettingsSection::CurrencyRates, self.currency_rates),
            (SettingsSection::GamificationPoints, self.gamification_points),
        ] {
            if let Some(text) = text {
                columns.insert(section, text);
            }
        }
        RawSettings {
            schema_version: i64::from(self.schema_version),
            columns,
        }
    }
}

/// Upsert touching only the given columns. Column names come from
/// [`SettingsSection::column`], never from input.
fn upsert_sql(writes: &[SectionWrite]) -> String {
    let columns: Vec<&str> = writes.iter().map(|w| w.section.column()).collect();

    let mut sql = String::from("INSERT INTO settings (id, schema_version, updated_at");
    for column in &columns {
        sql.push_str(", ");
        sql.push_str(column);
    }
    sql.push_str(") VALUES (?, ?, ?");
    for _ in &columns {
        sql.push_str(", ?");
    }
    sql.push_str(
        ") ON DUPLICATE KEY UPDATE schema_version = VALUES(schema_version), \
         updated_at = VALUES(updated_at)",
    );
    for column in &columns {
        sql.push_str(&format!(", {0} = VALUES({0})", column));
    }
    sql
}

#[async_trait]
impl SettingsStore for MySqlStore {
    async fn load_settings(&self) -> Result<Option<RawSettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT schema_version, site_appearance, page_banners, popup_modal, currency_rates, \
             gamification_points FROM settings WHERE id = ?",
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;

        Ok(row.map(SettingsRow::into_raw))
    }

    async fn save_settings(&self, writes: &[SectionWrite]) -> Result<()> {
        let sql = upsert_sql(writes);
        let mut query = sqlx::query(&sql)
            .bind(SETTINGS_ROW_ID)
            .bind(CURRENT_SCHEMA_VERSION)
            .bind(Utc::now());
        for write in writes {
            query = query.bind(&write.json);
        }
        query.execute(self.pool()).await.map_err(db_err)?;

        debug!(sections = writes.len(), "Saved settings");
        Ok(())
    }
}
