//! In-process settings snapshot.
//!
//! Loaded from the store at startup and after every save. Readers get an
//! `Arc<SiteSettings>` and never see a half-applied update.

use parking_lot::RwLock;
use serde_json::Value;
use site_core::{
    prepare_section, Result, SectionWrite, SettingsSection, SiteSettings, CURRENT_SCHEMA_VERSION,
};
use site_store::Store;
use std::sync::Arc;
use telemetry::{health, metrics};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct SettingsService {
    store: Arc<dyn Store>,
    snapshot: RwLock<Arc<SiteSettings>>,
    /// Schema version of the stored row, `None` until a load succeeds. The
    /// lock also serializes writes.
    stored_version: Mutex<Option<i64>>,
}

impl SettingsService {
    /// Starts from defaults; call [`reload`](Self::reload) to read the store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(SiteSettings::default())),
            stored_version: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> Arc<SiteSettings> {
        self.snapshot.read().clone()
    }

    /// Re-read the singleton row and swap the snapshot.
    pub async fn reload(&self) -> Result<Arc<SiteSettings>> {
        let mut stored_version = self.stored_version.lock().await;
        self.reload_locked(&mut stored_version).await
    }

    async fn reload_locked(&self, stored_version: &mut Option<i64>) -> Result<Arc<SiteSettings>> {
        let raw = match self.store.load_settings().await {
            Ok(raw) => raw,
            Err(e) => {
                health().settings.set_unhealthy(e.to_string());
                return Err(e);
            }
        };

        let settings = match raw {
            Some(raw) => {
                let (settings, warnings) = SiteSettings::from_raw(&raw);
                for warning in &warnings {
                    warn!(schema_version = raw.schema_version, "Settings: {}", warning);
                }
                *stored_version = Some(raw.schema_version);
                settings
            }
            None => {
                info!("No settings row yet, using defaults");
                *stored_version = Some(CURRENT_SCHEMA_VERSION);
                SiteSettings::default()
            }
        };

        let settings = Arc::new(settings);
        *self.snapshot.write() = settings.clone();
        health().settings.set_healthy();
        metrics().settings_reloads.inc();
        Ok(settings)
    }

    /// Validate and persist the given sections, then reload.
    ///
    /// A row stored under an older schema version is rewritten whole, so
    /// every column matches the version stamped on it. If the row has not
    /// been read yet it is loaded first; nothing is written when that fails.
    pub async fn save(&self, updates: Vec<(SettingsSection, Value)>) -> Result<Arc<SiteSettings>> {
        let mut writes: Vec<SectionWrite> = updates
            .into_iter()
            .map(|(section, value)| prepare_section(section, value))
            .collect::<Result<_>>()?;

        let mut stored_version = self.stored_version.lock().await;

        let version = match *stored_version {
            Some(version) => version,
            None => {
                self.reload_locked(&mut stored_version).await?;
                stored_version.unwrap_or(CURRENT_SCHEMA_VERSION)
            }
        };

        if version < CURRENT_SCHEMA_VERSION {
            let current = self.snapshot();
            for section in SettingsSection::ALL {
                if !writes.iter().any(|w| w.section == section) {
                    writes.push(prepare_section(section, current.section_value(section))?);
                }
            }
            info!(
                from = version,
                to = CURRENT_SCHEMA_VERSION,
                "Upgrading settings row"
            );
        }

        self.store.save_settings(&writes).await?;
        info!(
            sections = ?writes.iter().map(|w| w.section.column()).collect::<Vec<_>>(),
            "Settings saved"
        );

        self.reload_locked(&mut stored_version).await
    }
}
