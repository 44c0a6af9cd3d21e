//! Application state shared across handlers.

use site_core::{Result, UploadPolicy, UserAgentClassifier};
use site_store::Store;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::ApiConfig;
use crate::image_proxy::ImageProxy;
use crate::middleware::auth::AdminAuth;
use crate::middleware::rate_limit::{RateLimiter, SharedRateLimiter};
use crate::settings::SettingsService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Storage (MySQL in production, in-memory in tests)
    pub store: Arc<dyn Store>,
    /// Settings snapshot
    pub settings: Arc<SettingsService>,
    pub admin: AdminAuth,
    /// Rate limiter for public submissions
    pub rate_limiter: SharedRateLimiter,
    pub image_proxy: ImageProxy,
    pub uploads_root: Arc<PathBuf>,
    pub upload_policy: UploadPolicy,
    pub classifier: Arc<UserAgentClassifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &ApiConfig) -> Result<Self> {
        let admin = AdminAuth::new(config.admin_token.clone());
        if admin.is_open() {
            warn!("No admin token configured; admin endpoints are open");
        }

        Ok(Self {
            settings: Arc::new(SettingsService::new(store.clone())),
            store,
            admin,
            rate_limiter: Arc::new(RateLimiter::new(config.submission_rate_limit.clone())),
            image_proxy: ImageProxy::new(&config.image_proxy)?,
            uploads_root: Arc::new(config.uploads_root.clone()),
            upload_policy: UploadPolicy {
                max_bytes: config.max_upload_bytes,
            },
            classifier: Arc::new(UserAgentClassifier::new()),
        })
    }

    /// Start the rate limiter cleanup background task.
    /// Returns a handle that can be used to cancel the task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let rate_limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                rate_limiter.cleanup_stale();
            }
        })
    }
}
