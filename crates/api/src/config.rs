//! HTTP layer configuration.

use serde::{Deserialize, Serialize};
use site_core::limits::{MAX_PROXY_IMAGE_BYTES, MAX_UPLOAD_BYTES};
use std::path::PathBuf;

use crate::middleware::rate_limit::RateLimitConfig;

/// Settings for the handlers, loaded as part of the service config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Token for admin endpoints. Unset means admin endpoints are open.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Directory uploaded files are written to and served from.
    #[serde(default = "default_uploads_root")]
    pub uploads_root: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub image_proxy: ImageProxyConfig,

    /// Per-client limit on public submission endpoints.
    #[serde(default)]
    pub submission_rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProxyConfig {
    /// Upstream fetch timeout in seconds
    #[serde(default = "default_proxy_timeout_secs")]
    pub timeout_secs: u64,
    /// Cached images
    #[serde(default = "default_proxy_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default = "default_proxy_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Largest upstream body read before giving up
    #[serde(default = "default_proxy_max_image_bytes")]
    pub max_image_bytes: usize,
}

fn default_uploads_root() -> PathBuf {
    PathBuf::from("public/uploads")
}

fn default_max_upload_bytes() -> usize {
    MAX_UPLOAD_BYTES
}

fn default_proxy_timeout_secs() -> u64 {
    10
}

fn default_proxy_cache_capacity() -> u64 {
    500
}

fn default_proxy_cache_ttl_secs() -> u64 {
    3600
}

fn default_proxy_max_image_bytes() -> usize {
    MAX_PROXY_IMAGE_BYTES
}

impl Default for ImageProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_proxy_timeout_secs(),
            cache_capacity: default_proxy_cache_capacity(),
            cache_ttl_secs: default_proxy_cache_ttl_secs(),
            max_image_bytes: default_proxy_max_image_bytes(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            uploads_root: default_uploads_root(),
            max_upload_bytes: default_max_upload_bytes(),
            image_proxy: ImageProxyConfig::default(),
            submission_rate_limit: RateLimitConfig::default(),
        }
    }
}
