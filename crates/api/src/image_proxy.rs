//! Server-side image fetcher with a bounded cache.

use bytes::{Bytes, BytesMut};
use moka::future::Cache;
use site_core::{is_image_content_type, Error, Result};
use std::time::Duration;
use telemetry::metrics;
use tracing::{debug, warn};
use url::Url;

use crate::config::ImageProxyConfig;

/// A fetched upstream image.
#[derive(Debug, Clone)]
pub struct ProxiedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Image proxy client.
///
/// Caches successful fetches by URL; failures are never cached.
#[derive(Clone)]
pub struct ImageProxy {
    http_client: reqwest::Client,
    cache: Cache<String, ProxiedImage>,
    max_image_bytes: usize,
}

impl ImageProxy {
    pub fn new(config: &ImageProxyConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("hostvoucher-image-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            cache: Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .build(),
            max_image_bytes: config.max_image_bytes,
        })
    }

    /// Fetch an image, serving from cache when possible.
    ///
    /// Errors when the upstream fails, is too large, or does not return an
    /// image; callers fall back to the placeholder.
    pub async fn fetch(&self, url: &Url) -> Result<ProxiedImage> {
        let cache_key = url.as_str().to_string();

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!(url = %url, "Image proxy cache hit");
            metrics().image_proxy_hits.inc();
            return Ok(cached);
        }

        metrics().image_proxy_fetches.inc();
        let image = self.fetch_remote(url).await?;
        self.cache.insert(cache_key, image.clone()).await;
        Ok(image)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<ProxiedImage> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Image fetch failed");
                Error::internal(format!("Image fetch failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Image upstream returned error");
            return Err(Error::internal(format!("Upstream returned {}", status)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_image_content_type(&content_type) {
            warn!(url = %url, content_type = %content_type, "Upstream is not an image");
            return Err(Error::internal(format!("Not an image: {}", content_type)));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_image_bytes as u64 {
                return Err(Error::internal(format!("Image too large: {} bytes", len)));
            }
        }

        let bytes = self.read_capped(url, response).await?;

        debug!(url = %url, size = bytes.len(), content_type = %content_type, "Fetched image");
        Ok(ProxiedImage {
            bytes,
            content_type,
        })
    }

    /// Read the body chunk by chunk, stopping as soon as it exceeds the cap.
    ///
    /// `Content-Length` is absent on chunked responses, so the cap has to be
    /// enforced while reading.
    async fn read_capped(&self, url: &Url, mut response: reqwest::Response) -> Result<Bytes> {
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::internal(format!("Image read failed: {}", e)))?
        {
            if body.len() + chunk.len() > self.max_image_bytes {
                warn!(url = %url, limit = self.max_image_bytes, "Image body over limit");
                return Err(Error::internal(format!(
                    "Image exceeds {} bytes",
                    self.max_image_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}
