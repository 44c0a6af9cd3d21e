//! Per-client rate limiting for public submission endpoints.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry::metrics;
use tracing::warn;

use crate::extractors::client_ip_from_headers;
use crate::response::ApiError;
use crate::state::AppState;

/// Buckets idle for longer than this are dropped by `cleanup_stale`.
const STALE_BUCKET_AGE: Duration = Duration::from_secs(600);

/// Token bucket rate limiter keyed by client.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    config: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second
    pub rate: u32,
    /// Burst size
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { rate: 5, burst: 30 }
    }
}

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(burst: u32) -> Self {
        Self {
            tokens: burst as f64,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, rate: u32, burst: u32) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;

        self.tokens = (self.tokens + elapsed * rate as f64).min(burst as f64);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Check if request is allowed for the given key.
    pub fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock();

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.config.burst));

        bucket.try_acquire(self.config.rate, self.config.burst)
    }

    /// Seconds until one token is available again.
    pub fn retry_after_secs(&self) -> u64 {
        if self.config.rate == 0 {
            return 60;
        }
        (1.0 / self.config.rate as f64).ceil() as u64
    }

    /// Clean up buckets idle longer than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        let mut buckets = self.buckets.lock();
        let now = Instant::now();

        buckets.retain(|_, bucket| now.duration_since(bucket.last_update) < max_age);
    }

    pub fn cleanup_stale(&self) {
        self.cleanup(STALE_BUCKET_AGE);
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().len()
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;

/// Rejects requests from clients that exhausted their bucket.
///
/// Clients without a resolvable IP share one bucket.
pub async fn limit_submissions(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_ip_from_headers(request.headers()).unwrap_or_else(|| "unknown".to_string());

    if !state.rate_limiter.check(&key) {
        metrics().rate_limited_requests.inc();
        warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        return Err(ApiError::rate_limited(
            "Too many requests",
            Some(state.rate_limiter.retry_after_secs()),
        ));
    }

    Ok(next.run(request).await)
}
