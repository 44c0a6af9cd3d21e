//! In-process counters.
//!
//! Exposed through `/health`; there is no external metrics sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the site backend.
#[derive(Debug, Default)]
pub struct Metrics {
    // Action dispatcher
    pub actions_dispatched: Counter,
    pub actions_failed: Counter,
    pub rate_limited_requests: Counter,

    // Public tracking
    pub clicks_tracked: Counter,
    pub visits_recorded: Counter,
    pub pageviews_recorded: Counter,

    // Files
    pub uploads_stored: Counter,
    pub uploads_rejected: Counter,
    pub image_proxy_hits: Counter,
    pub image_proxy_fetches: Counter,
    pub image_proxy_fallbacks: Counter,

    // Webhooks
    pub webhooks_received: Counter,
    pub webhook_log_failures: Counter,

    // Settings
    pub settings_reloads: Counter,

    // Latency histograms
    pub action_latency_ms: Histogram,
    pub dashboard_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub actions_dispatched: u64,
    pub actions_failed: u64,
    pub rate_limited_requests: u64,
    pub clicks_tracked: u64,
    pub visits_recorded: u64,
    pub pageviews_recorded: u64,
    pub uploads_stored: u64,
    pub uploads_rejected: u64,
    pub image_proxy_hits: u64,
    pub image_proxy_fetches: u64,
    pub image_proxy_fallbacks: u64,
    pub webhooks_received: u64,
    pub webhook_log_failures: u64,
    pub settings_reloads: u64,
    pub action_latency_mean_ms: f64,
    pub dashboard_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            actions_dispatched: self.actions_dispatched.get(),
            actions_failed: self.actions_failed.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            clicks_tracked: self.clicks_tracked.get(),
            visits_recorded: self.visits_recorded.get(),
            pageviews_recorded: self.pageviews_recorded.get(),
            uploads_stored: self.uploads_stored.get(),
            uploads_rejected: self.uploads_rejected.get(),
            image_proxy_hits: self.image_proxy_hits.get(),
            image_proxy_fetches: self.image_proxy_fetches.get(),
            image_proxy_fallbacks: self.image_proxy_fallbacks.get(),
            webhooks_received: self.webhooks_received.get(),
            webhook_log_failures: self.webhook_log_failures.get(),
            settings_reloads: self.settings_reloads.get(),
            action_latency_mean_ms: self.action_latency_ms.mean(),
            dashboard_latency_mean_ms: self.dashboard_latency_ms.mean(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
