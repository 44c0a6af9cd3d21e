//! Structured logging setup.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when none is configured. sqlx logs every statement at info.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,tower_http=info";

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for local development.
    #[default]
    Pretty,
    /// One line per event without targets.
    Compact,
    /// Newline-delimited JSON for log shippers.
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" | "1" | "true" => Some(Self::Json),
            _ => None,
        }
    }
}

/// `[logging]` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Apply `RUST_LOG` and `LOG_FORMAT` (or the older `LOG_JSON`) on top.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                self.filter = filter;
            }
        }
        let format = std::env::var("LOG_FORMAT")
            .or_else(|_| std::env::var("LOG_JSON"))
            .ok()
            .and_then(|raw| LogFormat::parse(&raw));
        if let Some(format) = format {
            self.format = format;
        }
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber.
///
/// Returns false when one is already installed (tests, repeated calls).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
    }
    .is_ok();

    if installed {
        tracing::info!(filter = %config.filter, format = ?config.format, "Tracing initialized");
    }
    installed
}
