//! HostVoucher backend
//!
//! Serves the deals site API:
//! - Catalog, settings and content reads
//! - Admin actions, uploads and catalog ordering
//! - Public submissions, click tracking and visitor analytics
//! - Affiliate network webhook logging

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use api::{router, ApiConfig, AppState};
use site_store::{DatabaseConfig, StoreBackend};
use telemetry::{init_tracing, LoggingConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    database: DatabaseConfig,

    #[serde(default)]
    api: ApiConfig,

    #[serde(default)]
    logging: LoggingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: DatabaseConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.logging.clone().with_env_overrides());

    info!("Starting HostVoucher backend v{}", env!("CARGO_PKG_VERSION"));
    info!(
        backend = ?config.database.backend,
        max_connections = config.database.max_connections,
        uploads_root = %config.api.uploads_root.display(),
        "Loaded configuration"
    );

    let store = site_store::connect(&config.database)
        .await
        .context("Failed to create store")?;

    if site_store::health::check_connection(store.as_ref()).await {
        info!(backend = store.backend_name(), "Store connection: healthy");
    } else {
        // The pool reconnects lazily; serve anyway and let /health/ready report it
        warn!(backend = store.backend_name(), "Store connection: unhealthy");
    }

    let state = AppState::new(store, &config.api).context("Failed to create application state")?;

    if let Err(e) = state.settings.reload().await {
        warn!("Failed to load settings: {}. Serving defaults", e);
    }

    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();
    info!("Started rate limiter cleanup task (every 5 minutes)");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("HOSTVOUCHER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat variables for the common settings; nested `__` names are easy to get wrong
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(url) = std::env::var("HOSTVOUCHER_DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(backend) = std::env::var("HOSTVOUCHER_STORE") {
        config.database.backend = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "mysql" => StoreBackend::Mysql,
            other => anyhow::bail!("Unknown HOSTVOUCHER_STORE: {}", other),
        };
    }
    if let Ok(token) = std::env::var("HOSTVOUCHER_ADMIN_TOKEN") {
        config.api.admin_token = Some(token);
    }
    if let Ok(root) = std::env::var("HOSTVOUCHER_UPLOADS_ROOT") {
        config.api.uploads_root = root.into();
    }

    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
