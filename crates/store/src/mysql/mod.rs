//! MySQL-backed store.

mod analytics;
mod content;
mod gamification;
mod products;
mod settings;
mod webhooks;

use crate::config::DatabaseConfig;
use crate::traits::Store;
use async_trait::async_trait;
use site_core::{Error, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::{info, warn};

/// MySQL store over a lazily connected pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Builds the pool without connecting; the first query opens a connection.
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy(&config.url)
            .map_err(db_err)?;

        info!(
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            "Created MySQL pool"
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mysql"
    }
}

/// Map a driver error onto `DB_001`.
pub(crate) fn db_err(e: sqlx::Error) -> Error {
    warn!(error = %e, "MySQL query failed");
    Error::database(e.to_string())
}

/// True for duplicate-key failures (MySQL error 1062).
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
