//! Store health checks.

use crate::mysql::{db_err, MySqlStore};
use crate::traits::Store;
use site_core::Result;
use telemetry::health;
use tracing::{debug, error};

/// Check store connectivity and record the result in the health registry.
pub async fn check_connection(store: &dyn Store) -> bool {
    match store.ping().await {
        Ok(()) => {
            debug!(backend = store.backend_name(), "Store connection healthy");
            health().database.set_healthy();
            true
        }
        Err(e) => {
            error!(backend = store.backend_name(), "Store health check failed: {}", e);
            health().database.set_unhealthy(e.to_string());
            false
        }
    }
}

/// Create missing tables.
pub async fn init_schema(store: &MySqlStore) -> Result<()> {
    use crate::schema::all_tables;

    for ddl in all_tables() {
        sqlx::query(ddl)
            .execute(store.pool())
            .await
            .map_err(db_err)?;
    }

    debug!("MySQL schema initialized");
    Ok(())
}
