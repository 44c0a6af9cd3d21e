//! Storage for the HostVoucher backend: MySQL in production, in-memory for
//! development and tests.

pub mod config;
pub mod health;
pub mod memory;
pub mod mysql;
pub mod schema;
pub mod traits;

pub use config::*;
pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use traits::*;

use site_core::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the configured store.
///
/// For MySQL this also creates missing tables when `init_schema` is set. A
/// schema failure is logged, not returned: the database may come up later and
/// readiness reports it until then.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>> {
    match config.backend {
        StoreBackend::Mysql => {
            let store = MySqlStore::new(config)?;
            if config.init_schema {
                match health::init_schema(&store).await {
                    Ok(()) => info!("Database schema ready"),
                    Err(e) => warn!("Failed to initialize schema: {}. Continuing anyway...", e),
                }
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
