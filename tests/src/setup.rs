//! Common test setup functions.

use api::{router, ApiConfig, AppState};
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use site_store::{MemoryStore, Store};
use std::path::PathBuf;
use std::sync::Arc;

use api::middleware::rate_limit::RateLimitConfig;

/// Admin token used by [`TestContext::with_admin_token`].
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

/// Test context over the real router and the in-memory store.
///
/// Every context gets its own store, rate limiter and uploads directory.
pub struct TestContext {
    pub store: MemoryStore,
    pub state: AppState,
    pub server: TestServer,
    pub uploads_root: PathBuf,
}

impl TestContext {
    /// Admin endpoints open (no token configured).
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Admin endpoints require [`TEST_ADMIN_TOKEN`].
    pub async fn with_admin_token() -> Self {
        let mut config = test_config();
        config.admin_token = Some(TEST_ADMIN_TOKEN.to_string());
        Self::with_config(config).await
    }

    pub async fn with_config(mut config: ApiConfig) -> Self {
        let uploads_root =
            std::env::temp_dir().join(format!("hostvoucher-test-{}", uuid::Uuid::new_v4()));
        config.uploads_root = uploads_root.clone();

        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()) as Arc<dyn Store>, &config)
            .expect("Failed to create app state");
        state
            .settings
            .reload()
            .await
            .expect("Failed to load settings");

        let server = TestServer::new(router(state.clone())).expect("Failed to create test server");

        Self {
            store,
            state,
            server,
            uploads_root,
        }
    }

    /// `X-Admin-Token` header carrying [`TEST_ADMIN_TOKEN`].
    pub fn admin_header() -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-admin-token"),
            HeaderValue::from_static(TEST_ADMIN_TOKEN),
        )
    }

    /// `Authorization: Bearer` header carrying [`TEST_ADMIN_TOKEN`].
    pub fn bearer_header() -> (HeaderName, HeaderValue) {
        (
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", TEST_ADMIN_TOKEN))
                .expect("valid header value"),
        )
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_root);
    }
}

/// Defaults with a rate limit high enough that ordinary tests never hit it.
pub fn test_config() -> ApiConfig {
    ApiConfig {
        submission_rate_limit: RateLimitConfig {
            rate: 1000,
            burst: 1000,
        },
        ..ApiConfig::default()
    }
}

/// Test context over the real router and a MySQL container.
pub struct MySqlTestContext {
    pub containers: crate::containers::TestContainers,
    pub store: Arc<site_store::MySqlStore>,
    pub server: TestServer,
}

impl MySqlTestContext {
    pub async fn new() -> Self {
        let containers = crate::containers::TestContainers::start().await;

        let db_config = site_store::DatabaseConfig {
            backend: site_store::StoreBackend::Mysql,
            url: containers.mysql_url.clone(),
            ..site_store::DatabaseConfig::default()
        };
        let store = Arc::new(
            site_store::MySqlStore::new(&db_config).expect("Failed to create MySQL store"),
        );
        site_store::health::init_schema(&store)
            .await
            .expect("Failed to initialize schema");

        let state = AppState::new(store.clone() as Arc<dyn Store>, &test_config())
            .expect("Failed to create app state");
        state
            .settings
            .reload()
            .await
            .expect("Failed to load settings");
        let server = TestServer::new(router(state)).expect("Failed to create test server");

        Self {
            containers,
            store,
            server,
        }
    }
}
