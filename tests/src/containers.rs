//! Testcontainer setup for MySQL.
//!
//! Set `HOSTVOUCHER_TEST_MYSQL_URL` to run against an existing server
//! instead of starting a container.

use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const DATABASE: &str = "hostvoucher";
const ROOT_PASSWORD: &str = "hostvoucher";

/// Container handle for MySQL.
pub struct TestContainers {
    #[allow(dead_code)]
    mysql: Option<ContainerAsync<GenericImage>>,
    pub mysql_url: String,
}

impl TestContainers {
    /// Start MySQL, or reuse the server named by the environment.
    pub async fn start() -> Self {
        if let Some(url) = std::env::var("HOSTVOUCHER_TEST_MYSQL_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            return Self {
                mysql: None,
                mysql_url: url,
            };
        }

        let (mysql, mysql_url) = start_mysql().await;
        Self {
            mysql: Some(mysql),
            mysql_url,
        }
    }
}

/// Start a MySQL container, return the container and its connection URL.
pub async fn start_mysql() -> (ContainerAsync<GenericImage>, String) {
    let image = GenericImage::new("mysql", "8.0")
        .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
        .with_exposed_port(3306.tcp())
        .with_env_var("MYSQL_ROOT_PASSWORD", ROOT_PASSWORD)
        .with_env_var("MYSQL_DATABASE", DATABASE);

    let container = image.start().await.expect("Failed to start MySQL");

    let port = container.get_host_port_ipv4(3306).await.unwrap();
    let url = format!("mysql://root:{}@127.0.0.1:{}/{}", ROOT_PASSWORD, port, DATABASE);

    // The image restarts the server once after initializing the data dir
    wait_for_mysql(&url, Duration::from_secs(60)).await;

    (container, url)
}

/// Wait until a connection succeeds and answers `SELECT 1`.
async fn wait_for_mysql(url: &str, timeout: Duration) {
    let start = std::time::Instant::now();

    while start.elapsed() < timeout {
        if let Ok(pool) = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(2))
            .connect(url)
            .await
        {
            if sqlx::query("SELECT 1").execute(&pool).await.is_ok() {
                pool.close().await;
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("MySQL at {} not ready after {:?}", url, timeout);
}
