use super::{db_err, MySqlStore};
use crate::traits::WebhookStore;
use async_trait::async_trait;
use site_core::{Result, WebhookLog};

#[async_trait]
impl WebhookStore for MySqlStore {
    async fn log_webhook(&self, log: &WebhookLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO webhook_logs (id, provider, method, headers, query, payload, received_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&log.id)
        .bind(&log.provider)
        .bind(&log.method)
        .bind(log.headers.to_string())
        .bind(&log.query)
        .bind(log.payload.to_string())
        .bind(log.received_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
