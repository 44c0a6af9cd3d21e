use super::{db_err, MySqlStore};
use crate::traits::GamificationStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use site_core::{BadgeAward, Error, GamificationUser, Result};
use tracing::info;

impl MySqlStore {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<GamificationUser>> {
        let row: Option<(i64, DateTime<Utc>)> =
            sqlx::query_as("SELECT points, updated_at FROM gamification_users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await
                .map_err(db_err)?;

        let Some((points, updated_at)) = row else {
            return Ok(None);
        };

        let badges: Vec<String> =
            sqlx::query_scalar("SELECT badge FROM user_badges WHERE user_id = ? ORDER BY badge")
                .bind(user_id)
                .fetch_all(self.pool())
                .await
                .map_err(db_err)?;

        Ok(Some(GamificationUser {
            user_id: user_id.to_string(),
            points,
            badges,
            updated_at,
        }))
    }

    async fn fetch_existing_user(&self, user_id: &str) -> Result<GamificationUser> {
        self.fetch_user(user_id)
            .await?
            .ok_or_else(|| Error::internal(format!("gamification user {} vanished", user_id)))
    }
}

#[async_trait]
impl GamificationStore for MySqlStore {
    async fn award_points(&self, user_id: &str, points: i64) -> Result<GamificationUser> {
        // Single statement, so concurrent awards add up instead of overwriting.
        sqlx::query(
            "INSERT INTO gamification_users (user_id, points, updated_at) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE points = points + VALUES(points), \
             updated_at = VALUES(updated_at)",
        )
        .bind(user_id)
        .bind(points)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        info!(user_id, points, "Awarded points");
        self.fetch_existing_user(user_id).await
    }

    async fn award_badge(&self, user_id: &str, badge: &str) -> Result<BadgeAward> {
        let now = Utc::now();
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        sqlx::query(
            "INSERT INTO gamification_users (user_id, points, updated_at) VALUES (?, 0, ?) \
             ON DUPLICATE KEY UPDATE updated_at = VALUES(updated_at)",
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let inserted =
            sqlx::query("INSERT IGNORE INTO user_badges (user_id, badge, awarded_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(badge)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        let newly_awarded = inserted.rows_affected() > 0;
        info!(user_id, badge, newly_awarded, "Awarded badge");

        Ok(BadgeAward {
            user: self.fetch_existing_user(user_id).await?,
            newly_awarded,
        })
    }

    async fn get_gamification_user(&self, user_id: &str) -> Result<Option<GamificationUser>> {
        self.fetch_user(user_id).await
    }
}
