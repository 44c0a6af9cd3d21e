use super::{db_err, MySqlStore};
use crate::traits::AnalyticsStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use site_core::{CountEntry, DailyCount, Pageview, ProductClicks, Result, Visit, VisitDimension};
use std::collections::BTreeMap;

#[async_trait]
impl AnalyticsStore for MySqlStore {
    async fn record_visit(&self, v: &Visit) -> Result<()> {
        sqlx::query(
            "INSERT INTO visitors (id, session_id, path, referrer, language, user_agent, browser, \
             os, device_type, country, ip_address, visited_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&v.id)
        .bind(&v.session_id)
        .bind(&v.path)
        .bind(&v.referrer)
        .bind(&v.language)
        .bind(&v.user_agent)
        .bind(&v.browser)
        .bind(&v.os)
        .bind(&v.device_type)
        .bind(&v.country)
        .bind(&v.ip_address)
        .bind(v.visited_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn record_pageview(&self, p: &Pageview) -> Result<()> {
        sqlx::query(
            "INSERT INTO pageviews (id, session_id, path, title, duration_seconds, visited_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&p.id)
        .bind(&p.session_id)
        .bind(&p.path)
        .bind(&p.title)
        .bind(p.duration_seconds)
        .bind(p.visited_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn count_visits_since(&self, since: Option<DateTime<Utc>>) -> Result<i64> {
        let count = match since {
            Some(since) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM visitors WHERE visited_at >= ?")
                    .bind(since)
                    .fetch_one(self.pool())
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM visitors")
                    .fetch_one(self.pool())
                    .await
            }
        }
        .map_err(db_err)?;
        Ok(count)
    }

    async fn count_sessions_since(&self, since: DateTime<Utc>) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(DISTINCT session_id) FROM visitors WHERE visited_at >= ?")
            .bind(since)
            .fetch_one(self.pool())
            .await
            .map_err(db_err)
    }

    async fn count_pageviews(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pageviews")
            .fetch_one(self.pool())
            .await
            .map_err(db_err)
    }

    async fn count_clicks(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM click_events")
            .fetch_one(self.pool())
            .await
            .map_err(db_err)
    }

    async fn top_values(
        &self,
        dimension: VisitDimension,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CountEntry>> {
        // Column name comes from the closed VisitDimension enum.
        let sql = format!(
            "SELECT COALESCE({col}, 'unknown') AS label, COUNT(*) AS count FROM visitors \
             WHERE visited_at >= ? GROUP BY label ORDER BY count DESC, label ASC LIMIT ?",
            col = dimension.column()
        );
        let rows: Vec<(String, i64)> = sqlx::query_as(&sql)
            .bind(since)
            .bind(limit as u64)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(label, count)| CountEntry { label, count })
            .collect())
    }

    async fn daily_counts(&self, since: DateTime<Utc>) -> Result<Vec<DailyCount>> {
        let visits: Vec<(NaiveDate, i64)> = sqlx::query_as(
            "SELECT DATE(visited_at) AS day, COUNT(*) FROM visitors WHERE visited_at >= ? \
             GROUP BY day",
        )
        .bind(since)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        let pageviews: Vec<(NaiveDate, i64)> = sqlx::query_as(
            "SELECT DATE(visited_at) AS day, COUNT(*) FROM pageviews WHERE visited_at >= ? \
             GROUP BY day",
        )
        .bind(since)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        let mut by_day: BTreeMap<NaiveDate, DailyCount> = BTreeMap::new();
        for (date, n) in visits {
            by_day
                .entry(date)
                .or_insert_with(|| empty_day(date))
                .visitors = n;
        }
        for (date, n) in pageviews {
            by_day
                .entry(date)
                .or_insert_with(|| empty_day(date))
                .pageviews = n;
        }
        Ok(by_day.into_values().collect())
    }

    async fn top_products_by_clicks(&self, limit: usize) -> Result<Vec<ProductClicks>> {
        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT id, name, clicks FROM products WHERE clicks > 0 \
             ORDER BY clicks DESC, catalog_number DESC LIMIT ?",
        )
        .bind(limit as u64)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(id, name, clicks)| ProductClicks { id, name, clicks })
            .collect())
    }
}

fn empty_day(date: NaiveDate) -> DailyCount {
    DailyCount {
        date,
        visitors: 0,
        pageviews: 0,
    }
}

