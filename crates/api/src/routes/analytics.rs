//! `/api/analytics/*`: visitor tracking and the admin dashboard.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use site_core::limits::{DASHBOARD_TOP_N, MAX_DASHBOARD_DAYS};
use site_core::{
    coerce, fill_daily_series, DashboardStats, PageviewInput, VisitDimension, VisitInput,
    VisitorTotals,
};
use std::time::Instant;
use telemetry::metrics;
use tracing::debug;
use uuid::Uuid;

use super::parse_json;
use crate::extractors::{AdminGuard, ClientMeta};
use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

const DEFAULT_DASHBOARD_DAYS: u32 = 30;
const TOP_PRODUCTS: usize = 10;

/// POST /api/analytics/visit
pub async fn visit_handler(
    State(state): State<AppState>,
    ClientMeta(meta): ClientMeta,
    body: Bytes,
) -> Result<Json<DataResponse<Value>>, ApiError> {
    let input: VisitInput = parse_json(&body)?;
    let visit = input.into_visit(
        Uuid::new_v4().to_string(),
        meta,
        &state.classifier,
        Utc::now(),
    )?;

    state.store.record_visit(&visit).await?;
    metrics().visits_recorded.inc();
    debug!(
        session_id = %visit.session_id,
        browser = %visit.browser,
        device_type = %visit.device_type,
        "Visit recorded"
    );

    Ok(DataResponse::new(json!({ "recorded": true, "id": visit.id })))
}

/// POST /api/analytics/pageview
pub async fn pageview_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DataResponse<Value>>, ApiError> {
    let input: PageviewInput = parse_json(&body)?;
    let pageview = input.into_pageview(Uuid::new_v4().to_string(), Utc::now())?;

    state.store.record_pageview(&pageview).await?;
    metrics().pageviews_recorded.inc();

    Ok(DataResponse::new(json!({ "recorded": true, "id": pageview.id })))
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub days: Option<i64>,
}

/// Dashboard window in days, clamped to `1..=MAX_DASHBOARD_DAYS`.
fn dashboard_days(requested: Option<i64>) -> u32 {
    requested
        .map(|d| d.clamp(1, MAX_DASHBOARD_DAYS as i64) as u32)
        .unwrap_or(DEFAULT_DASHBOARD_DAYS)
}

fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// GET /api/analytics/dashboard?days=N
pub async fn dashboard_handler(
    State(state): State<AppState>,
    _admin: AdminGuard,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DataResponse<DashboardStats>>, ApiError> {
    let start = Instant::now();
    let days = dashboard_days(query.days);

    let now = Utc::now();
    let today = start_of_day(now);
    let week = now - Duration::days(7);
    let month = now - Duration::days(30);
    let window_start = today - Duration::days(i64::from(days) - 1);
    let top_n = DASHBOARD_TOP_N as usize;

    let store = &state.store;
    let (
        visitors_today,
        visitors_week,
        visitors_month,
        visitors_all,
        sessions_month,
        total_pageviews,
        total_clicks,
        top_countries,
        top_browsers,
        devices,
        daily_rows,
        top_products,
    ) = tokio::try_join!(
        store.count_visits_since(Some(today)),
        store.count_visits_since(Some(week)),
        store.count_visits_since(Some(month)),
        store.count_visits_since(None),
        store.count_sessions_since(month),
        store.count_pageviews(),
        store.count_clicks(),
        store.top_values(VisitDimension::Country, window_start, top_n),
        store.top_values(VisitDimension::Browser, window_start, top_n),
        store.top_values(VisitDimension::DeviceType, window_start, top_n),
        store.daily_counts(window_start),
        store.top_products_by_clicks(TOP_PRODUCTS),
    )?;

    let stats = DashboardStats {
        visitors: VisitorTotals {
            today: visitors_today,
            week: visitors_week,
            month: visitors_month,
            all_time: visitors_all,
        },
        unique_sessions_month: sessions_month,
        total_pageviews,
        total_clicks,
        top_countries,
        top_browsers,
        devices,
        daily: fill_daily_series(window_start.date_naive(), today.date_naive(), &daily_rows),
        top_products,
        generated_at: now,
    };

    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().dashboard_latency_ms.observe(latency_ms);
    debug!(days, latency_ms, "Dashboard assembled");

    Ok(DataResponse::new(stats))
}
