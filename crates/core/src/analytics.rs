//! Visitor analytics: visits, pageviews, clicks and the dashboard aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use woothee::parser::Parser;

use crate::coerce;
use crate::error::Result;
use crate::limits::{MAX_URL_LEN, MAX_USER_AGENT_LEN};

/// Request metadata captured server-side.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
}

/// Browser/OS/device classification of a user agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub browser: String,
    pub os: String,
    pub device_type: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            browser: "unknown".into(),
            os: "unknown".into(),
            device_type: "unknown".into(),
        }
    }
}

/// User agent classifier.
///
/// Uses woothee (~7us/parse). Device categories are folded into
/// desktop/mobile/bot/other/unknown.
pub struct UserAgentClassifier {
    parser: Parser,
}

impl UserAgentClassifier {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn classify(&self, user_agent: &str) -> ClientInfo {
        let mut info = ClientInfo::default();
        if user_agent.is_empty() {
            return info;
        }

        if let Some(result) = self.parser.parse(user_agent) {
            if !result.name.is_empty() && result.name != "UNKNOWN" {
                info.browser = result.name.to_string();
            }
            if !result.os.is_empty() && result.os != "UNKNOWN" {
                info.os = result.os.to_string();
            }
            let device_type = match result.category {
                "pc" => "desktop",
                "smartphone" | "mobilephone" => "mobile",
                "crawler" => "bot",
                "appliance" => "other",
                _ => "unknown",
            };
            info.device_type = device_type.to_string();
        }
        info
    }
}

impl Default for UserAgentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a country header value to an ISO 3166 alpha-2 code.
///
/// Cloudflare sends `XX` for unknown and `T1` for Tor; both are dropped.
pub fn normalize_country(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim().to_ascii_uppercase();
    let valid = code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase());
    if !valid || code == "XX" || code == "T1" {
        return None;
    }
    Some(code)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// `POST /api/analytics/visit` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VisitInput {
    #[serde(alias = "sessionId")]
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    #[serde(default = "default_path", alias = "page", alias = "pageUrl")]
    #[validate(length(max = 2048))]
    pub path: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub referrer: Option<String>,
    #[serde(default)]
    #[validate(length(max = 16))]
    pub language: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: String,
    pub session_id: String,
    pub path: String,
    pub referrer: Option<String>,
    pub language: Option<String>,
    pub user_agent: Option<String>,
    pub browser: String,
    pub os: String,
    pub device_type: String,
    pub country: Option<String>,
    pub ip_address: Option<String>,
    pub visited_at: DateTime<Utc>,
}

impl VisitInput {
    pub fn into_visit(
        self,
        id: String,
        meta: RequestMeta,
        classifier: &UserAgentClassifier,
        now: DateTime<Utc>,
    ) -> Result<Visit> {
        self.validate()?;
        let user_agent = meta
            .user_agent
            .as_deref()
            .map(|ua| truncate(ua, MAX_USER_AGENT_LEN));
        let client = classifier.classify(user_agent.as_deref().unwrap_or(""));

        Ok(Visit {
            id,
            session_id: self.session_id,
            path: self.path,
            referrer: self.referrer.filter(|r| !r.is_empty()),
            language: self.language,
            user_agent,
            browser: client.browser,
            os: client.os,
            device_type: client.device_type,
            country: normalize_country(meta.country.as_deref()),
            ip_address: meta.ip_address,
            visited_at: now,
        })
    }
}

/// `POST /api/analytics/pageview` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageviewInput {
    #[serde(alias = "sessionId")]
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    #[validate(length(min = 1, max = 2048))]
    pub path: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub title: Option<String>,
    #[serde(default, alias = "duration", alias = "durationSeconds", deserialize_with = "coerce::opt_i64")]
    #[validate(range(min = 0, max = 86400))]
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pageview {
    pub id: String,
    pub session_id: String,
    pub path: String,
    pub title: Option<String>,
    pub duration_seconds: Option<i64>,
    pub visited_at: DateTime<Utc>,
}

impl PageviewInput {
    pub fn into_pageview(self, id: String, now: DateTime<Utc>) -> Result<Pageview> {
        self.validate()?;
        Ok(Pageview {
            id,
            session_id: self.session_id,
            path: self.path,
            title: self.title,
            duration_seconds: self.duration_seconds,
            visited_at: now,
        })
    }
}

/// `track_click` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClickInput {
    #[serde(alias = "productId", alias = "id")]
    #[validate(length(min = 1, max = 64))]
    pub product_id: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub source: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: String,
    pub product_id: String,
    pub source: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClickInput {
    pub fn into_event(self, id: String, meta: RequestMeta, now: DateTime<Utc>) -> Result<ClickEvent> {
        self.validate()?;
        Ok(ClickEvent {
            id,
            product_id: self.product_id.trim().to_string(),
            source: self.source,
            referrer: self.referrer.map(|r| truncate(&r, MAX_URL_LEN)),
            user_agent: meta.user_agent.map(|ua| truncate(&ua, MAX_USER_AGENT_LEN)),
            ip_address: meta.ip_address,
            country: normalize_country(meta.country.as_deref()),
            created_at: now,
        })
    }
}

// === Dashboard ===

/// Visit columns the dashboard groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitDimension {
    Country,
    Browser,
    DeviceType,
}

impl VisitDimension {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Browser => "browser",
            Self::DeviceType => "device_type",
        }
    }

    /// Value of this dimension on a visit; missing countries count as "unknown".
    pub fn value_of<'a>(&self, visit: &'a Visit) -> &'a str {
        match self {
            Self::Country => visit.country.as_deref().unwrap_or("unknown"),
            Self::Browser => &visit.browser,
            Self::DeviceType => &visit.device_type,
        }
    }
}

/// A labelled count (country, browser, device type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: i64,
}

/// Visitors and pageviews on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub visitors: i64,
    pub pageviews: i64,
}

/// Click totals for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductClicks {
    pub id: String,
    pub name: String,
    pub clicks: i64,
}

/// Visitor counts over the standard windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorTotals {
    pub today: i64,
    pub week: i64,
    pub month: i64,
    pub all_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub visitors: VisitorTotals,
    pub unique_sessions_month: i64,
    pub total_pageviews: i64,
    pub total_clicks: i64,
    pub top_countries: Vec<CountEntry>,
    pub top_browsers: Vec<CountEntry>,
    pub devices: Vec<CountEntry>,
    pub daily: Vec<DailyCount>,
    pub top_products: Vec<ProductClicks>,
    pub generated_at: DateTime<Utc>,
}

/// Fill gaps in a daily series so every day in `[from, to]` is present.
pub fn fill_daily_series(from: NaiveDate, to: NaiveDate, rows: &[DailyCount]) -> Vec<DailyCount> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .map(|date| {
            rows.iter()
                .find(|r| r.date == date)
                .cloned()
                .unwrap_or(DailyCount {
                    date,
                    visitors: 0,
                    pageviews: 0,
                })
        })
        .collect()
}
