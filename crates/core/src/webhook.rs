//! Affiliate network webhook logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Affiliate networks with a dedicated log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownProvider {
    Impact,
    Cj,
    ShareASale,
    Awin,
    PartnerStack,
}

impl KnownProvider {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "impact" => Some(Self::Impact),
            "cj" | "commissionjunction" => Some(Self::Cj),
            "shareasale" => Some(Self::ShareASale),
            "awin" => Some(Self::Awin),
            "partnerstack" => Some(Self::PartnerStack),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Impact => "Impact",
            Self::Cj => "CJ Affiliate",
            Self::ShareASale => "ShareASale",
            Self::Awin => "Awin",
            Self::PartnerStack => "PartnerStack",
        }
    }
}

/// Request headers kept in the log.
pub const LOGGED_HEADERS: &[&str] = &[
    "content-type",
    "user-agent",
    "x-forwarded-for",
    "x-request-id",
    "x-signature",
    "x-impact-signature",
    "x-partnerstack-signature",
];

/// Validate a provider path segment: 1-64 chars of `[a-z0-9_-]`, lowercased.
pub fn normalize_provider(raw: &str) -> Result<String> {
    let slug = raw.trim().to_ascii_lowercase();
    let valid = !slug.is_empty()
        && slug.len() <= 64
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(Error::validation(format!("invalid provider: {:?}", raw)));
    }
    Ok(slug)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookLog {
    pub id: String,
    pub provider: String,
    pub method: String,
    pub headers: Value,
    pub query: Option<String>,
    /// Parsed JSON body, or the raw body as a string when it is not JSON.
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

/// Interpret a webhook body.
pub fn parse_payload(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
