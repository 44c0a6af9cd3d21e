//! Lenient field decoding for admin and public form payloads.
//!
//! Form clients send numbers as strings ("4.99"), flags as 0/1 and feature
//! lists either as arrays or as JSON-encoded text. These helpers accept all
//! of those shapes and normalize them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an optional float from a number, a numeric string, or null/"".
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    value_to_f64(value.as_ref()).map_err(serde::de::Error::custom)
}

/// Decode an optional integer from a number, a numeric string, or null/"".
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value_to_f64(value.as_ref()).map_err(serde::de::Error::custom)? {
        Some(n) if n.fract() == 0.0 => Ok(Some(n as i64)),
        Some(n) => Err(serde::de::Error::custom(format!("expected an integer, got {}", n))),
        None => Ok(None),
    }
}

/// Decode an optional flag from a bool, 0/1, or "true"/"false"/"1"/"0".
pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().unwrap_or(0.0) != 0.0)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!("invalid flag: {}", other))),
        },
        Some(other) => Err(serde::de::Error::custom(format!("invalid flag: {}", other))),
    }
}

/// Decode an optional feature list from an array, JSON text, or a newline list.
pub fn opt_features<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.iter().filter_map(feature_item).collect())),
        Some(Value::String(text)) => Ok(Some(parse_features_text(&text))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "features must be an array or text, got {}",
            other
        ))),
    }
}

fn value_to_f64(value: Option<&Value>) -> Result<Option<f64>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("not a number: {}", trimmed))
        }
        Some(other) => Err(format!("not a number: {}", other)),
    }
}

fn feature_item(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a stored `features` column.
///
/// The column holds a JSON array serialized to text; older rows hold a plain
/// newline-separated list.
pub fn parse_features_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
        return items.iter().filter_map(feature_item).collect();
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serialize a feature list for the `features` text column.
pub fn features_to_text(features: &[String]) -> String {
    serde_json::to_string(features).unwrap_or_else(|_| "[]".to_string())
}
