pub mod cdm_trade;
pub mod document;
pub mod position;
pub mod reference;
pub mod trade;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON string or number and keeps it as text.
///
/// The trade service is not consistent about identifier and timestamp types
/// (Java `Date` fields come back as epoch millis, ids may be numeric).
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Reads an explicit `null` as the type's default, like a missing key.
///
/// The trade service stores nullable columns and serializes them as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Renders a raw `updated` value for display.
///
/// Epoch millis are converted to RFC 3339; anything else is returned as-is.
pub fn format_timestamp(raw: &str) -> String {
    match raw.parse::<i64>() {
        Ok(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}
