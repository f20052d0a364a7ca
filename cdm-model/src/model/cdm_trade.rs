//! Trades carrying their CDM representation.

use super::null_as_default;
use super::trade::Trade;
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// CDM release the demo stack speaks.
pub const CDM_VERSION: &str = "6.0.0";

/// Lifecycle action wrapped in a CDM business event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BusinessEventType {
    /// Emitted on creation only; not offered by the update form.
    #[serde(rename = "EXECUTION", alias = "Execution")]
    Execution,
    #[default]
    Amendment,
    Cancellation,
    Correction,
    PartialTermination,
    FullTermination,
}

impl BusinessEventType {
    /// Choices offered when updating an existing trade.
    pub const UPDATE_CHOICES: [BusinessEventType; 5] = [
        BusinessEventType::Amendment,
        BusinessEventType::Cancellation,
        BusinessEventType::Correction,
        BusinessEventType::PartialTermination,
        BusinessEventType::FullTermination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessEventType::Execution => "EXECUTION",
            BusinessEventType::Amendment => "Amendment",
            BusinessEventType::Cancellation => "Cancellation",
            BusinessEventType::Correction => "Correction",
            BusinessEventType::PartialTermination => "PartialTermination",
            BusinessEventType::FullTermination => "FullTermination",
        }
    }

    /// CDM event qualifier recorded on the business event.
    pub fn qualifier(&self) -> &'static str {
        match self {
            BusinessEventType::Execution => "NewTrade",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for BusinessEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessEventType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("execution") {
            return Ok(BusinessEventType::Execution);
        }
        BusinessEventType::UPDATE_CHOICES
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownBusinessEvent(s.to_string()))
    }
}

/// A trade as returned by `GET /cdm/trades/{accountId}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdmTrade {
    #[serde(flatten)]
    pub trade: Trade,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cdm_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdm_business_event: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdm_trade: Option<Value>,
}

impl CdmTrade {
    pub fn id(&self) -> &str {
        &self.trade.id
    }

    pub fn event_type(&self) -> Option<BusinessEventType> {
        self.business_event_type.parse().ok()
    }

    /// The business event as a JSON tree, decoding string-encoded payloads.
    pub fn business_event_document(&self) -> Option<Result<Value>> {
        self.cdm_business_event.as_ref().map(decode_nested)
    }

    /// The CDM trade as a JSON tree, decoding string-encoded payloads.
    pub fn trade_document(&self) -> Option<Result<Value>> {
        self.cdm_trade.as_ref().map(decode_nested)
    }
}

/// Nested CDM payloads are stored as text by some services and as objects by
/// others.
pub fn decode_nested(value: &Value) -> Result<Value> {
    match value {
        Value::String(text) if text.trim().is_empty() => Ok(Value::Object(Default::default())),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|e| ModelError::InvalidDocument(e.to_string()))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cdm_trade_flattens_trade_fields() {
        let trade: CdmTrade = serde_json::from_value(json!({
            "id": "TRADE-7",
            "security": "MSFT",
            "quantity": 50,
            "side": "Buy",
            "state": "CDM_UPDATED",
            "updated": "2024-01-02T03:04:05Z",
            "cdmVersion": "6.0.0",
            "businessEventType": "Execution",
            "cdmTrade": "{\"tradeIdentifier\": []}"
        }))
        .unwrap();

        assert_eq!(trade.id(), "TRADE-7");
        assert_eq!(trade.trade.quantity, 50);
        assert_eq!(trade.event_type(), Some(BusinessEventType::Execution));
        assert_eq!(
            trade.trade_document().unwrap().unwrap(),
            json!({"tradeIdentifier": []})
        );
        assert!(trade.business_event_document().is_none());
    }

    #[test]
    fn test_decode_nested_rejects_garbage_text() {
        let err = decode_nested(&json!("{not json")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidDocument(_)));
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(
            serde_json::to_value(BusinessEventType::Execution).unwrap(),
            json!("EXECUTION")
        );
        assert_eq!(
            "PartialTermination".parse::<BusinessEventType>().unwrap(),
            BusinessEventType::PartialTermination
        );
        assert_eq!(BusinessEventType::Execution.qualifier(), "NewTrade");
        assert_eq!(BusinessEventType::Correction.qualifier(), "Correction");
        assert!(!BusinessEventType::UPDATE_CHOICES.contains(&BusinessEventType::Execution));
    }
}
