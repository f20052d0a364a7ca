//! In-memory CDM trade store.
//!
//! Records live for the lifetime of the process. The list is append-only and
//! every record id is unique within it.

use cdm::{CdmDocumentBuilder, CdmTradeDocument, Side, TradeOrder};
use chrono::{SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{PoisonError, RwLock};

pub const DEFAULT_ACCOUNT_ID: i64 = 22214;
pub const DEFAULT_SECURITY: &str = "DEMO";
pub const DEFAULT_SIDE: &str = "Buy";
pub const DEFAULT_QUANTITY: i64 = 100;

const PROCESSED_STATE: &str = "CDM_PROCESSED";
const EXECUTION_EVENT: &str = "EXECUTION";
const NEW_TRADE_QUALIFIER: &str = "NewTrade";

/// Fixed business event envelope stamped on every demo record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessEventEnvelope {
    pub cdm_version: String,
    pub business_event_type: String,
    pub event_qualifier: String,
    pub event_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoTrade {
    pub id: String,
    pub account_id: i64,
    pub security: String,
    pub side: String,
    pub quantity: i64,
    pub state: String,
    pub created: String,
    pub cdm_business_event: BusinessEventEnvelope,
    pub cdm_trade: CdmTradeDocument,
}

/// Caller fields for a new record. Everything is optional and loosely typed;
/// missing, empty, zero or null values fall back to the demo defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDemoTrade {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub account_id: Option<Value>,
    #[serde(default)]
    pub security: Option<Value>,
    #[serde(default)]
    pub side: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl NewDemoTrade {
    /// Parses a request body; anything unreadable becomes an empty request.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                debug!("Unreadable add-trade body, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(Value::String(id.into()));
        self
    }

    pub fn with_security(mut self, security: impl Into<String>) -> Self {
        self.security = Some(Value::String(security.into()));
        self
    }

    pub fn with_side(mut self, side: impl Into<String>) -> Self {
        self.side = Some(Value::String(side.into()));
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(Value::from(quantity));
        self
    }

    pub fn with_account(mut self, account_id: i64) -> Self {
        self.account_id = Some(Value::from(account_id));
        self
    }
}

fn truthy_text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn truthy_integer(value: &Option<Value>) -> Option<i64> {
    let n = match value.as_ref()? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }?;
    (n != 0).then_some(n)
}

#[derive(Default)]
struct StoreInner {
    trades: Vec<DemoTrade>,
    counter: u64,
}

impl StoreInner {
    fn contains(&self, id: &str) -> bool {
        self.trades.iter().any(|t| t.id == id)
    }

    fn next_generated_id(&mut self) -> String {
        loop {
            self.counter += 1;
            let id = format!("CDM-demo-{}", self.counter);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

/// Append-only list of demo CDM trades.
///
/// Constructed once at startup and shared behind an `Arc`.
pub struct CdmStore {
    inner: RwLock<StoreInner>,
    cdm_version: String,
}

impl CdmStore {
    pub fn new(cdm_version: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            cdm_version: cdm_version.into(),
        }
    }

    /// Store holding the two demo records the dashboard expects on first load.
    pub fn with_seed_data(cdm_version: impl Into<String>) -> Self {
        let store = Self::new(cdm_version);
        store.create_trade(
            NewDemoTrade::default()
                .with_id("demo-initial")
                .with_security("AAPL")
                .with_quantity(100)
                .with_side("Buy"),
        );
        store.create_trade(
            NewDemoTrade::default()
                .with_id("demo-sample")
                .with_security("MSFT")
                .with_quantity(200)
                .with_side("Sell"),
        );
        store
    }

    pub fn cdm_version(&self) -> &str {
        &self.cdm_version
    }

    /// Builds a record from `data`, appends it and returns it.
    ///
    /// The caller id becomes `CDM-<id>` unless that id is already taken, in
    /// which case a generated `CDM-demo-<n>` id is used instead.
    pub fn create_trade(&self, data: NewDemoTrade) -> DemoTrade {
        let now = Utc::now();
        let account_id = truthy_integer(&data.account_id).unwrap_or(DEFAULT_ACCOUNT_ID);
        let security = truthy_text(&data.security).unwrap_or_else(|| DEFAULT_SECURITY.to_string());
        let side = truthy_text(&data.side).unwrap_or_else(|| DEFAULT_SIDE.to_string());
        let quantity = truthy_integer(&data.quantity).unwrap_or(DEFAULT_QUANTITY);

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let id = match truthy_text(&data.id).map(|suffix| format!("CDM-{}", suffix)) {
            Some(id) if !inner.contains(&id) => id,
            _ => inner.next_generated_id(),
        };

        let order = TradeOrder::new(
            id.clone(),
            security.clone(),
            quantity,
            account_id,
            side.parse::<Side>().unwrap_or_default(),
        );
        let cdm_trade = CdmDocumentBuilder::new(now.date_naive()).trade_document(&order);

        let trade = DemoTrade {
            id,
            account_id,
            security,
            side,
            quantity,
            state: PROCESSED_STATE.to_string(),
            created: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            cdm_business_event: BusinessEventEnvelope {
                cdm_version: self.cdm_version.clone(),
                business_event_type: EXECUTION_EVENT.to_string(),
                event_qualifier: NEW_TRADE_QUALIFIER.to_string(),
                event_date: now.format("%Y-%m-%d").to_string(),
            },
            cdm_trade,
        };

        inner.trades.push(trade.clone());
        debug!("Stored CDM trade {} ({} total)", trade.id, inner.trades.len());
        trade
    }

    /// Snapshot of every record in insertion order.
    pub fn trades(&self) -> Vec<DemoTrade> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .trades
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .trades
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_data() {
        let store = CdmStore::with_seed_data("6.0.0");
        let trades = store.trades();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].id, "CDM-demo-initial");
        assert_eq!(trades[0].security, "AAPL");
        assert_eq!(trades[1].id, "CDM-demo-sample");
        assert_eq!(trades[1].side, "Sell");
        assert_eq!(trades[1].quantity, 200);
        assert_eq!(trades[1].account_id, DEFAULT_ACCOUNT_ID);
    }

    #[test]
    fn test_defaults_for_empty_request() {
        let store = CdmStore::new("6.0.0");
        let trade = store.create_trade(NewDemoTrade::default());

        assert_eq!(trade.id, "CDM-demo-1");
        assert_eq!(trade.account_id, 22214);
        assert_eq!(trade.security, "DEMO");
        assert_eq!(trade.side, "Buy");
        assert_eq!(trade.quantity, 100);
        assert_eq!(trade.state, "CDM_PROCESSED");
        assert_eq!(trade.cdm_business_event.cdm_version, "6.0.0");
        assert_eq!(trade.cdm_business_event.business_event_type, "EXECUTION");
        assert_eq!(trade.cdm_business_event.event_qualifier, "NewTrade");
        assert_eq!(trade.cdm_business_event.event_date.len(), 10);
        assert!(trade.created.ends_with('Z'));
    }

    #[test]
    fn test_falsy_values_take_defaults() {
        let request = NewDemoTrade::from_body(
            json!({"id": "", "quantity": 0, "security": "", "accountId": null, "side": false})
                .to_string()
                .as_bytes(),
        );
        let trade = CdmStore::new("6.0.0").create_trade(request);
        assert_eq!(trade.quantity, 100);
        assert_eq!(trade.security, "DEMO");
        assert_eq!(trade.account_id, 22214);
        assert_eq!(trade.side, "Buy");
    }

    #[test]
    fn test_no_validation_of_side_or_sign() {
        let store = CdmStore::new("6.0.0");
        let trade = store.create_trade(NewDemoTrade::default().with_side("Hold").with_quantity(-5));
        assert_eq!(trade.side, "Hold");
        assert_eq!(trade.quantity, -5);
    }

    #[test]
    fn test_numeric_id_and_account() {
        let request = NewDemoTrade::from_body(br#"{"id": 77, "accountId": "123", "quantity": 12.9}"#);
        let trade = CdmStore::new("6.0.0").create_trade(request);
        assert_eq!(trade.id, "CDM-77");
        assert_eq!(trade.account_id, 123);
        assert_eq!(trade.quantity, 12);
    }

    #[test]
    fn test_malformed_body_is_defaulted() {
        let store = CdmStore::new("6.0.0");
        let trade = store.create_trade(NewDemoTrade::from_body(b"not json at all"));
        assert_eq!(trade.security, "DEMO");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_stay_unique() {
        let store = CdmStore::new("6.0.0");
        let first = store.create_trade(NewDemoTrade::default().with_id("X"));
        let second = store.create_trade(NewDemoTrade::default().with_id("X"));
        // A caller id shaped like a generated one must not collide either.
        let third = store.create_trade(NewDemoTrade::default().with_id("demo-2"));
        let fourth = store.create_trade(NewDemoTrade::default());

        assert_eq!(first.id, "CDM-X");
        assert_eq!(second.id, "CDM-demo-1");
        assert_eq!(third.id, "CDM-demo-2");
        assert_eq!(fourth.id, "CDM-demo-3");
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_cdm_document_follows_record() {
        let store = CdmStore::new("6.0.0");
        let trade = store.create_trade(
            NewDemoTrade::default()
                .with_security("IBM")
                .with_quantity(30)
                .with_account(9),
        );
        assert_eq!(trade.cdm_trade.trade_id(), Some(trade.id.as_str()));
        assert_eq!(trade.cdm_trade.security(), Some("IBM"));
        assert_eq!(trade.cdm_trade.total_quantity(), 30.0);
        assert_eq!(trade.cdm_trade.counterparty[0].party_reference.value, "ACCOUNT-9");
    }
}
