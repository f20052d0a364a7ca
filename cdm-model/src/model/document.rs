//! CDM document shapes and the builder turning a trade into them.
//!
//! Only the subset of the CDM event model the dashboard displays is typed
//! here; anything else a service sends is carried as raw JSON by
//! [`CdmTrade`](super::cdm_trade::CdmTrade).

use super::cdm_trade::{BusinessEventType, CDM_VERSION};
use super::trade::{Side, TradeOrder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Counterparty reference used for the house side of every trade.
pub const HOUSE_PARTY: &str = "TraderX";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub identifier: IdentifierValue,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            identifier: IdentifierValue {
                value: value.into(),
            },
        }
    }

    pub fn value(&self) -> &str {
        &self.identifier.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWithValue<T> {
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub identifier: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub security: Security,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradableProduct {
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterparty {
    pub role: String,
    pub party_reference: FieldWithValue<String>,
}

/// `after.trade` of an execution primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdmTradeDocument {
    pub trade_identifier: Vec<Identifier>,
    pub trade_date: FieldWithValue<String>,
    pub tradable_product: TradableProduct,
    pub quantity: Vec<FieldWithValue<f64>>,
    pub counterparty: Vec<Counterparty>,
}

impl CdmTradeDocument {
    pub fn trade_id(&self) -> Option<&str> {
        self.trade_identifier.first().map(Identifier::value)
    }

    pub fn security(&self) -> Option<&str> {
        self.tradable_product
            .product
            .security
            .identifier
            .first()
            .map(Identifier::value)
    }

    pub fn total_quantity(&self) -> f64 {
        self.quantity.iter().map(|q| q.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfterState {
    pub trade: CdmTradeDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPrimitive {
    pub after: AfterState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitives {
    pub execution: Vec<ExecutionPrimitive>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdmBusinessEvent {
    pub event_identifier: Vec<Identifier>,
    pub event_date: String,
    pub effective_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_qualifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdm_version: Option<String>,
    pub primitives: Primitives,
}

impl CdmBusinessEvent {
    /// Trade states produced by this event.
    pub fn trades(&self) -> impl Iterator<Item = &CdmTradeDocument> {
        self.primitives.execution.iter().map(|e| &e.after.trade)
    }
}

/// Builds CDM documents for trades entering the system.
///
/// # Examples
///
/// ```
/// use cdm::{CdmDocumentBuilder, Side, TradeOrder};
/// use chrono::NaiveDate;
///
/// let order = TradeOrder::new("TRADE-1", "AAPL", 100, 22214, Side::Buy);
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let event = CdmDocumentBuilder::new(date).execution(&order);
/// assert_eq!(event.event_qualifier.as_deref(), Some("NewTrade"));
/// ```
#[derive(Debug, Clone)]
pub struct CdmDocumentBuilder {
    trade_date: NaiveDate,
}

impl CdmDocumentBuilder {
    pub fn new(trade_date: NaiveDate) -> Self {
        Self { trade_date }
    }

    pub fn today() -> Self {
        Self::new(chrono::Utc::now().date_naive())
    }

    pub fn trade_document(&self, order: &TradeOrder) -> CdmTradeDocument {
        let (account_role, house_role) = match order.side {
            Side::Buy => ("Party1", "Party2"),
            Side::Sell => ("Party2", "Party1"),
        };

        CdmTradeDocument {
            trade_identifier: vec![Identifier::new(order.id.clone())],
            trade_date: FieldWithValue {
                value: self.trade_date.format("%Y-%m-%d").to_string(),
            },
            tradable_product: TradableProduct {
                product: Product {
                    security: Security {
                        identifier: vec![Identifier::new(order.security.clone())],
                    },
                },
            },
            quantity: vec![FieldWithValue {
                value: order.quantity as f64,
            }],
            counterparty: vec![
                Counterparty {
                    role: account_role.to_string(),
                    party_reference: FieldWithValue {
                        value: format!("ACCOUNT-{}", order.account_id),
                    },
                },
                Counterparty {
                    role: house_role.to_string(),
                    party_reference: FieldWithValue {
                        value: HOUSE_PARTY.to_string(),
                    },
                },
            ],
        }
    }

    /// Business event for a newly executed trade.
    pub fn execution(&self, order: &TradeOrder) -> CdmBusinessEvent {
        self.event(order, BusinessEventType::Execution)
    }

    /// Business event of the given type applied to `order`.
    pub fn event(&self, order: &TradeOrder, event_type: BusinessEventType) -> CdmBusinessEvent {
        let date = self.trade_date.format("%Y-%m-%d").to_string();
        CdmBusinessEvent {
            event_identifier: vec![Identifier::new(format!("EVENT-{}", order.id))],
            event_date: date.clone(),
            effective_date: date,
            event_qualifier: Some(event_type.qualifier().to_string()),
            cdm_version: Some(CDM_VERSION.to_string()),
            primitives: Primitives {
                execution: vec![ExecutionPrimitive {
                    after: AfterState {
                        trade: self.trade_document(order),
                    },
                }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> CdmDocumentBuilder {
        CdmDocumentBuilder::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    #[test]
    fn test_execution_event_shape() {
        let order = TradeOrder::new("TRADE-9", "AAPL", 100, 123, Side::Buy);
        let event = builder().execution(&order);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["eventIdentifier"][0]["identifier"]["value"], "EVENT-TRADE-9");
        assert_eq!(value["eventDate"], "2024-03-01");
        assert_eq!(value["effectiveDate"], "2024-03-01");
        assert_eq!(value["eventQualifier"], "NewTrade");

        let trade = &value["primitives"]["execution"][0]["after"]["trade"];
        assert_eq!(trade["tradeDate"], json!({"value": "2024-03-01"}));
        assert_eq!(
            trade["tradableProduct"]["product"]["security"]["identifier"][0]["identifier"]["value"],
            "AAPL"
        );
        assert_eq!(trade["quantity"][0]["value"], 100.0);
        assert_eq!(
            trade["counterparty"][0],
            json!({"role": "Party1", "partyReference": {"value": "ACCOUNT-123"}})
        );
    }

    #[test]
    fn test_sell_swaps_counterparty_roles() {
        let order = TradeOrder::new("TRADE-2", "MSFT", 5, 7, Side::Sell);
        let doc = builder().trade_document(&order);
        assert_eq!(doc.counterparty[0].role, "Party2");
        assert_eq!(doc.counterparty[1].role, "Party1");
        assert_eq!(doc.counterparty[1].party_reference.value, HOUSE_PARTY);
    }

    #[test]
    fn test_amendment_qualifier_and_accessors() {
        let order = TradeOrder::new("TRADE-3", "IBM", 40, 1, Side::Buy);
        let event = builder().event(&order, BusinessEventType::Amendment);
        assert_eq!(event.event_qualifier.as_deref(), Some("Amendment"));

        let parsed: CdmBusinessEvent =
            serde_json::from_value(serde_json::to_value(&event).unwrap()).unwrap();
        let trade = parsed.trades().next().unwrap();
        assert_eq!(trade.trade_id(), Some("TRADE-3"));
        assert_eq!(trade.security(), Some("IBM"));
        assert_eq!(trade.total_quantity(), 40.0);
    }
}
