//! Plain (non-CDM) trades as owned by the trade service.

use super::{null_as_default, opt_string_or_number, string_or_number};
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    #[serde(alias = "BUY", alias = "buy")]
    Buy,
    #[serde(alias = "SELL", alias = "sell")]
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

impl FromStr for Side {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(ModelError::UnknownSide(s.to_string())),
        }
    }
}

/// Lifecycle states selectable in the update form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TradeState {
    #[default]
    New,
    Pending,
    Executed,
    Settled,
    Cancelled,
}

impl TradeState {
    pub const ALL: [TradeState; 5] = [
        TradeState::New,
        TradeState::Pending,
        TradeState::Executed,
        TradeState::Settled,
        TradeState::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeState::New => "New",
            TradeState::Pending => "Pending",
            TradeState::Executed => "Executed",
            TradeState::Settled => "Settled",
            TradeState::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        TradeState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownState(s.to_string()))
    }
}

/// A trade as returned by `GET /trade/trades`.
///
/// `state` stays textual: the service emits states outside [`TradeState`]
/// (e.g. `CDM_PROCESSED`) and those must survive a round trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub security: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub side: Side,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<String>,
}

impl Trade {
    /// Parsed state, if it is one of the known lifecycle states.
    pub fn trade_state(&self) -> Option<TradeState> {
        self.state.parse().ok()
    }
}

/// Body of `POST /trade/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrder {
    pub id: String,
    pub security: String,
    pub quantity: i64,
    pub account_id: i64,
    pub side: Side,
}

impl TradeOrder {
    pub fn new(
        id: impl Into<String>,
        security: impl Into<String>,
        quantity: i64,
        account_id: i64,
        side: Side,
    ) -> Self {
        Self {
            id: id.into(),
            security: security.into(),
            quantity,
            account_id,
            side,
        }
    }
}

/// Body of `PUT /trade/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeUpdate {
    pub id: String,
    pub security: String,
    pub quantity: i64,
    pub side: Side,
    pub state: TradeState,
}
