//! # CDM domain types
//!
//! Shared by the mock demo server and the dashboard client.
//!
//! ## Modules
//! - `model`: trades, positions, CDM trades and the CDM document shapes.
//! - `pubsub`: account topics and the websocket message format.
//! - `validation`: structural checks on CDM trade documents.

pub mod error;
pub mod model;
pub mod pubsub;
pub mod validation;

pub use error::{ModelError, Result};
pub use model::cdm_trade::{BusinessEventType, CdmTrade, CDM_VERSION};
pub use model::format_timestamp;
pub use model::document::{CdmBusinessEvent, CdmDocumentBuilder, CdmTradeDocument};
pub use model::position::Position;
pub use model::reference::Stock;
pub use model::trade::{Side, Trade, TradeOrder, TradeState, TradeUpdate};
pub use pubsub::{PubSubMessage, Topic, TopicKind};
pub use validation::{validate_trade_document, ValidationReport, ValidationStatus};
