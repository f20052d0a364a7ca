//! CDM trade views.
//!
//! [`CdmViewer`] lists an account's CDM trades with a per-trade JSON toggle.
//! Open toggles are keyed by trade id and owned by the viewer, so they survive
//! refreshes.

mod details;

pub use details::{render_trade_details, validation_report};

use crate::client::{CdmServiceStatus, TradeService};
use cdm::CdmTrade;
use log::error;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write;

const LOAD_ERROR: &str = "Failed to load CDM data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerLayout {
    /// Status header, full trade cards, JSON for every expanded trade.
    #[default]
    Full,
    /// Small panel. Shows an error line when loading fails and offers the
    /// JSON toggle only for trades carrying a CDM document.
    Compact,
}

#[derive(Debug, Default)]
pub struct CdmViewer {
    layout: ViewerLayout,
    account_id: i64,
    status: Option<CdmServiceStatus>,
    trades: Vec<CdmTrade>,
    expanded: HashSet<String>,
    error: Option<String>,
}

impl CdmViewer {
    pub fn new(layout: ViewerLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn trades(&self) -> &[CdmTrade] {
        &self.trades
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reloads status and trades for `account_id`. Expansion state is kept
    /// for trades still listed.
    pub async fn refresh(&mut self, service: &dyn TradeService, account_id: i64) {
        self.account_id = account_id;
        if account_id == 0 {
            return;
        }
        self.error = None;

        match service.cdm_status().await {
            Ok(status) => self.status = Some(status),
            Err(e) => {
                error!("Error fetching CDM status: {}", e);
                self.fail();
            }
        }
        match service.cdm_trades(account_id).await {
            Ok(trades) => {
                self.expanded.retain(|id| trades.iter().any(|t| t.id() == id));
                self.trades = trades;
            }
            Err(e) => {
                error!("Error fetching CDM trades for account {}: {}", account_id, e);
                self.fail();
                if self.layout == ViewerLayout::Compact {
                    self.trades.clear();
                }
            }
        }
    }

    fn fail(&mut self) {
        if self.layout == ViewerLayout::Compact {
            self.error = Some(LOAD_ERROR.to_string());
        }
    }

    /// Flips the JSON toggle of `trade_id`, returning the new state.
    pub fn toggle(&mut self, trade_id: &str) -> bool {
        if self.expanded.remove(trade_id) {
            false
        } else {
            self.expanded.insert(trade_id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, trade_id: &str) -> bool {
        self.expanded.contains(trade_id)
    }

    /// Whether the JSON toggle is offered for `trade`.
    pub fn has_toggle(&self, trade: &CdmTrade) -> bool {
        match self.layout {
            ViewerLayout::Full => true,
            ViewerLayout::Compact => trade.cdm_trade.is_some(),
        }
    }

    fn trade_json(trade: &CdmTrade) -> String {
        let document = match trade.trade_document() {
            Some(Ok(document)) => document,
            Some(Err(e)) => return format!("Unreadable CDM trade: {}", e),
            None => Value::Object(Default::default()),
        };
        serde_json::to_string_pretty(&document).unwrap_or_default()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "FINOS CDM Integration");

        if self.account_id == 0 {
            let _ = writeln!(out, "Select an account to view CDM-converted trades");
            return out;
        }

        if let Some(status) = &self.status {
            let _ = writeln!(
                out,
                "[{}] CDM Version: {}  Total CDM Trades: {}",
                status.status.as_deref().unwrap_or("UNKNOWN"),
                status.cdm_version.as_deref().unwrap_or("N/A"),
                status.stored_trades()
            );
        }
        let _ = writeln!(out, "CDM Trades for Account {}:", self.account_id);

        if let Some(error) = &self.error {
            let _ = writeln!(out, "{}", error);
            return out;
        }
        if self.trades.is_empty() {
            let text = match self.layout {
                ViewerLayout::Full => "No CDM trades found for this account. Create a trade to see CDM conversion!",
                ViewerLayout::Compact => "No CDM trades found. Create a trade to see CDM conversion!",
            };
            let _ = writeln!(out, "{}", text);
            return out;
        }

        for trade in &self.trades {
            let security = if trade.trade.security.is_empty() {
                "N/A"
            } else {
                trade.trade.security.as_str()
            };
            let _ = writeln!(
                out,
                "- {} - {} shares ({})  [CDM {}]",
                security,
                trade.trade.quantity,
                trade.trade.side,
                if trade.cdm_version.is_empty() { cdm::CDM_VERSION } else { trade.cdm_version.as_str() }
            );
            let _ = writeln!(out, "  CDM ID: {}", trade.id());
            if self.layout == ViewerLayout::Full {
                let _ = writeln!(out, "  Event: {}  State: {}", trade.business_event_type, trade.trade.state);
            }
            if !self.has_toggle(trade) {
                continue;
            }
            if self.is_expanded(trade.id()) {
                let _ = writeln!(out, "  v CDM JSON");
                for line in Self::trade_json(trade).lines() {
                    let _ = writeln!(out, "    {}", line);
                }
            } else {
                let _ = writeln!(out, "  > View CDM JSON");
            }
        }
        out
    }
}
