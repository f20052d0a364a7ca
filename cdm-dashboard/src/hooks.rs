//! Per-account trade and position data.
//!
//! Both loaders share the same rules: account `0` means no account is
//! selected and nothing is fetched; a failed request clears the data; an
//! error status from the service keeps what was loaded before.

use crate::client::TradeService;
use crate::error::ClientError;
use cdm::{Position, Trade};
use log::{debug, error};

fn apply<T>(data: &mut Vec<T>, what: &str, account_id: i64, result: Result<Vec<T>, ClientError>) {
    match result {
        Ok(items) => {
            debug!("Loaded {} {} for account {}", items.len(), what, account_id);
            *data = items;
        }
        Err(e) if e.is_status() => {
            error!("Failed to fetch {} for account {}: {}", what, account_id, e);
        }
        Err(e) => {
            error!("Error fetching {} for account {}: {}", what, account_id, e);
            data.clear();
        }
    }
}

/// Trades of the selected account.
#[derive(Debug, Default)]
pub struct TradesHook {
    data: Vec<Trade>,
}

impl TradesHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, service: &dyn TradeService, account_id: i64) {
        if account_id == 0 {
            debug!("Skipping trades fetch, no account selected");
            return;
        }
        let result = service.trades().await.map(|trades| {
            trades
                .into_iter()
                .filter(|t| t.account_id == account_id)
                .collect()
        });
        apply(&mut self.data, "trades", account_id, result);
    }

    pub fn data(&self) -> &[Trade] {
        &self.data
    }

    pub fn push(&mut self, trade: Trade) {
        self.data.push(trade);
    }
}

/// Positions of the selected account.
#[derive(Debug, Default)]
pub struct PositionsHook {
    data: Vec<Position>,
}

impl PositionsHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, service: &dyn TradeService, account_id: i64) {
        if account_id == 0 {
            debug!("Skipping positions fetch, no account selected");
            return;
        }
        let result = service.positions(account_id).await;
        apply(&mut self.data, "positions", account_id, result);
    }

    pub fn data(&self) -> &[Position] {
        &self.data
    }

    pub fn push(&mut self, position: Position) {
        self.data.push(position);
    }
}
