//! In-memory [`TradeService`] for tests.

use crate::client::{CdmServiceStatus, ConvertTradeRequest, TradeService, UpdateCdmTradeRequest};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use cdm::{CdmTrade, Position, Stock, Trade, TradeOrder, TradeUpdate};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy)]
enum Failure {
    Status(u16),
    Transport,
}

#[derive(Default)]
struct MockState {
    trades: Vec<Trade>,
    positions: Vec<Position>,
    cdm_trades: Vec<CdmTrade>,
    stocks: Vec<Stock>,
    status: CdmServiceStatus,
    failures: HashMap<&'static str, Failure>,
    calls: HashMap<&'static str, usize>,
    created: Vec<TradeOrder>,
    updated: Vec<TradeUpdate>,
    converted: Vec<ConvertTradeRequest>,
    cdm_updates: Vec<UpdateCdmTradeRequest>,
}

/// Canned responses keyed by operation name (`"trades"`, `"positions"`,
/// `"create_trade"`, `"update_trade"`, `"convert_trade"`,
/// `"update_cdm_trade"`, `"cdm_trades"`, `"cdm_status"`, `"stocks"`).
#[derive(Default)]
pub struct MockTradeService {
    state: Mutex<MockState>,
}

impl MockTradeService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_trades(&self, trades: Vec<Trade>) {
        self.state().trades = trades;
    }

    pub fn set_positions(&self, positions: Vec<Position>) {
        self.state().positions = positions;
    }

    pub fn set_cdm_trades(&self, trades: Vec<CdmTrade>) {
        self.state().cdm_trades = trades;
    }

    pub fn set_stocks(&self, stocks: Vec<Stock>) {
        self.state().stocks = stocks;
    }

    pub fn set_status(&self, status: CdmServiceStatus) {
        self.state().status = status;
    }

    /// Makes `operation` answer with an error status.
    pub fn fail_status(&self, operation: &'static str, status: u16) {
        self.state().failures.insert(operation, Failure::Status(status));
    }

    /// Makes `operation` fail before any response is received.
    pub fn fail_transport(&self, operation: &'static str) {
        self.state().failures.insert(operation, Failure::Transport);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn created(&self) -> Vec<TradeOrder> {
        self.state().created.clone()
    }

    pub fn updated(&self) -> Vec<TradeUpdate> {
        self.state().updated.clone()
    }

    pub fn converted(&self) -> Vec<ConvertTradeRequest> {
        self.state().converted.clone()
    }

    pub fn cdm_updates(&self) -> Vec<UpdateCdmTradeRequest> {
        self.state().cdm_updates.clone()
    }

    /// Counts the call and returns the configured failure, if any.
    async fn enter(&self, operation: &'static str) -> Result<()> {
        let failure = {
            let mut state = self.state();
            *state.calls.entry(operation).or_default() += 1;
            state.failures.get(operation).copied()
        };
        match failure {
            None => Ok(()),
            Some(Failure::Status(status)) => Err(ClientError::Status {
                status,
                url: format!("mock://{}", operation),
            }),
            Some(Failure::Transport) => Err(transport_error().await),
        }
    }
}

/// A genuine request error, produced without touching the network.
async fn transport_error() -> ClientError {
    match reqwest::Client::new().get("not a url").send().await {
        Err(e) => ClientError::Transport(e),
        Ok(_) => ClientError::Closed,
    }
}

#[async_trait]
impl TradeService for MockTradeService {
    async fn trades(&self) -> Result<Vec<Trade>> {
        self.enter("trades").await?;
        Ok(self.state().trades.clone())
    }

    async fn positions(&self, account_id: i64) -> Result<Vec<Position>> {
        self.enter("positions").await?;
        Ok(self
            .state()
            .positions
            .iter()
            .filter(|p| p.account_id.map_or(true, |id| id == account_id))
            .cloned()
            .collect())
    }

    async fn create_trade(&self, order: &TradeOrder) -> Result<()> {
        self.enter("create_trade").await?;
        self.state().created.push(order.clone());
        Ok(())
    }

    async fn update_trade(&self, update: &TradeUpdate) -> Result<()> {
        self.enter("update_trade").await?;
        self.state().updated.push(update.clone());
        Ok(())
    }

    async fn convert_trade(&self, request: &ConvertTradeRequest) -> Result<()> {
        self.enter("convert_trade").await?;
        self.state().converted.push(request.clone());
        Ok(())
    }

    async fn update_cdm_trade(&self, request: &UpdateCdmTradeRequest) -> Result<()> {
        self.enter("update_cdm_trade").await?;
        self.state().cdm_updates.push(request.clone());
        Ok(())
    }

    async fn cdm_trades(&self, account_id: i64) -> Result<Vec<CdmTrade>> {
        self.enter("cdm_trades").await?;
        Ok(self
            .state()
            .cdm_trades
            .iter()
            .filter(|t| t.trade.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn cdm_status(&self) -> Result<CdmServiceStatus> {
        self.enter("cdm_status").await?;
        Ok(self.state().status.clone())
    }

    async fn stocks(&self) -> Result<Vec<Stock>> {
        self.enter("stocks").await?;
        Ok(self.state().stocks.clone())
    }
}
