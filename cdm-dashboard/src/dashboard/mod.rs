//! # CDM Dashboard
//!
//! Owns the selected account, its trades, positions and CDM trades, the
//! pub/sub subscriptions for that account, and the trade selection that
//! gates the update form and the details tab.

mod columns;
mod grid;

pub use columns::{CellRenderer, ColumnDef, ColumnSet, CDM_TRADE_FIELDS, POSITION_FIELDS, TRADE_FIELDS};
pub use grid::render_grid;

use crate::client::TradeService;
use crate::error::{ClientError, Result};
use crate::hooks::{PositionsHook, TradesHook};
use crate::modals::{CreateTradeModal, UpdateTradeModal};
use crate::socket::PubSubTransport;
use crate::viewer::{render_trade_details, CdmViewer, ViewerLayout};
use cdm::{CdmTrade, Position, PubSubMessage, Topic, Trade};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    CdmTrades,
    Trades,
    Positions,
    /// Only reachable with a selected trade.
    Details,
    Viewer,
}

/// What a pub/sub message did to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Trade,
    Position,
    Ignored,
}

pub struct Dashboard {
    service: Arc<dyn TradeService>,
    transport: Box<dyn PubSubTransport>,
    account_id: i64,
    subscriptions: HashSet<Topic>,
    trades: TradesHook,
    positions: PositionsHook,
    cdm_trades: Vec<CdmTrade>,
    selected_trade: Option<CdmTrade>,
    columns: ColumnSet,
    tab: Tab,
    viewer: CdmViewer,
    dismiss_delay: Duration,
}

impl Dashboard {
    pub fn new(service: Arc<dyn TradeService>, transport: Box<dyn PubSubTransport>, dismiss_delay: Duration) -> Self {
        Self {
            service,
            transport,
            account_id: 0,
            subscriptions: HashSet::new(),
            trades: TradesHook::new(),
            positions: PositionsHook::new(),
            cdm_trades: Vec::new(),
            selected_trade: None,
            columns: ColumnSet::default(),
            tab: Tab::default(),
            viewer: CdmViewer::new(ViewerLayout::Full),
            dismiss_delay,
        }
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    pub fn subscriptions(&self) -> &HashSet<Topic> {
        &self.subscriptions
    }

    pub fn trades(&self) -> &[Trade] {
        self.trades.data()
    }

    pub fn positions(&self) -> &[Position] {
        self.positions.data()
    }

    pub fn cdm_trades(&self) -> &[CdmTrade] {
        &self.cdm_trades
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn viewer_mut(&mut self) -> &mut CdmViewer {
        &mut self.viewer
    }

    pub fn selected_trade(&self) -> Option<&CdmTrade> {
        self.selected_trade.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    async fn subscribe(&mut self, topic: Topic) -> Result<()> {
        self.transport
            .send(&PubSubMessage::Subscribe { topic: topic.clone() })
            .await?;
        self.subscriptions.insert(topic);
        Ok(())
    }

    async fn unsubscribe(&mut self, topic: Topic) -> Result<()> {
        self.transport
            .send(&PubSubMessage::Unsubscribe { topic: topic.clone() })
            .await?;
        self.subscriptions.remove(&topic);
        Ok(())
    }

    /// Switches to `account_id`: drops the previous account's topics,
    /// subscribes the new ones and reloads everything.
    pub async fn select_account(&mut self, account_id: i64) -> Result<()> {
        let previous = self.account_id;
        if previous != 0 {
            self.unsubscribe(Topic::trades(previous)).await?;
            self.unsubscribe(Topic::positions(previous)).await?;
        }

        self.account_id = account_id;
        self.selected_trade = None;
        if self.tab == Tab::Details {
            self.tab = Tab::CdmTrades;
        }
        info!("Switched to account {}", account_id);

        if account_id != 0 {
            self.subscribe(Topic::trades(account_id)).await?;
            self.subscribe(Topic::positions(account_id)).await?;
        }
        self.refresh().await;
        Ok(())
    }

    /// Reloads trades, positions, CDM trades and the viewer, then rebuilds
    /// the grid columns.
    pub async fn refresh(&mut self) {
        let service = self.service.clone();
        self.trades.load(service.as_ref(), self.account_id).await;
        self.positions.load(service.as_ref(), self.account_id).await;
        self.fetch_cdm_trades().await;
        self.viewer.refresh(service.as_ref(), self.account_id).await;
        self.columns.rebuild();
    }

    /// Reloads the CDM trades of the selected account. Failures keep the
    /// current list.
    pub async fn fetch_cdm_trades(&mut self) {
        if self.account_id == 0 {
            return;
        }
        match self.service.cdm_trades(self.account_id).await {
            Ok(trades) => {
                if let Some(selected) = &self.selected_trade {
                    self.selected_trade = trades.iter().find(|t| t.id() == selected.id()).cloned();
                }
                self.cdm_trades = trades;
            }
            Err(e) => error!("Error fetching CDM trades: {}", e),
        }
    }

    /// Routes a pub/sub message for the selected account. Trade pushes are
    /// appended and trigger a CDM trade refetch; position pushes are
    /// appended. Anything else is ignored.
    pub async fn handle_message(&mut self, message: PubSubMessage) -> Routed {
        let PubSubMessage::Publish { topic, payload } = message else {
            return Routed::Ignored;
        };
        if self.account_id == 0 {
            return Routed::Ignored;
        }

        if topic == Topic::trades(self.account_id) {
            match serde_json::from_value::<Trade>(payload) {
                Ok(trade) => {
                    debug!("Trade push {} on {}", trade.id, topic);
                    self.trades.push(trade);
                    self.fetch_cdm_trades().await;
                    Routed::Trade
                }
                Err(e) => {
                    warn!("Unreadable trade push on {}: {}", topic, e);
                    Routed::Ignored
                }
            }
        } else if topic == Topic::positions(self.account_id) {
            match serde_json::from_value::<Position>(payload) {
                Ok(position) => {
                    self.positions.push(position);
                    Routed::Position
                }
                Err(e) => {
                    warn!("Unreadable position push on {}: {}", topic, e);
                    Routed::Ignored
                }
            }
        } else {
            Routed::Ignored
        }
    }

    /// Selects a CDM trade row by id. Returns false when no row matches.
    pub fn select_trade(&mut self, trade_id: &str) -> bool {
        self.selected_trade = self.cdm_trades.iter().find(|t| t.id() == trade_id).cloned();
        self.selected_trade.is_some()
    }

    /// Switches tab. The details tab needs a selected trade.
    pub fn set_tab(&mut self, tab: Tab) -> bool {
        if tab == Tab::Details && self.selected_trade.is_none() {
            return false;
        }
        self.tab = tab;
        true
    }

    pub fn create_modal(&self) -> CreateTradeModal {
        CreateTradeModal::new(self.account_id, self.dismiss_delay)
    }

    /// The update form, available once a trade is selected.
    pub fn update_modal(&self) -> Option<UpdateTradeModal> {
        self.selected_trade
            .as_ref()
            .map(|t| UpdateTradeModal::new(t.trade.clone(), self.dismiss_delay))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== CDM Dashboard | account {} ===", self.account_id);
        if let Some(selected) = &self.selected_trade {
            let _ = writeln!(out, "Selected trade: {}", selected.id());
        }
        let body = match self.tab {
            Tab::CdmTrades => render_grid(&self.columns.cdm_trades, &self.cdm_trades),
            Tab::Trades => render_grid(&self.columns.trades, self.trades.data()),
            Tab::Positions => render_grid(&self.columns.positions, self.positions.data()),
            Tab::Details => self
                .selected_trade
                .as_ref()
                .map(render_trade_details)
                .unwrap_or_default(),
            Tab::Viewer => self.viewer.render(),
        };
        out.push_str(&body);
        out
    }

    /// Refreshes every `poll_interval` and applies pub/sub pushes until the
    /// channel closes or `shutdown` resolves.
    pub async fn run<F>(&mut self, poll_interval: Duration, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(poll_interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Dashboard stopping");
                    if let Err(e) = self.transport.close().await {
                        warn!("Pub/sub channel did not close cleanly: {}", e);
                    }
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.refresh().await;
                    println!("{}", self.render());
                }
                message = self.transport.recv() => {
                    match message {
                        Ok(message) => {
                            if self.handle_message(message).await != Routed::Ignored {
                                println!("{}", self.render());
                            }
                        }
                        Err(ClientError::Closed) => {
                            warn!("Pub/sub channel closed");
                            return Err(ClientError::Closed);
                        }
                        Err(e) => {
                            error!("Pub/sub error: {}", e);
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}
