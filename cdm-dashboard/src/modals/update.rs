use super::{Banner, Callback, SubmitOutcome, SubmitState};
use crate::client::{TradeService, UpdateCdmTradeRequest};
use cdm::{BusinessEventType, Side, Trade, TradeState, TradeUpdate};
use log::info;
use std::time::Duration;

const SUCCESS_TEXT: &str = "CDM Trade Updated Successfully!";
const CDM_WARNING: &str = "CDM update failed, but trade was updated";
const TRADE_FAILURE: &str = "Failed to update trade";

/// Form updating a trade and recording a CDM business event for it.
pub struct UpdateTradeModal {
    trade: Trade,
    open: bool,
    security: String,
    quantity: i64,
    side: Option<Side>,
    trade_state: TradeState,
    business_event_type: BusinessEventType,
    state: SubmitState,
    dismiss_delay: Duration,
    on_trade_updated: Option<Callback>,
}

impl UpdateTradeModal {
    pub fn new(trade: Trade, dismiss_delay: Duration) -> Self {
        let mut modal = Self {
            trade,
            open: false,
            security: String::new(),
            quantity: 0,
            side: None,
            trade_state: TradeState::New,
            business_event_type: BusinessEventType::Amendment,
            state: SubmitState::default(),
            dismiss_delay,
            on_trade_updated: None,
        };
        modal.load_from_trade();
        modal
    }

    pub fn on_trade_updated(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_trade_updated = Some(Box::new(callback));
        self
    }

    /// Unknown states fall back to `New`.
    fn load_from_trade(&mut self) {
        self.security = self.trade.security.clone();
        self.quantity = self.trade.quantity;
        self.side = Some(self.trade.side);
        self.trade_state = self.trade.trade_state().unwrap_or_default();
    }

    pub fn trade(&self) -> &Trade {
        &self.trade
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the form, initialised from the trade being edited.
    pub fn open(&mut self) {
        self.open = true;
        self.state.reset();
        self.load_from_trade();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.state.clear_messages();
    }

    pub fn security(&self) -> &str {
        &self.security
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn trade_state(&self) -> TradeState {
        self.trade_state
    }

    pub fn business_event_type(&self) -> BusinessEventType {
        self.business_event_type
    }

    pub fn set_security(&mut self, security: impl Into<String>) {
        self.security = security.into();
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = Some(side);
    }

    pub fn set_trade_state(&mut self, state: TradeState) {
        self.trade_state = state;
    }

    pub fn set_business_event_type(&mut self, event_type: BusinessEventType) {
        self.business_event_type = event_type;
    }

    pub fn trade_updated(&self) -> bool {
        self.state.trade_success
    }

    pub fn can_submit(&self) -> bool {
        self.state.submit_visible()
            && !self.security.is_empty()
            && self.quantity > 0
            && self.side.is_some()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.state.banner(SUCCESS_TEXT)
    }

    /// Updates the trade, then records the business event against its CDM
    /// representation.
    pub async fn submit(&mut self, service: &dyn TradeService) -> SubmitOutcome {
        let Some(side) = self.side else {
            return SubmitOutcome::Rejected;
        };
        if !self.can_submit() {
            return SubmitOutcome::Rejected;
        }
        self.state.clear_messages();

        let update = TradeUpdate {
            id: self.trade.id.clone(),
            security: self.security.clone(),
            quantity: self.quantity,
            side,
            state: self.trade_state,
        };
        let updated = service.update_trade(&update).await;
        if let Some(outcome) = self.state.trade_leg(updated, TRADE_FAILURE) {
            return outcome;
        }

        let request = UpdateCdmTradeRequest {
            trade_id: update.id.clone(),
            business_event_type: self.business_event_type,
        };
        let outcome = self
            .state
            .cdm_leg(service.update_cdm_trade(&request).await, CDM_WARNING);

        if outcome == SubmitOutcome::Completed {
            info!(
                "CDM trade {} updated with {}",
                request.trade_id, request.business_event_type
            );
            tokio::time::sleep(self.dismiss_delay).await;
            self.state.reset();
            self.close();
            if let Some(callback) = self.on_trade_updated.as_mut() {
                callback();
            }
        }
        outcome
    }
}
