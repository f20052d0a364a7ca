use super::{Banner, Callback, SubmitOutcome, SubmitState};
use crate::client::{ConvertTradeRequest, TradeService};
use cdm::{Side, Stock, TradeOrder};
use log::{error, info};
use rand::Rng;
use std::time::Duration;

const SUCCESS_TEXT: &str = "CDM Trade Created Successfully!";
const CDM_WARNING: &str = "CDM conversion failed, but trade was created";
const TRADE_FAILURE: &str = "Failed to create trade";
const NO_ACCOUNT_TEXT: &str = "Please select an account first to create trades";

/// Form creating a trade and converting it to CDM.
pub struct CreateTradeModal {
    account_id: i64,
    open: bool,
    stocks: Vec<Stock>,
    security: Option<String>,
    quantity: i64,
    side: Option<Side>,
    state: SubmitState,
    dismiss_delay: Duration,
    on_trade_created: Option<Callback>,
}

impl CreateTradeModal {
    pub fn new(account_id: i64, dismiss_delay: Duration) -> Self {
        Self {
            account_id,
            open: false,
            stocks: Vec::new(),
            security: None,
            quantity: 0,
            side: None,
            state: SubmitState::default(),
            dismiss_delay,
            on_trade_created: None,
        }
    }

    pub fn on_trade_created(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_trade_created = Some(Box::new(callback));
        self
    }

    pub fn set_account(&mut self, account_id: i64) {
        self.account_id = account_id;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the form and loads the tradable securities.
    pub async fn open(&mut self, service: &dyn TradeService) {
        self.open = true;
        self.state.reset();
        match service.stocks().await {
            Ok(stocks) => self.stocks = stocks,
            Err(e) => error!("Failed to load reference data: {}", e),
        }
    }

    /// Closes the form, clearing error and warning text.
    pub fn close(&mut self) {
        self.open = false;
        self.state.clear_messages();
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    pub fn set_security(&mut self, ticker: impl Into<String>) {
        self.security = Some(ticker.into());
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = Some(side);
    }

    pub fn trade_created(&self) -> bool {
        self.state.trade_success
    }

    pub fn can_submit(&self) -> bool {
        self.state.submit_visible()
            && self.account_id != 0
            && self.security.as_deref().is_some_and(|s| !s.is_empty())
            && self.quantity > 0
            && self.side.is_some()
    }

    pub fn banner(&self) -> Option<Banner> {
        if let Some(banner) = self.state.banner(SUCCESS_TEXT) {
            return Some(banner);
        }
        (self.account_id == 0).then(|| Banner::Info(NO_ACCOUNT_TEXT.to_string()))
    }

    /// Creates the trade, then requests its CDM conversion.
    ///
    /// On full success the success banner stays up for the dismiss delay,
    /// then the form resets, closes and notifies the parent.
    pub async fn submit(&mut self, service: &dyn TradeService) -> SubmitOutcome {
        let (Some(security), Some(side)) = (self.security.clone(), self.side) else {
            return SubmitOutcome::Rejected;
        };
        if !self.can_submit() {
            return SubmitOutcome::Rejected;
        }
        self.state.clear_messages();

        let trade_id = format!("TRADE-{}", rand::thread_rng().gen_range(0..1_000_000));
        let order = TradeOrder::new(trade_id.clone(), security, self.quantity, self.account_id, side);

        let created = service.create_trade(&order).await;
        if let Some(outcome) = self.state.trade_leg(created, TRADE_FAILURE) {
            return outcome;
        }

        let request = ConvertTradeRequest {
            trade_id,
            account_id: self.account_id,
        };
        let outcome = self
            .state
            .cdm_leg(service.convert_trade(&request).await, CDM_WARNING);

        if outcome == SubmitOutcome::Completed {
            info!("CDM trade {} created successfully", request.trade_id);
            tokio::time::sleep(self.dismiss_delay).await;
            self.state.reset();
            self.close();
            if let Some(callback) = self.on_trade_created.as_mut() {
                callback();
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTradeService;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn filled(account_id: i64) -> CreateTradeModal {
        let mut modal = CreateTradeModal::new(account_id, Duration::from_millis(1));
        modal.set_security("AAPL");
        modal.set_quantity(100);
        modal.set_side(Side::Buy);
        modal
    }

    #[test]
    fn test_submit_rules() {
        let mut modal = CreateTradeModal::new(123, Duration::ZERO);
        assert!(!modal.can_submit());
        modal.set_security("AAPL");
        modal.set_quantity(0);
        modal.set_side(Side::Sell);
        assert!(!modal.can_submit());
        modal.set_quantity(-3);
        assert!(!modal.can_submit());
        modal.set_quantity(3);
        assert!(modal.can_submit());

        modal.set_account(0);
        assert!(!modal.can_submit());
        assert_eq!(
            modal.banner(),
            Some(Banner::Info("Please select an account first to create trades".into()))
        );
    }

    #[tokio::test]
    async fn test_open_loads_stocks() {
        let service = MockTradeService::new();
        service.set_stocks(vec![Stock::new("AAPL"), Stock::new("MSFT")]);

        let mut modal = CreateTradeModal::new(123, Duration::ZERO);
        modal.open(&service).await;

        assert!(modal.is_open());
        assert_eq!(modal.stocks().len(), 2);
    }

    #[tokio::test]
    async fn test_both_legs_succeed() {
        let service = MockTradeService::new();
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();

        let mut modal = filled(123).on_trade_created(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        modal.open(&service).await;

        assert_eq!(modal.submit(&service).await, SubmitOutcome::Completed);
        assert!(!modal.is_open());
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(modal.banner(), None);

        let created = service.created();
        assert_eq!(created.len(), 1);
        assert!(created[0].id.starts_with("TRADE-"));
        assert_eq!(created[0].account_id, 123);
        assert_eq!(service.converted()[0].trade_id, created[0].id);
        assert_eq!(service.converted()[0].account_id, 123);
    }

    #[tokio::test]
    async fn test_cdm_leg_status_error_warns() {
        let service = MockTradeService::new();
        service.fail_status("convert_trade", 500);

        let mut modal = filled(123);
        modal.open(&service).await;

        assert_eq!(modal.submit(&service).await, SubmitOutcome::CdmFailed);
        assert!(modal.is_open());
        assert!(modal.trade_created());
        assert!(!modal.can_submit());
        assert_eq!(
            modal.banner(),
            Some(Banner::Warning("CDM conversion failed, but trade was created".into()))
        );
    }

    #[tokio::test]
    async fn test_trade_leg_error() {
        let service = MockTradeService::new();
        service.fail_status("create_trade", 400);

        let mut modal = filled(123);
        modal.open(&service).await;

        assert_eq!(
            modal.submit(&service).await,
            SubmitOutcome::Failed("Failed to create trade".into())
        );
        assert!(modal.is_open());
        assert!(!modal.trade_created());
        assert_eq!(service.calls("convert_trade"), 0);
        assert_eq!(modal.banner(), Some(Banner::Error("Failed to create trade".into())));

        modal.close();
        assert_eq!(modal.banner(), None);
    }

    #[tokio::test]
    async fn test_cdm_leg_transport_error_is_an_error() {
        let service = MockTradeService::new();
        service.fail_transport("convert_trade");

        let mut modal = filled(123);
        modal.open(&service).await;

        assert!(matches!(modal.submit(&service).await, SubmitOutcome::Failed(_)));
        assert!(!modal.trade_created());
        assert!(matches!(modal.banner(), Some(Banner::Error(_))));
    }

    #[tokio::test]
    async fn test_resubmit_after_error_shows_cdm_warning() {
        let service = MockTradeService::new();
        service.fail_transport("create_trade");

        let mut modal = filled(123);
        modal.open(&service).await;
        assert!(matches!(modal.submit(&service).await, SubmitOutcome::Failed(_)));
        assert!(matches!(modal.banner(), Some(Banner::Error(_))));

        service.clear_failures();
        service.fail_status("convert_trade", 500);
        assert_eq!(modal.submit(&service).await, SubmitOutcome::CdmFailed);
        assert!(modal.trade_created());
        assert_eq!(
            modal.banner(),
            Some(Banner::Warning("CDM conversion failed, but trade was created".into()))
        );
    }

    #[tokio::test]
    async fn test_incomplete_form_sends_nothing() {
        let service = MockTradeService::new();
        let mut modal = CreateTradeModal::new(123, Duration::ZERO);
        modal.set_security("AAPL");

        assert_eq!(modal.submit(&service).await, SubmitOutcome::Rejected);
        assert_eq!(service.calls("create_trade"), 0);
    }
}
