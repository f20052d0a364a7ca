//! Trade service client.
//!
//! [`TradeService`] is the seam between the dashboard and the HTTP services;
//! [`HttpTradeService`] talks to the real trade and reference data services.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use cdm::{BusinessEventType, CdmTrade, Position, Stock, Trade, TradeOrder, TradeUpdate};
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /cdm/status` as reported by the trade service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdmServiceStatus {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cdm_version: Option<String>,
    #[serde(default)]
    pub cdm_enabled: bool,
    /// A count, or an error text when the service could not read its store.
    #[serde(default)]
    pub cdm_trades_stored: Option<Value>,
}

impl CdmServiceStatus {
    pub fn stored_trades(&self) -> i64 {
        self.cdm_trades_stored
            .as_ref()
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }
}

/// Body of `POST /cdm/convert-trade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertTradeRequest {
    pub trade_id: String,
    pub account_id: i64,
}

/// Body of `PUT /cdm/update-trade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCdmTradeRequest {
    pub trade_id: String,
    pub business_event_type: BusinessEventType,
}

/// Lists come back either bare or wrapped as `{"trades": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { trades: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { trades: items } => items,
        }
    }
}

#[async_trait]
pub trait TradeService: Send + Sync {
    /// Every trade known to the service, all accounts.
    async fn trades(&self) -> Result<Vec<Trade>>;

    async fn positions(&self, account_id: i64) -> Result<Vec<Position>>;

    async fn create_trade(&self, order: &TradeOrder) -> Result<()>;

    async fn update_trade(&self, update: &TradeUpdate) -> Result<()>;

    /// Asks the service to build the CDM representation of a stored trade.
    async fn convert_trade(&self, request: &ConvertTradeRequest) -> Result<()>;

    /// Records a new business event against a CDM trade.
    async fn update_cdm_trade(&self, request: &UpdateCdmTradeRequest) -> Result<()>;

    async fn cdm_trades(&self, account_id: i64) -> Result<Vec<CdmTrade>>;

    async fn cdm_status(&self) -> Result<CdmServiceStatus>;

    /// Reference data.
    async fn stocks(&self) -> Result<Vec<Stock>>;
}

pub struct HttpTradeService {
    http: Client,
    trade_service_url: String,
    reference_data_url: String,
}

impl HttpTradeService {
    pub fn new(trade_service_url: impl Into<String>, reference_data_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            trade_service_url: trim_base(trade_service_url.into()),
            reference_data_url: trim_base(reference_data_url.into()),
        }
    }

    fn trade_url(&self, path: &str) -> String {
        format!("{}{}", self.trade_service_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!("GET {}", url);
        let response = check(self.http.get(&url).send().await?, &url)?;
        Ok(response.json().await?)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn check(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl TradeService for HttpTradeService {
    async fn trades(&self) -> Result<Vec<Trade>> {
        let listing: Listing<Trade> = self.get_json(self.trade_url("/trade/trades")).await?;
        Ok(listing.into_vec())
    }

    async fn positions(&self, account_id: i64) -> Result<Vec<Position>> {
        self.get_json(self.trade_url(&format!("/trade/positions/{}", account_id)))
            .await
    }

    async fn create_trade(&self, order: &TradeOrder) -> Result<()> {
        let url = self.trade_url("/trade/");
        debug!("POST {} ({})", url, order.id);
        check(self.http.post(&url).json(order).send().await?, &url)?;
        Ok(())
    }

    async fn update_trade(&self, update: &TradeUpdate) -> Result<()> {
        let url = self.trade_url(&format!("/trade/{}", update.id));
        debug!("PUT {}", url);
        check(self.http.put(&url).json(update).send().await?, &url)?;
        Ok(())
    }

    async fn convert_trade(&self, request: &ConvertTradeRequest) -> Result<()> {
        let url = self.trade_url("/cdm/convert-trade");
        debug!("POST {} ({})", url, request.trade_id);
        check(self.http.post(&url).json(request).send().await?, &url)?;
        Ok(())
    }

    async fn update_cdm_trade(&self, request: &UpdateCdmTradeRequest) -> Result<()> {
        let url = self.trade_url("/cdm/update-trade");
        debug!("PUT {} ({} {})", url, request.trade_id, request.business_event_type);
        check(self.http.put(&url).json(request).send().await?, &url)?;
        Ok(())
    }

    async fn cdm_trades(&self, account_id: i64) -> Result<Vec<CdmTrade>> {
        let listing: Listing<CdmTrade> = self
            .get_json(self.trade_url(&format!("/cdm/trades/{}", account_id)))
            .await?;
        Ok(listing.into_vec())
    }

    async fn cdm_status(&self) -> Result<CdmServiceStatus> {
        self.get_json(self.trade_url("/cdm/status")).await
    }

    async fn stocks(&self) -> Result<Vec<Stock>> {
        self.get_json(format!("{}/stocks", self.reference_data_url))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_accepts_both_shapes() {
        let bare: Listing<Trade> =
            serde_json::from_value(json!([{"id": 1, "security": "IBM"}])).unwrap();
        let wrapped: Listing<Trade> =
            serde_json::from_value(json!({"trades": [{"id": "T2"}], "success": true})).unwrap();

        assert_eq!(bare.into_vec()[0].id, "1");
        assert_eq!(wrapped.into_vec()[0].id, "T2");
    }

    #[test]
    fn test_listing_survives_null_columns() {
        let listing: Listing<Trade> = serde_json::from_value(json!({"trades": [
            {"id": 1, "security": "IBM", "quantity": 10, "side": "Buy", "accountId": 22214},
            {"id": 2, "security": "MSFT", "quantity": null, "side": "Sell", "accountId": null}
        ]}))
        .unwrap();

        let trades = listing.into_vec();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[1].quantity, 0);
        assert_eq!(trades[1].account_id, 0);

        let cdm: Listing<CdmTrade> = serde_json::from_value(json!([
            {"id": "CDM-1", "quantity": null, "accountId": null, "cdmVersion": null}
        ]))
        .unwrap();
        assert_eq!(cdm.into_vec()[0].cdm_version, "");
    }

    #[test]
    fn test_cdm_status_with_error_count() {
        let status: CdmServiceStatus = serde_json::from_value(json!({
            "status": "ACTIVE",
            "cdmEnabled": true,
            "cdmVersion": "6.0.0",
            "cdmTradesStored": "Error: no table"
        }))
        .unwrap();
        assert_eq!(status.stored_trades(), 0);
        assert!(status.cdm_enabled);
    }

    #[test]
    fn test_request_bodies() {
        let request = UpdateCdmTradeRequest {
            trade_id: "TRADE-1".into(),
            business_event_type: BusinessEventType::Amendment,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"tradeId": "TRADE-1", "businessEventType": "Amendment"})
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let service = HttpTradeService::new("http://host:1/", "http://ref:2/");
        assert_eq!(service.trade_url("/trade/"), "http://host:1/trade/");
        assert_eq!(service.reference_data_url, "http://ref:2");
    }
}
