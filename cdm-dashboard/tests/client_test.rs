use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cdm::{BusinessEventType, Side, TradeOrder, TradeState, TradeUpdate};
use cdm_dashboard::client::{ConvertTradeRequest, UpdateCdmTradeRequest};
use cdm_dashboard::modals::{Banner, CreateTradeModal, SubmitOutcome};
use cdm_dashboard::{ClientError, HttpTradeService, TradeService};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorded {
    fn push(&self, route: &str, body: Value) {
        self.bodies.lock().unwrap().push((route.to_string(), body));
    }

    fn bodies(&self) -> Vec<(String, Value)> {
        self.bodies.lock().unwrap().clone()
    }
}

fn trade_service(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/trade/trades",
            get(|| async {
                Json(json!({"trades": [
                    {"id": 1, "security": "AAPL", "quantity": 100, "side": "Buy", "accountId": 22214, "state": "New", "updated": 1700000000000i64},
                    {"id": 2, "security": "MSFT", "quantity": 5, "side": "Sell", "accountId": 52355, "state": "Settled"}
                ]}))
            }),
        )
        .route(
            "/trade/positions/:account",
            get(|Path(account): Path<i64>| async move {
                Json(json!([{"accountId": account, "security": "AAPL", "quantity": 100}]))
            }),
        )
        .route(
            "/trade/",
            post(|State(r): State<Recorded>, Json(body): Json<Value>| async move {
                r.push("create", body);
                StatusCode::OK
            }),
        )
        .route(
            "/trade/:id",
            put(|State(r): State<Recorded>, Json(body): Json<Value>| async move {
                r.push("update", body);
                StatusCode::OK
            }),
        )
        .route(
            "/cdm/convert-trade",
            post(|State(r): State<Recorded>, Json(body): Json<Value>| async move {
                r.push("convert", body);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"success": false})))
            }),
        )
        .route(
            "/cdm/update-trade",
            put(|State(r): State<Recorded>, Json(body): Json<Value>| async move {
                r.push("cdm-update", body);
                Json(json!({"success": true}))
            }),
        )
        .route(
            "/cdm/trades/:account",
            get(|Path(account): Path<i64>| async move {
                let document = json!({"tradeIdentifier": [{"identifier": {"value": "TRADE-1"}}]});
                Json(json!([{
                    "id": "TRADE-1",
                    "security": "AAPL",
                    "quantity": 100,
                    "side": "Buy",
                    "accountId": account,
                    "state": "New",
                    "cdmVersion": "6.0.0",
                    "businessEventType": "EXECUTION",
                    "cdmTrade": document.to_string()
                }]))
            }),
        )
        .route(
            "/cdm/status",
            get(|| async {
                Json(json!({
                    "service": "FINOS CDM Native Processing Pipeline",
                    "cdmEnabled": true,
                    "cdmVersion": "6.0.0",
                    "status": "ACTIVE",
                    "cdmTradesStored": 3
                }))
            }),
        )
        .route(
            "/stocks",
            get(|| async { Json(json!([{"ticker": "AAPL", "companyName": "Apple Inc."}, {"ticker": "IBM"}])) }),
        )
        .with_state(recorded)
}

async fn spawn(app: Router) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

async fn client() -> Result<(HttpTradeService, Recorded)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let recorded = Recorded::default();
    let addr = spawn(trade_service(recorded.clone())).await?;
    let base = format!("http://{}", addr);
    Ok((HttpTradeService::new(base.clone(), base), recorded))
}

#[tokio::test]
async fn test_reads() -> Result<()> {
    let (service, _) = client().await?;

    let trades = service.trades().await?;
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].id, "1");
    assert_eq!(trades[0].updated.as_deref(), Some("1700000000000"));
    assert_eq!(trades[1].side, Side::Sell);

    let positions = service.positions(22214).await?;
    assert_eq!(positions[0].account_id, Some(22214));

    let cdm_trades = service.cdm_trades(22214).await?;
    assert_eq!(cdm_trades[0].cdm_version, "6.0.0");
    let document = cdm_trades[0].trade_document().unwrap()?;
    assert_eq!(document["tradeIdentifier"][0]["identifier"]["value"], "TRADE-1");

    let status = service.cdm_status().await?;
    assert_eq!(status.stored_trades(), 3);

    let stocks = service.stocks().await?;
    assert_eq!(stocks.len(), 2);
    assert_eq!(stocks[0].company_name.as_deref(), Some("Apple Inc."));
    Ok(())
}

#[tokio::test]
async fn test_writes_and_status_errors() -> Result<()> {
    let (service, recorded) = client().await?;

    service
        .create_trade(&TradeOrder::new("TRADE-5", "IBM", 10, 7, Side::Buy))
        .await?;
    service
        .update_trade(&TradeUpdate {
            id: "TRADE-5".into(),
            security: "IBM".into(),
            quantity: 20,
            side: Side::Buy,
            state: TradeState::Executed,
        })
        .await?;
    service
        .update_cdm_trade(&UpdateCdmTradeRequest {
            trade_id: "TRADE-5".into(),
            business_event_type: BusinessEventType::Correction,
        })
        .await?;

    let err = service
        .convert_trade(&ConvertTradeRequest {
            trade_id: "TRADE-5".into(),
            account_id: 7,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));

    let bodies = recorded.bodies();
    assert_eq!(bodies[0].0, "create");
    assert_eq!(bodies[0].1["accountId"], 7);
    assert_eq!(bodies[0].1["side"], "Buy");
    assert_eq!(bodies[1].1["state"], "Executed");
    assert_eq!(bodies[2].1["businessEventType"], "Correction");
    assert_eq!(bodies[3].1, json!({"tradeId": "TRADE-5", "accountId": 7}));
    Ok(())
}

#[tokio::test]
async fn test_create_modal_partial_success_over_http() -> Result<()> {
    let (service, recorded) = client().await?;

    let mut modal = CreateTradeModal::new(123, Duration::from_millis(1));
    modal.open(&service).await;
    assert_eq!(modal.stocks().len(), 2);
    modal.set_security("AAPL");
    modal.set_quantity(100);
    modal.set_side(Side::Buy);

    assert_eq!(modal.submit(&service).await, SubmitOutcome::CdmFailed);
    assert!(modal.is_open());
    assert!(modal.trade_created());
    assert_eq!(
        modal.banner(),
        Some(Banner::Warning("CDM conversion failed, but trade was created".into()))
    );

    let bodies = recorded.bodies();
    let created_id = bodies[0].1["id"].as_str().unwrap_or_default().to_string();
    assert!(created_id.starts_with("TRADE-"));
    assert_eq!(bodies[1].1["tradeId"], created_id.as_str());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_error() {
    let service = HttpTradeService::new("http://127.0.0.1:1", "http://127.0.0.1:1");
    let err = service.trades().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(!err.is_status());
}

#[tokio::test]
async fn test_missing_route_is_a_status_error() -> Result<()> {
    let addr = spawn(trade_service(Recorded::default())).await?;
    let service = HttpTradeService::new(format!("http://{}/nowhere", addr), format!("http://{}", addr));

    let err = service.cdm_status().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
    Ok(())
}
