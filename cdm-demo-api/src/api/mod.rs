//! HTTP routes of the demo API.

mod ws;

use crate::config::ServerConfig;
use crate::event_bus::EventBus;
use crate::store::{BusinessEventEnvelope, CdmStore, DemoTrade, NewDemoTrade};
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use cdm::{PubSubMessage, Topic};
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

const DEMO_TITLE: &str = "FINOS CDM Integration Demo";
const SERVICE_NAME: &str = "CDM Demo API";
const ACTIVE: &str = "ACTIVE";
const DEMO_FEATURES: [&str; 4] = [
    "CDM ExecutionInstruction Creation",
    "CDM BusinessEvent Processing",
    "Industry Standard Compliance",
    "Event Store Persistence",
];

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CdmStore>,
    pub event_bus: EventBus,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// State for `config`, seeding the store unless disabled.
    pub fn new(config: ServerConfig) -> Self {
        let store = if config.seed_demo_trades {
            CdmStore::with_seed_data(config.cdm_version.clone())
        } else {
            CdmStore::new(config.cdm_version.clone())
        };
        Self {
            store: Arc::new(store),
            event_bus: EventBus::new(),
            config: Arc::new(config),
        }
    }
}

/// Record as listed by `GET /cdm-demo`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoTradeSummary {
    pub id: String,
    pub security: String,
    pub quantity: i64,
    pub side: String,
    pub account_id: i64,
    pub state: String,
    pub created: String,
    pub cdm_business_event: BusinessEventEnvelope,
}

impl From<DemoTrade> for DemoTradeSummary {
    fn from(trade: DemoTrade) -> Self {
        Self {
            id: trade.id,
            security: trade.security,
            quantity: trade.quantity,
            side: trade.side,
            account_id: trade.account_id,
            state: trade.state,
            created: trade.created,
            cdm_business_event: trade.cdm_business_event,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DemoInfo {
    pub description: String,
    pub features: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoOverview {
    pub title: &'static str,
    pub cdm_version: String,
    pub status: &'static str,
    pub total_cdm_trades: usize,
    pub timestamp: String,
    pub cdm_trades: Vec<DemoTradeSummary>,
    pub demo_info: DemoInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTradeResponse {
    pub success: bool,
    pub message: &'static str,
    pub trade: DemoTrade,
    pub total_trades: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub service: &'static str,
    pub cdm_version: String,
    pub status: &'static str,
    pub total_trades: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/cdm-demo", get(demo_overview))
        .route("/cdm-demo/add-trade", post(add_trade))
        .route("/cdm-status", get(service_status))
        .route("/ws", get(ws::ws_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_api_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("CDM Demo API listening on http://{}", addr);
    info!("  dashboard:  http://{}/", addr);
    info!("  demo data:  http://{}/cdm-demo", addr);
    info!("  status:     http://{}/cdm-status", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: now(),
    })
}

async fn demo_overview(State(state): State<AppState>) -> Json<DemoOverview> {
    let trades = state.store.trades();
    let version = state.store.cdm_version().to_string();

    Json(DemoOverview {
        title: DEMO_TITLE,
        cdm_version: version.clone(),
        status: ACTIVE,
        total_cdm_trades: trades.len(),
        timestamp: now(),
        cdm_trades: trades.into_iter().map(DemoTradeSummary::from).collect(),
        demo_info: DemoInfo {
            description: format!(
                "This demonstrates FINOS CDM {} integration with TraderX",
                version
            ),
            features: DEMO_FEATURES.to_vec(),
        },
    })
}

/// Accepts any body. Unreadable JSON is treated as an empty request.
async fn add_trade(State(state): State<AppState>, body: Bytes) -> Json<AddTradeResponse> {
    let trade = state.store.create_trade(NewDemoTrade::from_body(&body));
    info!("Created CDM trade {} for account {}", trade.id, trade.account_id);

    match serde_json::to_value(&trade) {
        Ok(payload) => state.event_bus.publish(PubSubMessage::Publish {
            topic: Topic::trades(trade.account_id),
            payload,
        }),
        Err(e) => warn!("Could not publish trade {}: {}", trade.id, e),
    }

    Json(AddTradeResponse {
        success: true,
        message: "CDM trade created successfully",
        trade,
        total_trades: state.store.len(),
    })
}

async fn service_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        service: SERVICE_NAME,
        cdm_version: state.store.cdm_version().to_string(),
        status: ACTIVE,
        total_trades: state.store.len(),
        timestamp: now(),
    })
}
