//! # CDM Demo API
//!
//! Mock server keeping CDM trades in memory.
//!
//! ## Modules
//! - `store`: append-only trade list with the demo defaults.
//! - `api`: HTTP routes and the websocket pub/sub endpoint.
//! - `event_bus`: fan-out of published trades to websocket sessions.
//! - `config` / `args`: layered configuration and CLI overrides.

pub mod api;
pub mod args;
pub mod config;
pub mod event_bus;
pub mod store;

pub use api::{router, run_api_server, AppState};
pub use config::ServerConfig;
pub use event_bus::EventBus;
pub use store::{CdmStore, DemoTrade, NewDemoTrade};
