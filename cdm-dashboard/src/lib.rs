//! # CDM Dashboard
//!
//! Terminal client for CDM trades held by the trade service.
//!
//! ## Modules
//! - `client`: the [`TradeService`] seam and its HTTP implementation.
//! - `hooks`: per-account trade and position loaders.
//! - `modals`: two-step create/update forms.
//! - `dashboard`: account selection, pub/sub routing, grids and tabs.
//! - `viewer`: CDM trade listing and the details panel.
//! - `socket`: pub/sub transports (websocket, in-memory).

pub mod args;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod hooks;
pub mod modals;
pub mod socket;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use client::{HttpTradeService, TradeService};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Tab};
pub use error::{ClientError, Result};
