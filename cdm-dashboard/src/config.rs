use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "cdm-dashboard";

/// Service endpoints and timings of the dashboard.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub trade_service_url: String,
    pub reference_data_url: String,
    /// Websocket endpoint of the pub/sub channel.
    pub pubsub_url: String,
    pub poll_interval_secs: u64,
    /// How long the success banner stays up before a modal closes.
    pub dismiss_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trade_service_url: "http://localhost:18092".to_string(),
            reference_data_url: "http://localhost:18085".to_string(),
            pubsub_url: "ws://localhost:3000/ws".to_string(),
            poll_interval_secs: 5,
            dismiss_delay_ms: 2000,
        }
    }
}

impl DashboardConfig {
    /// Defaults, then `cdm-dashboard.{toml,...}` (or `path`), then
    /// `CDM_DASHBOARD_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("CDM_DASHBOARD"))
            .build()?
            .try_deserialize()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.dismiss_delay_ms)
    }
}
