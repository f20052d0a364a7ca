use crate::config::DashboardConfig;
use cdm::{BusinessEventType, Side, TradeState};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cdm-dashboard")]
#[command(about = "Terminal dashboard for CDM trades")]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Trade service base URL.
    #[arg(long, global = true)]
    pub trade_service_url: Option<String>,

    /// Reference data base URL.
    #[arg(long, global = true)]
    pub reference_data_url: Option<String>,

    /// Pub/sub websocket URL.
    #[arg(long, global = true)]
    pub pubsub_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the trades of an account
    Trades {
        #[arg(short, long)]
        account: i64,
    },
    /// List the positions of an account
    Positions {
        #[arg(short, long)]
        account: i64,
    },
    /// Show the CDM trades of an account
    CdmTrades {
        #[arg(short, long)]
        account: i64,
        /// Compact viewer layout
        #[arg(long)]
        compact: bool,
        /// Trade ids whose CDM JSON is shown
        #[arg(long = "expand")]
        expand: Vec<String>,
    },
    /// CDM processing status of the trade service
    Status,
    /// Create a trade and convert it to CDM
    Create {
        #[arg(short, long)]
        account: i64,
        #[arg(short, long)]
        security: String,
        #[arg(short, long)]
        quantity: i64,
        #[arg(long)]
        side: Side,
    },
    /// Update a CDM trade with a business event
    Update {
        #[arg(short, long)]
        account: i64,
        /// CDM trade id
        #[arg(short, long)]
        trade: String,
        #[arg(short, long)]
        security: Option<String>,
        #[arg(short, long)]
        quantity: Option<i64>,
        #[arg(long)]
        side: Option<Side>,
        #[arg(long)]
        state: Option<TradeState>,
        #[arg(long, default_value = "Amendment")]
        event: BusinessEventType,
    },
    /// Details of one CDM trade
    Show {
        #[arg(short, long)]
        account: i64,
        #[arg(short, long)]
        trade: String,
    },
    /// Live dashboard for an account
    Watch {
        #[arg(short, long)]
        account: i64,
    },
}

impl Cli {
    /// Command line URLs win over the loaded configuration.
    pub fn apply(&self, mut config: DashboardConfig) -> DashboardConfig {
        if let Some(url) = &self.trade_service_url {
            config.trade_service_url = url.clone();
        }
        if let Some(url) = &self.reference_data_url {
            config.reference_data_url = url.clone();
        }
        if let Some(url) = &self.pubsub_url {
            config.pubsub_url = url.clone();
        }
        config
    }
}
