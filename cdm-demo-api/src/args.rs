use crate::config::ServerConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "cdm-demo-api")]
#[command(about = "Mock CDM trade API with an in-memory store", long_about = None)]
pub struct Args {
    /// Configuration file (TOML, JSON or YAML).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind.
    #[arg(long)]
    pub bind: Option<String>,

    /// Directory served at `/`.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Start with an empty store.
    #[arg(long)]
    pub no_seed: bool,
}

impl Args {
    /// Command line values win over the loaded configuration.
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(bind) = &self.bind {
            config.bind_address = bind.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = dir.clone();
        }
        if self.no_seed {
            config.seed_demo_trades = false;
        }
        config
    }
}
