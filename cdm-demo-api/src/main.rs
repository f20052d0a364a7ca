use anyhow::Context;
use cdm_demo_api::{args::Args, run_api_server, AppState, ServerConfig};
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ServerConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let config = args.apply(config);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .init();
    info!("=== CDM Demo API Starting ===");
    info!("CDM version {}, static files from {}", config.cdm_version, config.static_dir.display());

    let state = AppState::new(config);
    info!("Store holds {} CDM trades", state.store.len());

    run_api_server(state).await
}
