use anyhow::{bail, Context, Result};
use cdm_dashboard::args::{Cli, Commands};
use cdm_dashboard::dashboard::{render_grid, ColumnSet};
use cdm_dashboard::hooks::{PositionsHook, TradesHook};
use cdm_dashboard::modals::{Banner, CreateTradeModal, SubmitOutcome, UpdateTradeModal};
use cdm_dashboard::socket::WsTransport;
use cdm_dashboard::viewer::{render_trade_details, CdmViewer, ViewerLayout};
use cdm_dashboard::{Dashboard, DashboardConfig, HttpTradeService, TradeService};
use clap::Parser;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let config = cli.apply(config);
    let service = Arc::new(HttpTradeService::new(
        config.trade_service_url.clone(),
        config.reference_data_url.clone(),
    ));

    let mut columns = ColumnSet::default();
    columns.rebuild();

    match cli.command {
        Commands::Trades { account } => {
            let mut hook = TradesHook::new();
            hook.load(&*service, account).await;
            println!("{}", render_grid(&columns.trades, hook.data()));
        }
        Commands::Positions { account } => {
            let mut hook = PositionsHook::new();
            hook.load(&*service, account).await;
            println!("{}", render_grid(&columns.positions, hook.data()));
        }
        Commands::CdmTrades { account, compact, expand } => {
            let layout = if compact { ViewerLayout::Compact } else { ViewerLayout::Full };
            let mut viewer = CdmViewer::new(layout);
            for id in &expand {
                viewer.toggle(id);
            }
            viewer.refresh(&*service, account).await;
            println!("{}", viewer.render());
        }
        Commands::Status => {
            let status = service.cdm_status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Create {
            account,
            security,
            quantity,
            side,
        } => {
            let mut modal = CreateTradeModal::new(account, config.dismiss_delay());
            modal.open(&*service).await;
            modal.set_security(security);
            modal.set_quantity(quantity);
            modal.set_side(side);
            if !modal.can_submit() {
                if let Some(banner) = modal.banner() {
                    println!("{}", banner);
                }
                bail!("account, security, positive quantity and side are required");
            }
            report(modal.submit(&*service).await, modal.banner())?;
        }
        Commands::Update {
            account,
            trade,
            security,
            quantity,
            side,
            state,
            event,
        } => {
            let trades = service.cdm_trades(account).await?;
            let selected = trades
                .into_iter()
                .find(|t| t.id() == trade)
                .with_context(|| format!("no CDM trade {} for account {}", trade, account))?;

            let mut modal = UpdateTradeModal::new(selected.trade, config.dismiss_delay());
            modal.open();
            if let Some(security) = security {
                modal.set_security(security);
            }
            if let Some(quantity) = quantity {
                modal.set_quantity(quantity);
            }
            if let Some(side) = side {
                modal.set_side(side);
            }
            if let Some(state) = state {
                modal.set_trade_state(state);
            }
            modal.set_business_event_type(event);
            report(modal.submit(&*service).await, modal.banner())?;
        }
        Commands::Show { account, trade } => {
            let trades = service.cdm_trades(account).await?;
            let selected = trades
                .iter()
                .find(|t| t.id() == trade)
                .with_context(|| format!("no CDM trade {} for account {}", trade, account))?;
            println!("{}", render_trade_details(selected));
        }
        Commands::Watch { account } => {
            let transport = WsTransport::connect(&config.pubsub_url)
                .await
                .with_context(|| format!("failed to connect to {}", config.pubsub_url))?;
            let mut dashboard = Dashboard::new(service, Box::new(transport), config.dismiss_delay());
            dashboard.select_account(account).await?;
            info!("Watching account {} (Ctrl-C to stop)", account);
            dashboard
                .run(config.poll_interval(), async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
        }
    }

    Ok(())
}

fn report(outcome: SubmitOutcome, banner: Option<Banner>) -> Result<()> {
    if let Some(banner) = banner {
        println!("{}", banner);
    }
    match outcome {
        SubmitOutcome::Completed => {
            println!("Submitted.");
            Ok(())
        }
        SubmitOutcome::CdmFailed => Ok(()),
        SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Rejected => bail!("form incomplete, nothing was sent"),
    }
}
