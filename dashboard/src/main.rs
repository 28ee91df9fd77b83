// File: dashboard/src/main.rs
use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use dashboard::aggregator::ViewQuery;
use dashboard::constants::defaults;
use dashboard::render::render_panel;
use dashboard::web::{start_web_server, AppState};
use dashboard::{ConfigManager, DashboardError, PanelRegistry, TickOutcome};

/// Agent operations dashboard
#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Polls agent telemetry and serves aggregated panel views", version)]
struct Args {
    /// Directory holding main.toml and panel files
    #[arg(long, env = "DASHBOARD_CONFIG_DIR", default_value = defaults::CONFIG_DIR)]
    config_dir: String,

    /// Refresh each selected panel once, print it and exit
    #[arg(long)]
    once: bool,

    /// Restrict --once to these panels (repeatable)
    #[arg(long = "panel")]
    panels: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("dashboard=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting agent operations dashboard");

    let config_manager = ConfigManager::new(args.config_dir.clone()).await?;
    let config = config_manager.get_current_config();
    info!(
        "Configuration loaded: {} panels, source {}",
        config.panels.len(),
        config.api_base_url
    );

    let panels = Arc::new(PanelRegistry::from_config(&config)?);

    if args.once {
        return run_once(&panels, &args.panels).await;
    }

    panels.activate_enabled().await;

    let state = AppState::new(config.clone(), panels.clone());
    start_web_server(state, shutdown_signal()).await?;

    panels.deactivate_all().await;
    info!("Dashboard stopped");
    Ok(())
}

async fn run_once(panels: &PanelRegistry, selected: &[String]) -> Result<()> {
    let names = if selected.is_empty() {
        panels.names()
    } else {
        selected.to_vec()
    };

    for name in names {
        let panel = panels.get(&name).map_err(DashboardError::from)?;

        if let TickOutcome::Committed { failed, .. } = panel.poller.refresh_now().await {
            if failed > 0 {
                let status = panel.status().await;
                for error in status.resources.into_iter().filter_map(|r| r.last_error) {
                    warn!("Panel {}: {}", name, DashboardError::from(error));
                }
            }
        }

        let view = panel
            .view(&ViewQuery::default())
            .await
            .map_err(|e| anyhow!("Failed to aggregate panel {}: {}", name, e))?;
        let title = panel.config.title.as_deref().unwrap_or(&name);
        println!("# {}\n{}", title, render_panel(&view));
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
