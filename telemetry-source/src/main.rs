// File: telemetry-source/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use telemetry_source::{create_router, wait_for_shutdown, AppState, SourceConfig, TelemetryStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = SourceConfig::from_env()?;
    info!(
        "Starting telemetry source on {} (sync every {}s, seed {:?})",
        config.bind,
        config.sync_interval.as_secs(),
        config.seed
    );

    let store = TelemetryStore::new(config.seed);
    let sync_job = store.spawn_sync_job(config.sync_interval);

    let app = create_router(Arc::new(AppState { store }));
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Telemetry source listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(tokio::signal::ctrl_c()))
        .await?;

    sync_job.abort();
    Ok(())
}
