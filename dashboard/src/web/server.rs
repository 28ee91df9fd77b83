// File: dashboard/src/web/server.rs
use anyhow::{anyhow, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::web::{handlers, AppState};

/// Serve the view API until `shutdown` resolves
pub async fn start_web_server<F>(state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
    info!("Dashboard API running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow!("Server error: {}", e))?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // === PANEL ROUTES ===
        .route("/api/panels", get(handlers::list_panels))
        .route("/api/panels/{name}", get(handlers::get_panel))
        .route("/api/panels/{name}/view", get(handlers::get_panel_view))
        .route("/api/panels/{name}/status", get(handlers::get_panel_status))
        // === POLLING CONTROL ROUTES ===
        .route("/api/panels/{name}/refresh", post(handlers::refresh_panel))
        .route(
            "/api/panels/{name}/auto-refresh",
            post(handlers::set_auto_refresh),
        )
        .route("/api/panels/{name}/activate", post(handlers::activate_panel))
        .route(
            "/api/panels/{name}/deactivate",
            post(handlers::deactivate_panel),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
