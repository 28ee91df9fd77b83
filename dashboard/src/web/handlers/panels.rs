// Panel endpoints: listing, aggregated views and polling control

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use super::common::{panel_error, ApiResponse, ApiResult, AutoRefreshRequest};
use crate::aggregator::{PanelView, ViewQuery};
use crate::panels::{PanelStatus, PanelSummary};
use crate::poller::TickOutcome;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: TickOutcome,
    pub ticks_completed: u64,
}

pub async fn list_panels(State(state): State<AppState>) -> ApiResult<Vec<PanelSummary>> {
    Ok(Json(ApiResponse::success(state.panels.summaries().await)))
}

pub async fn get_panel(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<PanelSummary> {
    let panel = state.panels.get(&name).map_err(panel_error)?;
    Ok(Json(ApiResponse::success(panel.summary().await)))
}

/// Aggregated view of the panel's last committed snapshot
pub async fn get_panel_view(
    Path(name): Path<String>,
    query: Result<Query<ViewQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> ApiResult<PanelView> {
    let Query(query) = query.map_err(|e| {
        warn!("Malformed view query for panel {}: {}", name, e.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "Invalid view query: {}",
                e.body_text()
            ))),
        )
    })?;
    let panel = state.panels.get(&name).map_err(panel_error)?;
    let view = panel.view(&query).await.map_err(|e| {
        warn!("Rejected view request for panel {}: {}", name, e);
        panel_error(e)
    })?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn get_panel_status(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<PanelStatus> {
    let panel = state.panels.get(&name).map_err(panel_error)?;
    Ok(Json(ApiResponse::success(panel.status().await)))
}

/// Manual refresh; waits for the tick to finish
pub async fn refresh_panel(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<RefreshResult> {
    let panel = state.panels.get(&name).map_err(panel_error)?;
    info!("Manual refresh requested for panel {}", name);

    let outcome = panel.poller.refresh_now().await;
    let message = match outcome {
        TickOutcome::Committed { failed: 0, .. } => "Refresh completed".to_string(),
        TickOutcome::Committed { failed, .. } => {
            format!("Refresh completed with {} failed resources", failed)
        }
        TickOutcome::Skipped => "A refresh is already in flight".to_string(),
        TickOutcome::Discarded => "Refresh discarded, panel was deactivated".to_string(),
    };

    Ok(Json(ApiResponse::success_with_message(
        RefreshResult {
            name,
            outcome,
            ticks_completed: panel.poller.ticks_completed(),
        },
        message,
    )))
}

pub async fn set_auto_refresh(
    Path(name): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AutoRefreshRequest>,
) -> ApiResult<PanelSummary> {
    let panel = state.panels.get(&name).map_err(panel_error)?;
    let interval = request.interval_ms.map(Duration::from_millis);

    let changed = panel
        .poller
        .reconfigure(Some(request.enabled), interval)
        .await
        .map_err(|e| {
            warn!("Rejected auto-refresh change for panel {}: {}", name, e);
            panel_error(e)
        })?;

    let summary = panel.summary().await;
    let message = if changed {
        format!(
            "Auto-refresh {} at {}ms",
            if summary.auto_refresh { "enabled" } else { "disabled" },
            summary.interval_ms
        )
    } else {
        "Polling settings unchanged".to_string()
    };
    Ok(Json(ApiResponse::success_with_message(summary, message)))
}

pub async fn activate_panel(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<PanelSummary> {
    let panel = state.panels.get(&name).map_err(panel_error)?;
    panel.poller.activate().await;
    Ok(Json(ApiResponse::success(panel.summary().await)))
}

pub async fn deactivate_panel(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<PanelSummary> {
    let panel = state.panels.get(&name).map_err(panel_error)?;
    panel.poller.deactivate().await;
    Ok(Json(ApiResponse::success(panel.summary().await)))
}
