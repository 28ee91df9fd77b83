// Liveness probe

use axum::{extract::State, response::Json};
use serde::Serialize;

use super::common::{ApiResponse, ApiResult};
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    pub panels: usize,
    pub active_panels: usize,
    pub api_base_url: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<ServiceHealth> {
    let active_panels = state
        .panels
        .iter()
        .filter(|panel| panel.poller.is_active())
        .count();

    Ok(Json(ApiResponse::success(ServiceHealth {
        status: "ok",
        panels: state.panels.len(),
        active_panels,
        api_base_url: state.config.api_base_url.clone(),
    })))
}
