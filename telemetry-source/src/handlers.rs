//! HTTP request handlers for the telemetry source

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::warn;

use crate::types::*;
use crate::AppState;

pub type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn agent_not_found(id: &str) -> (StatusCode, Json<ApiResponse<()>>) {
    warn!("Agent {} not found", id);
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!("Agent '{}' not found", id))),
    )
}

// === Collection handlers ===

pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Vec<Agent>> {
    Ok(Json(ApiResponse::success_with_data(state.store.agents(query).await)))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Vec<Session>> {
    Ok(Json(ApiResponse::success_with_data(state.store.sessions(query).await)))
}

pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Vec<Run>> {
    Ok(Json(ApiResponse::success_with_data(state.store.runs(query).await)))
}

pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Vec<LogLine>> {
    Ok(Json(ApiResponse::success_with_data(state.store.logs(query).await)))
}

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Vec<Skill>> {
    Ok(Json(ApiResponse::success_with_data(state.store.skills(query).await)))
}

pub async fn list_health(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Vec<HealthCheck>> {
    Ok(Json(ApiResponse::success_with_data(state.store.health(query).await)))
}

// === Admin handlers ===

pub async fn update_agent_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<AgentStatusRequest>,
) -> HandlerResult<Agent> {
    match state.store.set_agent_status(&id, request.status).await {
        Some(agent) => Ok(Json(ApiResponse::success_with_data(agent))),
        None => Err(agent_not_found(&id)),
    }
}

pub async fn delete_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<Agent> {
    match state.store.remove_agent(&id).await {
        Some(agent) => Ok(Json(ApiResponse::success_with_data(agent))),
        None => Err(agent_not_found(&id)),
    }
}

pub async fn liveness(State(state): State<Arc<AppState>>) -> HandlerResult<LivenessResponse> {
    Ok(Json(ApiResponse::success_with_data(state.store.liveness().await)))
}
