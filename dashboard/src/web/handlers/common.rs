// Common types and utilities for API handlers

use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::PanelError;

// Helper type for API responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub fn panel_error(err: PanelError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = match err {
        PanelError::NotFound { .. } => StatusCode::NOT_FOUND,
        PanelError::InvalidFilter { .. } | PanelError::InvalidInterval { .. } => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

// Request bodies
#[derive(Debug, Deserialize)]
pub struct AutoRefreshRequest {
    pub enabled: bool,
    #[serde(default)]
    pub interval_ms: Option<u64>,
}
