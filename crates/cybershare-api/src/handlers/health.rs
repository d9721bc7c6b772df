//! Health check handlers.

use axum::Json;
use chrono::Utc;

use crate::dto::response::{HealthResponse, InfoResponse};

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        timestamp: Utc::now(),
    })
}

/// GET /api/info
pub async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "CyberShare".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Community blogging platform API".to_string(),
    })
}
