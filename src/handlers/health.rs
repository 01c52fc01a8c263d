use axum::Json;
use chrono::Utc;
use crate::models::{ApiEndpoints, ApiInfoResponse, HealthResponse, ReadyResponse};
use tracing::debug;

/// Service description
pub async fn api_info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        message: "Coding Interview Platform API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ApiEndpoints {
            health: "/health".to_string(),
            create_session: "POST /api/session".to_string(),
            get_session: "GET /api/session/:id".to_string(),
            realtime: "GET /ws".to_string(),
        },
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check endpoint
pub async fn ready_check() -> Json<ReadyResponse> {
    debug!("Readiness check requested");
    Json(ReadyResponse {
        status: "ok".to_string(),
        message: "Service is ready".to_string(),
    })
}
