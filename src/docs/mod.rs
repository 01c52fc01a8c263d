use utoipa::OpenApi;
use crate::models::*;

/// Service description
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "API information", body = ApiInfoResponse)
    )
)]
#[allow(dead_code)]
pub async fn api_info_doc() {}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Create a new session
#[utoipa::path(
    post,
    path = "/api/session",
    responses(
        (status = 200, description = "Session created", body = CreateSessionResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_session_doc() {}

/// Describe a session
#[utoipa::path(
    get,
    path = "/api/session/{id}",
    params(
        ("id" = String, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_session_doc() {}

/// Runtime diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Session and host statistics", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        api_info_doc,
        health_check_doc,
        ready_check_doc,
        create_session_doc,
        get_session_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            ApiInfoResponse,
            ApiEndpoints,
            HealthResponse,
            ReadyResponse,
            CreateSessionResponse,
            SessionSnapshot,
            Participant,
            ErrorResponse,
            DiagnosticsResponse,
        )
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
