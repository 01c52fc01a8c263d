use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use tracing::{debug, warn};

use crate::models::{CreateSessionResponse, ErrorResponse, SessionSnapshot};
use crate::services::SessionError;
use crate::state::AppState;

/// Create a new collaborative session
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let base_url = public_base_url(&state, &headers);
    let created = state.sessions.create_session(&base_url).await;
    (StatusCode::OK, Json(created))
}

/// Describe an existing session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<(StatusCode, Json<SessionSnapshot>), (StatusCode, Json<ErrorResponse>)> {
    match state.sessions.describe_session(&session_id).await {
        Ok(snapshot) => {
            debug!("Session {} described ({} participants)", session_id, snapshot.participants.len());
            Ok((StatusCode::OK, Json(snapshot)))
        }
        Err(e @ SessionError::NotFound(_)) => {
            warn!("Session '{}' not found", session_id);
            Err(ErrorResponse::with_status(StatusCode::NOT_FOUND, e.to_string()))
        }
    }
}

/// Base for shareable links: the configured public URL, else the caller's host
fn public_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(public_url) = &state.config.public_url {
        return public_url.trim_end_matches('/').to_string();
    }
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.server_address());
    format!("{}://{}", scheme, host)
}
