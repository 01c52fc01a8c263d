use crate::{handlers::{create_session, diagnostics, get_session}, state::AppState};
use axum::{routing::{get, post}, Router};

/// Create API routes
pub fn create_api_routes(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/session", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/v1/diagnostics", get(diagnostics))
        .with_state(state)
}
