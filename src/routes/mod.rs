pub mod api;

use axum::{http::{HeaderValue, Method}, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::docs::ApiDoc;
use crate::handlers::{api_info, health_check, ready_check};
use crate::state::AppState;
use crate::websocket::websocket_handler;
pub use api::create_api_routes;

/// Assemble the whole HTTP + realtime surface
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let root_routes = Router::<AppState>::new()
        .route("/", get(api_info))
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/ws", get(websocket_handler))
        .with_state(state.clone());

    Router::new()
        .merge(root_routes)
        // Mount API routes
        .nest("/api", create_api_routes(state))
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let Some(origins) = config.cors_origin_list() else {
        return CorsLayer::permissive();
    };
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> (Router, AppState) {
        let state = AppState::new(Config::default());
        (create_app(state.clone()), state)
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_api_info() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json["message"].is_string());
        assert!(json["version"].is_string());
        assert!(json["endpoints"].is_object());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "healthy");
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (app, _) = test_app();
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/session")
                    .header("host", "interview.example.com")
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let created = body_json(resp).await;
        let session_id = created["sessionId"].as_str().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&session_id).is_ok());
        assert_eq!(
            created["url"],
            format!("https://interview.example.com/session/{session_id}")
        );

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/session/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["id"], session_id.as_str());
        assert_eq!(json["code"], "// Write your code here\n");
        assert_eq!(json["language"], "javascript");
        assert!(json["createdAt"].is_string());
        assert_eq!(json["participants"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_public_url_overrides_request_host() {
        let config = Config {
            public_url: Some("https://code.example.com/".to_string()),
            ..Config::default()
        };
        let app = create_app(AppState::new(config));
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/session")
                    .header("host", "10.0.0.4:5000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert!(json["url"].as_str().unwrap().starts_with("https://code.example.com/session/"));
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/session/non-existent-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json, json!({ "error": "Session not found" }));
    }

    #[tokio::test]
    async fn test_diagnostics_counts_sessions() {
        let (app, state) = test_app();
        let id = state.store.create().await.id;
        state.store.add_participant(&id, "c1").await;
        state.store.create().await;

        let resp = app
            .oneshot(Request::builder().uri("/api/v1/diagnostics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["nSessions"], 2);
        assert_eq!(json["nParticipants"], 1);
        assert_eq!(json["nConnections"], 0);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json["paths"]["/api/session"].is_object());
    }
}
