use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::models::{CreateSessionResponse, SessionSnapshot, SESSION_NOT_FOUND};
use crate::services::session_store::SessionStore;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("{}", SESSION_NOT_FOUND)]
    NotFound(String),
}

/// Session lifecycle operations offered to the HTTP layer
#[derive(Debug, Clone)]
pub struct SessionService {
    store: Arc<SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Create a session and derive its shareable link from `base_url`
    pub async fn create_session(&self, base_url: &str) -> CreateSessionResponse {
        let session = self.store.create().await;
        let url = share_url(base_url, &session.id);
        info!("Session {} shareable at {}", session.id, url);
        CreateSessionResponse {
            session_id: session.id,
            url,
        }
    }

    pub async fn describe_session(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        self.store
            .get(id)
            .await
            .map(|session| SessionSnapshot::from(&session))
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }
}

fn share_url(base_url: &str, session_id: &str) -> String {
    format!("{}/session/{}", base_url.trim_end_matches('/'), session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_session_is_describable() {
        let store = Arc::new(SessionStore::new());
        let service = SessionService::new(store.clone());

        let created = service.create_session("http://localhost:5000").await;
        assert_eq!(
            created.url,
            format!("http://localhost:5000/session/{}", created.session_id)
        );

        store.add_participant(&created.session_id, "c1").await;
        let snapshot = service.describe_session(&created.session_id).await.unwrap();
        assert_eq!(snapshot.id, created.session_id);
        assert_eq!(snapshot.language, "javascript");
        assert_eq!(snapshot.participants.len(), 1);
        assert_eq!(snapshot.participants[0].id, "c1");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let service = SessionService::new(Arc::new(SessionStore::new()));
        let err = service.describe_session("non-existent-id").await.unwrap_err();
        assert_eq!(err, SessionError::NotFound("non-existent-id".into()));
        assert_eq!(err.to_string(), "Session not found");
    }

    #[test]
    fn share_url_tolerates_trailing_slash() {
        assert_eq!(share_url("https://code.example.com/", "abc"), "https://code.example.com/session/abc");
    }
}
