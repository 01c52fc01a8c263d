use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Buffer contents of a freshly created session
pub const DEFAULT_CODE: &str = "// Write your code here\n";

/// Language selected for a freshly created session
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Languages the browser clients know how to execute
pub const SUPPORTED_LANGUAGES: &[&str] = &["javascript", "python"];

pub fn is_supported_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

/// One live connection attached to a session
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Connection identifier assigned by the gateway
    pub id: String,
    pub joined_at: DateTime<Utc>,
}

/// Authoritative state of one collaboratively edited buffer
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub code: String,
    pub language: String,
    /// Join order
    pub participants: Vec<Participant>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            code: DEFAULT_CODE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            participants: Vec::new(),
            last_activity: now,
        }
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// Read-only view of a session returned by `GET /api/session/:id`
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub code: String,
    pub language: String,
    pub participants: Vec<Participant>,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            created_at: session.created_at,
            code: session.code.clone(),
            language: session.language.clone(),
            participants: session.participants.clone(),
        }
    }
}

/// Response for creating a session
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub url: String,
}
