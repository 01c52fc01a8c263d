use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message used when a join names a session the store does not know
pub const SESSION_NOT_FOUND: &str = "Session not found";

/// Message used when a joined channel tries to join a second session
pub const ALREADY_JOINED: &str = "Already joined another session";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeMessage {
    pub session_id: String,
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChangeMessage {
    pub session_id: String,
    pub language: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorPositionMessage {
    pub session_id: String,
    pub position: Value,
}

/// Frames a client sends over the realtime channel
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ReceivedMessage {
    #[serde(rename = "join", alias = "join-session")]
    Join(String),
    #[serde(rename = "code-change")]
    CodeChange(CodeChangeMessage),
    #[serde(rename = "language-change")]
    LanguageChange(LanguageChangeMessage),
    #[serde(rename = "cursor-position")]
    CursorPosition(CursorPositionMessage),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionStateMessage {
    pub code: String,
    pub language: String,
    pub participants: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CodeUpdateMessage {
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LanguageUpdateMessage {
    pub language: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceMessage {
    pub participant_id: String,
    pub total_participants: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdateMessage {
    pub user_id: String,
    pub position: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    pub message: String,
}

/// Frames the gateway sends to clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum SendMessage {
    #[serde(rename = "session-state")]
    SessionState(SessionStateMessage),
    #[serde(rename = "code-update")]
    CodeUpdate(CodeUpdateMessage),
    #[serde(rename = "language-update")]
    LanguageUpdate(LanguageUpdateMessage),
    #[serde(rename = "user-joined")]
    UserJoined(PresenceMessage),
    #[serde(rename = "user-left")]
    UserLeft(PresenceMessage),
    #[serde(rename = "cursor-update")]
    CursorUpdate(CursorUpdateMessage),
    #[serde(rename = "error")]
    Error(ErrorMessage),
}

impl SendMessage {
    pub fn error(message: impl Into<String>) -> Self {
        SendMessage::Error(ErrorMessage { message: message.into() })
    }

    /// Event name as it appears on the wire
    pub fn event(&self) -> &'static str {
        match self {
            SendMessage::SessionState(_) => "session-state",
            SendMessage::CodeUpdate(_) => "code-update",
            SendMessage::LanguageUpdate(_) => "language-update",
            SendMessage::UserJoined(_) => "user-joined",
            SendMessage::UserLeft(_) => "user-left",
            SendMessage::CursorUpdate(_) => "cursor-update",
            SendMessage::Error(_) => "error",
        }
    }
}
