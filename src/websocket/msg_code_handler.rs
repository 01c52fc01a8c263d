use tracing::{debug, warn};

use crate::models::{CodeChangeMessage, CodeUpdateMessage, SendMessage};
use crate::websocket::gateway::{Gateway, Membership};

/// Handle a full-buffer replacement. Everyone but the sender is told.
pub async fn handle_code_change_message(
    msg: CodeChangeMessage,
    connection_id: &str,
    gateway: &Gateway,
    membership: &mut Membership,
) {
    let CodeChangeMessage { session_id, code } = msg;

    if !gateway.store().set_code(&session_id, code.clone()).await {
        warn!("Dropping code-change from {} for unknown session {}", connection_id, session_id);
        return;
    }

    let len = code.len();
    let notified = membership.broadcast(
        &session_id,
        &SendMessage::CodeUpdate(CodeUpdateMessage { code }),
        Some(connection_id),
    );
    debug!("Code of session {} replaced by {} ({} bytes, {} notified)", session_id, connection_id, len, notified);
}
