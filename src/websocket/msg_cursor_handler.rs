use crate::models::{CursorPositionMessage, CursorUpdateMessage, SendMessage};
use crate::websocket::gateway::Membership;

/// Relay a cursor position to the rest of the session. Nothing is stored.
pub fn handle_cursor_position_message(msg: CursorPositionMessage, connection_id: &str, membership: &mut Membership) {
    membership.broadcast(
        &msg.session_id,
        &SendMessage::CursorUpdate(CursorUpdateMessage {
            user_id: connection_id.to_string(),
            position: msg.position,
        }),
        Some(connection_id),
    );
}
