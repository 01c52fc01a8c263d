use tracing::{info, warn};

use crate::models::{PresenceMessage, SendMessage, SessionStateMessage, ALREADY_JOINED, SESSION_NOT_FOUND};
use crate::websocket::gateway::{Gateway, Membership};

/// Handle a join request
pub async fn handle_join_message(
    session_id: &str,
    connection_id: &str,
    gateway: &Gateway,
    membership: &mut Membership,
) {
    if !membership.is_connected(connection_id) {
        warn!("Join from unknown connection {} ignored", connection_id);
        return;
    }

    // A channel stays bound to the first session it joined
    if let Some(joined) = membership.joined_session(connection_id) {
        if joined != session_id {
            warn!("Connection {} already joined {}, refusing {}", connection_id, joined, session_id);
            membership.deliver(connection_id, SendMessage::error(ALREADY_JOINED));
            return;
        }
        if let Some(session) = gateway.store().get(session_id).await {
            membership.deliver(connection_id, SendMessage::SessionState(SessionStateMessage {
                code: session.code,
                language: session.language,
                participants: session.participants.len(),
            }));
        }
        return;
    }

    let Some(total) = gateway.store().add_participant(session_id, connection_id).await else {
        warn!("Connection {} tried to join unknown session {}", connection_id, session_id);
        membership.deliver(connection_id, SendMessage::error(SESSION_NOT_FOUND));
        return;
    };
    let Some(session) = gateway.store().get(session_id).await else {
        return;
    };
    membership.attach(connection_id, session_id);

    // The joiner's snapshot is queued before anyone hears about the join
    membership.deliver(connection_id, SendMessage::SessionState(SessionStateMessage {
        code: session.code,
        language: session.language,
        participants: total,
    }));
    membership.broadcast(
        session_id,
        &SendMessage::UserJoined(PresenceMessage {
            participant_id: connection_id.to_string(),
            total_participants: total,
        }),
        Some(connection_id),
    );

    info!("User {} joined session {} ({} participants)", connection_id, session_id, total);
}
