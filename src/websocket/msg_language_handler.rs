use tracing::{debug, warn};

use crate::models::{is_supported_language, LanguageChangeMessage, LanguageUpdateMessage, SendMessage};
use crate::websocket::gateway::{Gateway, Membership};

/// Handle a language switch. The sender is included in the broadcast.
pub async fn handle_language_change_message(
    msg: LanguageChangeMessage,
    connection_id: &str,
    gateway: &Gateway,
    membership: &mut Membership,
) {
    let LanguageChangeMessage { session_id, language } = msg;

    if !is_supported_language(&language) {
        warn!("Session {} switching to unsupported language '{}'", session_id, language);
    }

    if !gateway.store().set_language(&session_id, language.clone()).await {
        warn!("Dropping language-change from {} for unknown session {}", connection_id, session_id);
        return;
    }

    debug!("Session {} language set to {} by {}", session_id, language, connection_id);
    membership.broadcast(
        &session_id,
        &SendMessage::LanguageUpdate(LanguageUpdateMessage { language }),
        None,
    );
}
