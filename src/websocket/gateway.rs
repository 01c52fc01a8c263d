use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{PresenceMessage, ReceivedMessage, SendMessage};
use crate::services::SessionStore;
use crate::websocket::msg_code_handler::handle_code_change_message;
use crate::websocket::msg_cursor_handler::handle_cursor_position_message;
use crate::websocket::msg_join_handler::handle_join_message;
use crate::websocket::msg_language_handler::handle_language_change_message;

/// Outbound side of one live connection
#[derive(Debug)]
struct Channel {
    outbound: mpsc::Sender<SendMessage>,
    session_id: Option<String>,
}

/// Which connections are live and which session each one joined.
///
/// `groups` maps a session id to the connections joined to it, in join order.
/// It is the fan-out target set for every session-scoped broadcast.
#[derive(Debug, Default)]
pub struct Membership {
    channels: HashMap<String, Channel>,
    groups: HashMap<String, Vec<String>>,
    /// Connections whose queue overflowed; evicted before the lock is released
    lagged: Vec<String>,
}

impl Membership {
    pub fn is_connected(&self, connection_id: &str) -> bool {
        self.channels.contains_key(connection_id)
    }

    /// Session the connection joined, if any
    pub fn joined_session(&self, connection_id: &str) -> Option<&str> {
        self.channels
            .get(connection_id)
            .and_then(|channel| channel.session_id.as_deref())
    }

    /// Mark a connected channel as joined to `session_id`
    pub fn attach(&mut self, connection_id: &str, session_id: &str) {
        if let Some(channel) = self.channels.get_mut(connection_id) {
            channel.session_id = Some(session_id.to_string());
            self.groups
                .entry(session_id.to_string())
                .or_default()
                .push(connection_id.to_string());
        }
    }

    /// Connections currently joined to `session_id`
    pub fn group(&self, session_id: &str) -> &[String] {
        self.groups.get(session_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Queue a message for one connection without waiting.
    ///
    /// A full queue marks the connection as lagged: it can no longer be kept in
    /// sync, so it is disconnected and has to re-join for a fresh snapshot.
    pub fn deliver(&mut self, connection_id: &str, message: SendMessage) -> bool {
        let Some(channel) = self.channels.get(connection_id) else {
            return false;
        };
        let event = message.event();
        match channel.outbound.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Outbound queue full for {} on {}, disconnecting", connection_id, event);
                self.lagged.push(connection_id.to_string());
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Connection {} closed, dropping {}", connection_id, event);
                false
            }
        }
    }

    /// Queue a message for every connection in the session's group, optionally
    /// skipping one. Returns how many queues accepted it.
    pub fn broadcast(&mut self, session_id: &str, message: &SendMessage, except: Option<&str>) -> usize {
        let targets: Vec<String> = self
            .group(session_id)
            .iter()
            .filter(|id| Some(id.as_str()) != except)
            .cloned()
            .collect();
        targets
            .iter()
            .filter(|id| self.deliver(id, message.clone()))
            .count()
    }

    fn register(&mut self, connection_id: String, outbound: mpsc::Sender<SendMessage>) {
        self.channels.insert(connection_id, Channel { outbound, session_id: None });
    }

    /// Forget a connection, returning its channel if it was live
    fn unregister(&mut self, connection_id: &str) -> Option<Channel> {
        let channel = self.channels.remove(connection_id)?;
        if let Some(session_id) = &channel.session_id {
            self.leave_group(session_id, connection_id);
        }
        Some(channel)
    }

    fn leave_group(&mut self, session_id: &str, connection_id: &str) {
        if let Some(members) = self.groups.get_mut(session_id) {
            members.retain(|id| id != connection_id);
            if members.is_empty() {
                self.groups.remove(session_id);
            }
        }
    }
}

/// Realtime gateway: owns connection membership and turns client events into
/// store mutations plus broadcasts.
///
/// Every event is handled while holding the membership lock, and the store is
/// only touched inside it. Sends never block: each connection has a bounded
/// queue drained by its own writer task, and a connection that overflows it
/// is disconnected rather than left silently out of date.
#[derive(Debug)]
pub struct Gateway {
    store: Arc<SessionStore>,
    membership: Mutex<Membership>,
    outbound_buffer: usize,
}

impl Gateway {
    pub fn new(store: Arc<SessionStore>, outbound_buffer: usize) -> Self {
        Self {
            store,
            membership: Mutex::new(Membership::default()),
            outbound_buffer: outbound_buffer.max(1),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub async fn membership(&self) -> MutexGuard<'_, Membership> {
        self.membership.lock().await
    }

    /// Register a new channel. The receiver yields everything addressed to it.
    pub async fn connect(&self) -> (String, mpsc::Receiver<SendMessage>) {
        let connection_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        self.membership().await.register(connection_id.clone(), tx);
        info!("User connected: {}", connection_id);
        (connection_id, rx)
    }

    /// Route one inbound event to its handler
    pub async fn dispatch(&self, connection_id: &str, message: ReceivedMessage) {
        let mut membership = self.membership().await;
        match message {
            ReceivedMessage::Join(session_id) => {
                handle_join_message(&session_id, connection_id, self, &mut membership).await;
            }
            ReceivedMessage::CodeChange(msg) => {
                handle_code_change_message(msg, connection_id, self, &mut membership).await;
            }
            ReceivedMessage::LanguageChange(msg) => {
                handle_language_change_message(msg, connection_id, self, &mut membership).await;
            }
            ReceivedMessage::CursorPosition(msg) => {
                handle_cursor_position_message(msg, connection_id, &mut membership);
            }
        }
        self.evict_lagged(&mut membership).await;
    }

    /// Tear down a channel and drop it from every session that still lists it.
    ///
    /// Safe to call more than once for the same connection.
    pub async fn disconnect(&self, connection_id: &str) {
        let mut membership = self.membership().await;
        if self.release(&mut membership, connection_id).await {
            info!("User disconnected: {}", connection_id);
        } else {
            debug!("Duplicate disconnect for {}", connection_id);
        }
        self.evict_lagged(&mut membership).await;
    }

    pub async fn connection_count(&self) -> usize {
        self.membership().await.channels.len()
    }

    /// Remove a connection and tell each affected session once.
    /// Returns false if the connection was not live.
    async fn release(&self, membership: &mut Membership, connection_id: &str) -> bool {
        let channel = membership.unregister(connection_id);
        let was_live = channel.is_some();

        // Last total per session, so a session is announced once even if it
        // listed the connection more than once
        let mut changed: HashMap<String, usize> = HashMap::new();
        if let Some(session_id) = channel.and_then(|c| c.session_id) {
            if let Some(total) = self.store.remove_participant(&session_id, connection_id).await {
                changed.insert(session_id, total);
            }
        }
        // Scan every other session too, so no stale participant survives
        changed.extend(self.store.remove_participant_everywhere(connection_id).await);

        for (session_id, total) in changed {
            membership.leave_group(&session_id, connection_id);
            let left = SendMessage::UserLeft(PresenceMessage {
                participant_id: connection_id.to_string(),
                total_participants: total,
            });
            let notified = membership.broadcast(&session_id, &left, None);
            info!(
                "User {} left session {} ({} remaining, {} notified)",
                connection_id, session_id, total, notified
            );
        }
        was_live
    }

    /// Disconnect every connection whose queue overflowed. Dropping the
    /// channel closes its writer task, which closes the socket.
    async fn evict_lagged(&self, membership: &mut Membership) {
        while let Some(connection_id) = membership.lagged.pop() {
            if self.release(membership, &connection_id).await {
                warn!("Disconnected lagging connection {}", connection_id);
            }
        }
    }
}
