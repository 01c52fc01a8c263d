use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Participant, Session};

/// In-memory authority over every session.
///
/// All reads and mutations go through this type; the single lock is the
/// serialization boundary for concurrent edits, so the last write applied
/// under it wins.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a session with a fresh UUID v4 id and default contents
    pub async fn create(&self) -> Session {
        let session = Session::new(Uuid::new_v4().to_string());
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        info!("Created session {} ({} in store)", session.id, sessions.len());
        session
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Overwrite the buffer. Returns false when the session does not exist.
    pub async fn set_code(&self, id: &str, code: String) -> bool {
        self.update(id, |session| session.code = code).await
    }

    /// Overwrite the language. The value is not checked against the known set.
    pub async fn set_language(&self, id: &str, language: String) -> bool {
        self.update(id, |session| session.language = language).await
    }

    /// Append a participant and return the new total, `None` if the session is unknown.
    ///
    /// Connection ids are unique per transport connection, so no deduplication
    /// happens here.
    pub async fn add_participant(&self, id: &str, connection_id: &str) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        session.participants.push(Participant {
            id: connection_id.to_string(),
            joined_at: Utc::now(),
        });
        session.touch();
        Some(session.participant_count())
    }

    /// Remove a participant and return the new total.
    ///
    /// `None` when the session or the participant is gone, so removing twice is harmless.
    pub async fn remove_participant(&self, id: &str, connection_id: &str) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        Self::remove_from(session, connection_id)
    }

    /// Remove a connection from every session listing it.
    ///
    /// Returns `(session id, new total)` for each session whose membership changed.
    pub async fn remove_participant_everywhere(&self, connection_id: &str) -> Vec<(String, usize)> {
        let mut sessions = self.sessions.write().await;
        sessions
            .values_mut()
            .filter_map(|session| {
                Self::remove_from(session, connection_id).map(|count| (session.id.clone(), count))
            })
            .collect()
    }

    /// Drop sessions that have no participants and saw no activity for `ttl`
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let ttl = match chrono::Duration::from_std(ttl) {
            Ok(ttl) => ttl,
            Err(_) => return 0,
        };
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            !session.participants.is_empty() || session.last_activity > cutoff
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle session(s), {} remaining", evicted, sessions.len());
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Total participants across all sessions
    pub async fn participant_total(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .map(Session::participant_count)
            .sum()
    }

    async fn update(&self, id: &str, apply: impl FnOnce(&mut Session)) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) => {
                apply(session);
                session.touch();
                true
            }
            None => {
                debug!("Ignoring mutation for unknown session {}", id);
                false
            }
        }
    }

    fn remove_from(session: &mut Session, connection_id: &str) -> Option<usize> {
        let index = session.participants.iter().position(|p| p.id == connection_id)?;
        session.participants.remove(index);
        session.touch();
        Some(session.participant_count())
    }
}

/// Periodically evict idle, empty sessions from `store`
pub fn spawn_retention_sweeper(store: Arc<SessionStore>, ttl: Duration, every: Duration) -> JoinHandle<()> {
    info!("Session retention enabled: idle TTL {:?}, sweep every {:?}", ttl, every);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            debug!("Retention sweep evicted {} session(s)", evicted);
        }
    })
}
