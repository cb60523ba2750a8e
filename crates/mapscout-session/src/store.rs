//! Concurrent in-memory session store.
//!
//! Sessions are polled by callers and written by worker tasks; the store
//! mediates both behind an async read-write lock. Terminal transitions
//! (`complete`, `fail`) report whether they actually fired, which is what
//! makes the refund protocol idempotent: only the caller that observes the
//! transition performs the side effect.

use crate::error::{Result, SessionError};
use crate::session::{ScrapeSession, SessionSnapshot, SessionStatus};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use mapscout_core::progress::ProgressSink;
use mapscout_core::types::{BusinessRecord, SessionId, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Shared session registry.
///
/// Cloning is cheap; all clones observe the same sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, ScrapeSession>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending session and return its ID.
    pub async fn create(&self, user_id: UserId, query: impl Into<String>) -> SessionId {
        let session = ScrapeSession::new(user_id, query);
        let id = session.id.clone();
        self.sessions.write().await.insert(id.clone(), session);
        id
    }

    /// Transition a pending session to running.
    pub async fn mark_running(&self, id: &SessionId) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(id) {
            if !session.status.is_terminal() {
                session.status = SessionStatus::Running;
                session.message = "Starting extraction".to_string();
            }
        }
    }

    /// Record a progress update. Ignored once the session is terminal.
    pub async fn set_progress(&self, id: &SessionId, message: &str, progress: u8) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(id) {
            if !session.status.is_terminal() {
                session.message = message.to_string();
                session.progress = progress.min(100);
            }
        }
    }

    /// Transition to `Completed` with results.
    ///
    /// Returns true if this call performed the transition; false if the
    /// session was already terminal or unknown.
    pub async fn complete(&self, id: &SessionId, results: Vec<BusinessRecord>) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(id) else {
            return false;
        };
        if session.status.is_terminal() {
            return false;
        }
        session.status = SessionStatus::Completed;
        session.message = "Extraction complete".to_string();
        session.progress = 100;
        session.results = Some(results);
        true
    }

    /// Transition to `Failed` with a user-facing message.
    ///
    /// Returns true if this call performed the transition; the refund in the
    /// job manager is gated on that return value so it fires at most once.
    pub async fn fail(&self, id: &SessionId, message: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(id) else {
            return false;
        };
        if session.status.is_terminal() {
            return false;
        }
        session.status = SessionStatus::Failed;
        session.message = "Extraction failed".to_string();
        session.error = Some(message.to_string());
        true
    }

    /// Externally visible view of one session.
    ///
    /// # Errors
    /// Returns [`SessionError::UnknownSession`] for IDs never created or
    /// already swept.
    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(ScrapeSession::snapshot)
            .ok_or_else(|| SessionError::UnknownSession(id.clone()))
    }

    /// Number of sessions currently tracked.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store tracks no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions created more than `retention` ago, judged against `now`.
    ///
    /// Eviction is age-based regardless of state; this bounds memory growth
    /// in a long-lived process, and pollers must not assume a session id
    /// stays available past the retention window. Returns the number of
    /// sessions removed.
    pub async fn sweep_expired_at(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> usize {
        let retention = ChronoDuration::from_std(retention).unwrap_or(ChronoDuration::MAX);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.created_at < retention);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "swept expired sessions");
        }
        removed
    }

    /// Spawn a background task sweeping expired sessions on an interval.
    pub fn spawn_sweeper(&self, interval: Duration, retention: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick is immediate
            loop {
                ticker.tick().await;
                store.sweep_expired_at(Utc::now(), retention).await;
            }
        });
    }

    /// A progress sink bound to one session.
    #[must_use]
    pub fn handle(&self, id: SessionId) -> SessionHandle {
        SessionHandle {
            store: self.clone(),
            id,
        }
    }
}

/// Routes pipeline progress reports into one session's record.
#[derive(Clone)]
pub struct SessionHandle {
    store: SessionStore,
    id: SessionId,
}

#[async_trait::async_trait]
impl ProgressSink for SessionHandle {
    async fn report(&self, message: &str, progress: u8) {
        self.store.set_progress(&self.id, message, progress).await;
    }
}
