//! The session record and its status machine.
//!
//! A session is created in `Pending` the moment a debit succeeds, moves to
//! `Running` when the worker picks it up, and ends in exactly one of
//! `Completed` or `Failed`. Terminal states are immutable; late writes from
//! a worker racing the sweeper are ignored.

use chrono::{DateTime, Utc};
use mapscout_core::types::{BusinessRecord, SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an extraction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Debited and queued, worker not yet started
    Pending,
    /// Worker is executing the pipeline
    Running,
    /// Finished with results (possibly an empty list)
    Completed,
    /// Finished with a user-facing error message
    Failed,
}

impl SessionStatus {
    /// Whether the status admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One extraction job as tracked by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSession {
    /// Unique session identifier handed back to the caller
    pub id: SessionId,
    /// The user the job was debited against
    pub user_id: UserId,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Current lifecycle state
    pub status: SessionStatus,
    /// Latest progress message
    pub message: String,
    /// Progress estimate, 0-100
    pub progress: u8,
    /// The free-text search query
    pub query: String,
    /// Extracted records, set only on completion
    pub results: Option<Vec<BusinessRecord>>,
    /// User-facing failure message, set only on failure
    pub error: Option<String>,
}

impl ScrapeSession {
    /// Create a fresh pending session.
    #[must_use]
    pub fn new(user_id: UserId, query: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            user_id,
            created_at: Utc::now(),
            status: SessionStatus::Pending,
            message: "Queued".to_string(),
            progress: 0,
            query: query.into(),
            results: None,
            error: None,
        }
    }

    /// The externally visible view of this session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            message: self.message.clone(),
            progress: self.progress,
            results: self.results.clone(),
            error: self.error.clone(),
        }
    }
}

/// Point-in-time view of a session returned by status queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current lifecycle state
    pub status: SessionStatus,
    /// Latest progress message
    pub message: String,
    /// Progress estimate, 0-100
    pub progress: u8,
    /// Present only when the status is `Completed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<BusinessRecord>>,
    /// Present only when the status is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
