//! The credit-ledger contract consumed by the job manager.
//!
//! The protocol around each job: `debit` before the session is created
//! (insufficient balance rejects the request with no partial state),
//! `credit` exactly once on terminal failure, and a usage record appended
//! on success. Idempotency of the refund is the job manager's concern; the
//! ledger only has to apply what it is told.

use crate::error::Result;
use chrono::{DateTime, Utc};
use mapscout_core::types::{SessionId, UserId};
use serde::{Deserialize, Serialize};

/// Append-only audit entry written when a job completes successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Who ran the job
    pub user_id: UserId,
    /// The free-text search query
    pub query: String,
    /// Credits consumed
    pub credits_used: u64,
    /// Number of business records extracted
    pub result_count: usize,
    /// The session the job ran under
    pub session_id: SessionId,
    /// When the record was written
    pub timestamp: DateTime<Utc>,
}

/// Storage contract for prepaid credits.
///
/// Implementations must support safe concurrent access; concurrent jobs for
/// the same user may debit and credit simultaneously.
#[async_trait::async_trait]
pub trait CreditLedger: Send + Sync {
    /// Reserve `amount` credits from a user's balance.
    ///
    /// # Errors
    /// Returns [`crate::LedgerError::InsufficientCredits`] when the balance
    /// does not cover the amount; the balance is left untouched.
    async fn debit(&self, user_id: &UserId, amount: u64) -> Result<()>;

    /// Return `amount` credits to a user's balance.
    async fn credit(&self, user_id: &UserId, amount: u64) -> Result<()>;

    /// Current balance for a user.
    async fn balance(&self, user_id: &UserId) -> Result<u64>;

    /// Append a usage record for audit/history purposes.
    async fn record_usage(&self, record: UsageRecord) -> Result<()>;

    /// Usage records for a user, oldest first.
    async fn usage_for(&self, user_id: &UserId) -> Result<Vec<UsageRecord>>;
}
