//! Session-layer error types.

use mapscout_core::types::SessionId;
use mapscout_credits::LedgerError;
use thiserror::Error;

/// Errors raised by job submission and status queries.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Debit, refund, or usage bookkeeping failed
    #[error("credit ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The session was never created or has been swept
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// Rejected input (empty query)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias using `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;
