use mapscout_core::types::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient credits for user {user_id}: balance {balance}, required {required}")]
    InsufficientCredits {
        user_id: UserId,
        balance: u64,
        required: u64,
    },

    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    #[error("ledger backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_credits_display() {
        let err = LedgerError::InsufficientCredits {
            user_id: UserId::new("alice").expect("valid user id"),
            balance: 5,
            required: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains('5'));
        assert!(msg.contains("10"));
    }
}
