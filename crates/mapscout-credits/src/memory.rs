//! In-memory ledger implementation for testing and development.

use crate::error::{LedgerError, Result};
use crate::ledger::{CreditLedger, UsageRecord};
use mapscout_core::types::UserId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory credit ledger.
///
/// Useful for testing and development. Not suitable for production as
/// balances are lost on restart.
#[derive(Default)]
pub struct MemoryLedger {
    balances: RwLock<HashMap<UserId, u64>>,
    usage: RwLock<Vec<UsageRecord>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user with an initial balance.
    pub async fn seed(&self, user_id: UserId, balance: u64) {
        self.balances.write().await.insert(user_id, balance);
    }
}

#[async_trait::async_trait]
impl CreditLedger for MemoryLedger {
    async fn debit(&self, user_id: &UserId, amount: u64) -> Result<()> {
        let mut balances = self.balances.write().await;
        let balance = balances
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::UnknownUser(user_id.clone()))?;
        if *balance < amount {
            return Err(LedgerError::InsufficientCredits {
                user_id: user_id.clone(),
                balance: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        tracing::debug!(user = %user_id, amount, remaining = *balance, "credits debited");
        Ok(())
    }

    async fn credit(&self, user_id: &UserId, amount: u64) -> Result<()> {
        let mut balances = self.balances.write().await;
        let balance = balances
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::UnknownUser(user_id.clone()))?;
        *balance += amount;
        tracing::debug!(user = %user_id, amount, balance = *balance, "credits refunded");
        Ok(())
    }

    async fn balance(&self, user_id: &UserId) -> Result<u64> {
        self.balances
            .read()
            .await
            .get(user_id)
            .copied()
            .ok_or_else(|| LedgerError::UnknownUser(user_id.clone()))
    }

    async fn record_usage(&self, record: UsageRecord) -> Result<()> {
        self.usage.write().await.push(record);
        Ok(())
    }

    async fn usage_for(&self, user_id: &UserId) -> Result<Vec<UsageRecord>> {
        Ok(self
            .usage
            .read()
            .await
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect())
    }
}
