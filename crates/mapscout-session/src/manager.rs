//! Credit-gated job submission.
//!
//! The submission sequence is strict: validate, debit, create the session,
//! spawn the worker. A failed debit rejects the request before any session
//! state exists. On the worker side, the terminal store transition gates the
//! ledger side effect, so a refund fires at most once even if completion and
//! failure race.

use crate::error::{Result, SessionError};
use crate::runner::JobRunner;
use crate::session::SessionSnapshot;
use crate::store::SessionStore;
use chrono::Utc;
use mapscout_core::types::{SessionId, UserId};
use mapscout_credits::{CreditLedger, UsageRecord};
use std::sync::Arc;

/// What the caller gets back from a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// The session to poll for status
    pub session_id: SessionId,
    /// Balance remaining after the debit
    pub remaining_credits: u64,
}

/// Accepts jobs, charges credits, and drives them through a [`JobRunner`].
pub struct JobManager {
    store: SessionStore,
    ledger: Arc<dyn CreditLedger>,
    runner: Arc<dyn JobRunner>,
    job_cost: u64,
}

impl JobManager {
    /// Wire a manager over a store, a ledger, and a runner.
    #[must_use]
    pub fn new(
        store: SessionStore,
        ledger: Arc<dyn CreditLedger>,
        runner: Arc<dyn JobRunner>,
        job_cost: u64,
    ) -> Self {
        Self {
            store,
            ledger,
            runner,
            job_cost,
        }
    }

    /// The session store backing this manager.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Submit an extraction job for a user.
    ///
    /// Debits `job_cost` credits up front; an insufficient balance rejects
    /// the request with no session created and no balance change.
    ///
    /// # Errors
    /// Returns [`SessionError::Validation`] for an empty query and
    /// [`SessionError::Ledger`] when the debit fails.
    pub async fn submit(&self, user_id: UserId, query: &str) -> Result<SubmitReceipt> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::Validation(
                "search query must not be empty".to_string(),
            ));
        }

        self.ledger.debit(&user_id, self.job_cost).await?;
        let remaining_credits = self.ledger.balance(&user_id).await?;

        let session_id = self.store.create(user_id.clone(), query).await;
        tracing::info!(
            session_id = %session_id,
            user_id = %user_id,
            query,
            cost = self.job_cost,
            "job accepted"
        );

        self.spawn_worker(session_id.clone(), user_id, query.to_string());

        Ok(SubmitReceipt {
            session_id,
            remaining_credits,
        })
    }

    /// Status snapshot for a previously submitted job.
    ///
    /// # Errors
    /// Returns [`SessionError::UnknownSession`] for IDs never created or
    /// already swept.
    pub async fn status(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        self.store.snapshot(session_id).await
    }

    fn spawn_worker(&self, session_id: SessionId, user_id: UserId, query: String) {
        let store = self.store.clone();
        let ledger = Arc::clone(&self.ledger);
        let runner = Arc::clone(&self.runner);
        let job_cost = self.job_cost;

        tokio::spawn(async move {
            store.mark_running(&session_id).await;
            let sink = store.handle(session_id.clone());

            match runner.run(&query, &sink).await {
                Ok(records) => {
                    let result_count = records.len();
                    // Only the call that performs the terminal transition
                    // writes the usage record.
                    if store.complete(&session_id, records).await {
                        let usage = UsageRecord {
                            user_id: user_id.clone(),
                            query: query.clone(),
                            credits_used: job_cost,
                            result_count,
                            session_id: session_id.clone(),
                            timestamp: Utc::now(),
                        };
                        if let Err(e) = ledger.record_usage(usage).await {
                            tracing::error!(
                                session_id = %session_id,
                                error = %e,
                                "failed to write usage record"
                            );
                        }
                        tracing::info!(
                            session_id = %session_id,
                            result_count,
                            "job completed"
                        );
                    }
                }
                Err(failure) => {
                    tracing::warn!(
                        session_id = %session_id,
                        detail = failure.detail,
                        "job failed"
                    );
                    // The refund is gated on the terminal transition so it
                    // fires at most once per session.
                    if store.fail(&session_id, &failure.message).await {
                        if let Err(e) = ledger.credit(&user_id, job_cost).await {
                            tracing::error!(
                                session_id = %session_id,
                                user_id = %user_id,
                                error = %e,
                                "refund failed"
                            );
                        }
                    }
                }
            }
        });
    }
}
