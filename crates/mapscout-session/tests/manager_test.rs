//! Job manager behavior against a scripted runner and an in-memory ledger.

use mapscout_core::progress::ProgressSink;
use mapscout_core::types::{BusinessRecord, SessionId, UserId};
use mapscout_credits::{CreditLedger, MemoryLedger};
use mapscout_session::{
    JobFailure, JobManager, JobRunner, SessionError, SessionStatus, SessionStore,
};
use std::sync::Arc;
use std::time::Duration;

const JOB_COST: u64 = 10;
const STARTING_BALANCE: u64 = 50;

/// Runner that returns a canned outcome after reporting some progress.
struct ScriptedRunner {
    outcome: std::sync::Mutex<Option<Result<Vec<BusinessRecord>, JobFailure>>>,
}

impl ScriptedRunner {
    fn succeeding(records: Vec<BusinessRecord>) -> Self {
        Self {
            outcome: std::sync::Mutex::new(Some(Ok(records))),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            outcome: std::sync::Mutex::new(Some(Err(JobFailure {
                message: message.to_string(),
                detail: "scripted failure".to_string(),
            }))),
        }
    }
}

#[async_trait::async_trait]
impl JobRunner for ScriptedRunner {
    async fn run(
        &self,
        _query: &str,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<BusinessRecord>, JobFailure> {
        progress.report("Navigating to search results", 5).await;
        progress.report("Extraction complete", 100).await;
        self.outcome
            .lock()
            .expect("outcome lock")
            .take()
            .expect("runner invoked once")
    }
}

fn sample_records() -> Vec<BusinessRecord> {
    let mut record = BusinessRecord::new("Bakkerij Vermeulen", "Oudegracht 12, Utrecht");
    record.push_email("orders@vermeulen.nl");
    vec![record]
}

async fn seeded_ledger(user: &UserId) -> Arc<MemoryLedger> {
    let ledger = Arc::new(MemoryLedger::new());
    ledger.seed(user.clone(), STARTING_BALANCE).await;
    ledger
}

async fn wait_for_terminal(manager: &JobManager, id: &SessionId) -> SessionStatus {
    for _ in 0..200 {
        let snap = manager.status(id).await.expect("status");
        if snap.status.is_terminal() {
            return snap.status;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session never reached a terminal state");
}

#[tokio::test]
async fn insufficient_credits_rejects_with_no_session() {
    let user = UserId::new("broke").expect("valid user id");
    let ledger = Arc::new(MemoryLedger::new());
    ledger.seed(user.clone(), JOB_COST - 1).await;

    let manager = JobManager::new(
        SessionStore::new(),
        ledger.clone(),
        Arc::new(ScriptedRunner::succeeding(Vec::new())),
        JOB_COST,
    );

    let err = manager
        .submit(user.clone(), "bakeries in Utrecht")
        .await
        .expect_err("should reject");
    assert!(matches!(err, SessionError::Ledger(_)));

    // Balance untouched, no session created
    assert_eq!(ledger.balance(&user).await.expect("balance"), JOB_COST - 1);
    assert!(manager.store().is_empty().await);
}

#[tokio::test]
async fn empty_query_is_rejected_before_any_debit() {
    let user = UserId::new("alice").expect("valid user id");
    let ledger = seeded_ledger(&user).await;

    let manager = JobManager::new(
        SessionStore::new(),
        ledger.clone(),
        Arc::new(ScriptedRunner::succeeding(Vec::new())),
        JOB_COST,
    );

    let err = manager
        .submit(user.clone(), "   ")
        .await
        .expect_err("should reject");
    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(
        ledger.balance(&user).await.expect("balance"),
        STARTING_BALANCE
    );
}

#[tokio::test]
async fn successful_job_keeps_debit_and_records_usage() {
    let user = UserId::new("alice").expect("valid user id");
    let ledger = seeded_ledger(&user).await;

    let manager = JobManager::new(
        SessionStore::new(),
        ledger.clone(),
        Arc::new(ScriptedRunner::succeeding(sample_records())),
        JOB_COST,
    );

    let receipt = manager
        .submit(user.clone(), "bakeries in Utrecht")
        .await
        .expect("submit");
    assert_eq!(receipt.remaining_credits, STARTING_BALANCE - JOB_COST);

    let status = wait_for_terminal(&manager, &receipt.session_id).await;
    assert_eq!(status, SessionStatus::Completed);

    let snap = manager.status(&receipt.session_id).await.expect("status");
    assert_eq!(snap.progress, 100);
    assert!(snap.error.is_none());
    let results = snap.results.expect("results present");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Bakkerij Vermeulen");

    // Debit stands, usage recorded
    assert_eq!(
        ledger.balance(&user).await.expect("balance"),
        STARTING_BALANCE - JOB_COST
    );
    let usage = ledger.usage_for(&user).await.expect("usage");
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].query, "bakeries in Utrecht");
    assert_eq!(usage[0].credits_used, JOB_COST);
    assert_eq!(usage[0].result_count, 1);
    assert_eq!(usage[0].session_id, receipt.session_id);
}

#[tokio::test]
async fn failed_job_refunds_the_debit() {
    let user = UserId::new("alice").expect("valid user id");
    let ledger = seeded_ledger(&user).await;

    let manager = JobManager::new(
        SessionStore::new(),
        ledger.clone(),
        Arc::new(ScriptedRunner::failing(
            "No businesses were found for this search.",
        )),
        JOB_COST,
    );

    let receipt = manager
        .submit(user.clone(), "bakeries on the moon")
        .await
        .expect("submit");

    let status = wait_for_terminal(&manager, &receipt.session_id).await;
    assert_eq!(status, SessionStatus::Failed);

    let snap = manager.status(&receipt.session_id).await.expect("status");
    assert_eq!(
        snap.error.as_deref(),
        Some("No businesses were found for this search.")
    );
    assert!(snap.results.is_none());

    // Full refund, no usage record
    assert_eq!(
        ledger.balance(&user).await.expect("balance"),
        STARTING_BALANCE
    );
    assert!(ledger.usage_for(&user).await.expect("usage").is_empty());
}

#[tokio::test]
async fn refund_fires_at_most_once() {
    let user = UserId::new("alice").expect("valid user id");
    let ledger = seeded_ledger(&user).await;
    let store = SessionStore::new();

    let manager = JobManager::new(
        store.clone(),
        ledger.clone(),
        Arc::new(ScriptedRunner::failing("browser crashed")),
        JOB_COST,
    );

    let receipt = manager
        .submit(user.clone(), "bakeries in Utrecht")
        .await
        .expect("submit");
    wait_for_terminal(&manager, &receipt.session_id).await;

    // A late duplicate failure must not trigger a second refund
    assert!(!store.fail(&receipt.session_id, "late duplicate").await);
    assert_eq!(
        ledger.balance(&user).await.expect("balance"),
        STARTING_BALANCE
    );
}

#[tokio::test]
async fn progress_reports_reach_the_session() {
    let user = UserId::new("alice").expect("valid user id");
    let ledger = seeded_ledger(&user).await;

    let manager = JobManager::new(
        SessionStore::new(),
        ledger,
        Arc::new(ScriptedRunner::succeeding(Vec::new())),
        JOB_COST,
    );

    let receipt = manager
        .submit(user, "bakeries in Utrecht")
        .await
        .expect("submit");
    wait_for_terminal(&manager, &receipt.session_id).await;

    let snap = manager.status(&receipt.session_id).await.expect("status");
    // Completion overwrites the last runner report
    assert_eq!(snap.message, "Extraction complete");
    assert_eq!(snap.progress, 100);
}

#[tokio::test]
async fn completed_sessions_expire_after_retention() {
    let user = UserId::new("alice").expect("valid user id");
    let ledger = seeded_ledger(&user).await;
    let store = SessionStore::new();

    let manager = JobManager::new(
        store.clone(),
        ledger,
        Arc::new(ScriptedRunner::succeeding(Vec::new())),
        JOB_COST,
    );

    let receipt = manager
        .submit(user, "bakeries in Utrecht")
        .await
        .expect("submit");
    wait_for_terminal(&manager, &receipt.session_id).await;

    let later = chrono::Utc::now() + chrono::Duration::hours(2);
    let removed = store
        .sweep_expired_at(later, Duration::from_secs(3600))
        .await;
    assert_eq!(removed, 1);

    assert!(matches!(
        manager.status(&receipt.session_id).await,
        Err(SessionError::UnknownSession(_))
    ));
}
