//! The contract between the job manager and the extraction pipeline.
//!
//! The manager never talks to a browser directly; it hands a query and a
//! progress sink to a [`JobRunner`] and interprets the outcome. Tests swap
//! in scripted runners, production uses [`PipelineRunner`] over a live
//! browser engine.

use mapscout_browser::BrowserEngine;
use mapscout_core::config::AppConfig;
use mapscout_core::progress::ProgressSink;
use mapscout_core::types::BusinessRecord;
use mapscout_scraper::ScrapePipeline;
use std::sync::Arc;

/// Terminal failure of one job.
///
/// `message` is safe to show to the caller; `detail` carries the underlying
/// error text for logs only.
#[derive(Debug, Clone)]
pub struct JobFailure {
    /// User-facing description of what went wrong
    pub message: String,
    /// Internal detail for tracing
    pub detail: String,
}

/// Executes one extraction job from query to records.
#[async_trait::async_trait]
pub trait JobRunner: Send + Sync {
    /// Run the job, reporting progress along the way.
    async fn run(
        &self,
        query: &str,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<Vec<BusinessRecord>, JobFailure>;
}

/// Production runner: one fresh browser page per job, closed when done.
pub struct PipelineRunner {
    engine: Arc<BrowserEngine>,
    config: AppConfig,
}

impl PipelineRunner {
    /// Create a runner over a shared browser engine.
    #[must_use]
    pub fn new(engine: Arc<BrowserEngine>, config: AppConfig) -> Self {
        Self { engine, config }
    }
}

#[async_trait::async_trait]
impl JobRunner for PipelineRunner {
    async fn run(
        &self,
        query: &str,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<Vec<BusinessRecord>, JobFailure> {
        let page = self.engine.new_job_page().await.map_err(|e| JobFailure {
            message: "The browser automation service failed.".to_string(),
            detail: e.to_string(),
        })?;

        let pipeline = ScrapePipeline::new(self.config.clone());
        let outcome = pipeline.run(&page, query, progress).await;

        if let Err(e) = page.close().await {
            tracing::warn!(error = %e, "failed to close job page");
        }

        outcome.map_err(|e| JobFailure {
            message: e.user_message(),
            detail: e.to_string(),
        })
    }
}
