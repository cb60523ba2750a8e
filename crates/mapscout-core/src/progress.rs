//! Progress-reporting contract between the pipeline and the session layer.
//!
//! The pipeline owns no session state; it reports stage transitions through
//! this sink and the session layer decides how to record them.

/// Receives stage-by-stage progress from a running extraction job.
///
/// Implementations must be cheap to call; the pipeline reports after every
/// stage and after every detail page.
#[async_trait::async_trait]
pub trait ProgressSink: Send + Sync {
    /// Record a human-readable progress message and a 0-100 estimate.
    async fn report(&self, message: &str, progress: u8);
}

/// A sink that discards all reports. Useful in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait::async_trait]
impl ProgressSink for NullSink {
    async fn report(&self, _message: &str, _progress: u8) {}
}
