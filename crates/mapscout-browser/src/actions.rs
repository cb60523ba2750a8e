use crate::error::Result;
use std::time::Duration;

/// Page-level browser actions consumed by the extraction pipeline.
///
/// The pipeline never talks to the browser implementation directly; every
/// network-bound operation goes through this contract so tests can drive the
/// pipeline against a scripted page.
#[async_trait::async_trait]
pub trait PageActions: Send + Sync {
    /// Navigate to a URL, bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait for a selector to appear, bounded by `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Count elements currently matching a selector.
    async fn match_count(&self, selector: &str) -> Result<usize>;

    /// Click the first element matching a selector.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Click the first element matching `selector` whose visible text contains
    /// any of `needles` (case-insensitive). Returns whether a click happened.
    async fn click_by_text(&self, selector: &str, needles: &[String]) -> Result<bool>;

    /// Extract trimmed text from the first element matching a selector.
    async fn extract_text(&self, selector: &str) -> Result<Option<String>>;

    /// Extract an attribute from the first element matching a selector.
    async fn extract_attr(&self, selector: &str, attr: &str) -> Result<Option<String>>;

    /// Extract an attribute from every element matching a selector, in DOM order.
    async fn extract_attr_all(&self, selector: &str, attr: &str) -> Result<Vec<String>>;

    /// Visible text of the page body.
    async fn body_text(&self) -> Result<String>;

    /// Current document title.
    async fn title(&self) -> Result<String>;

    /// URL the page currently shows.
    async fn current_url(&self) -> Result<String>;

    /// Scroll a container to its bottom and return its scroll extent,
    /// or -1 if the container does not exist.
    async fn scroll_to_bottom(&self, selector: &str) -> Result<i64>;

    /// Take a screenshot of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}
