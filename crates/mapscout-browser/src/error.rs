use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("script evaluation failed: {0}")]
    EvaluationError(String),

    #[error("timeout: {0}")]
    Timeout(String),
}
