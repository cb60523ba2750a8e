use mapscout_browser::BrowserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("consent wall detected but could not be dismissed")]
    ConsentUnresolved,

    #[error("no business results found after exhausting load rounds")]
    NoResultsFound,

    #[error("detail extraction failed for {url}: {reason}")]
    DetailExtractionFailed { url: String, reason: String },

    #[error("website unreachable: {url}")]
    WebsiteUnreachable { url: String },

    #[error("browser gateway error: {0}")]
    Gateway(#[from] BrowserError),
}

impl ScrapeError {
    /// Whether this error is local to one result item.
    ///
    /// Item-local errors are logged and skipped; they never fail the job.
    #[must_use]
    pub fn is_item_local(&self) -> bool {
        matches!(
            self,
            Self::DetailExtractionFailed { .. } | Self::WebsiteUnreachable { .. }
        )
    }

    /// Short human-readable message for the status interface.
    ///
    /// Never exposes debug formatting of the underlying error chain.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ConsentUnresolved => {
                "The search page showed a consent screen that could not be dismissed.".to_string()
            }
            Self::NoResultsFound => "No businesses were found for this search.".to_string(),
            Self::DetailExtractionFailed { .. } => {
                "A business page could not be read and was skipped.".to_string()
            }
            Self::WebsiteUnreachable { .. } => {
                "A business website could not be reached.".to_string()
            }
            Self::Gateway(_) => "The browser automation service failed.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
