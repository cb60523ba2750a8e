//! Per-business detail extraction.
//!
//! Visits one harvested result link and pulls the structured fields out of
//! the detail view. Each field has its own selector chain because the same
//! semantic data appears under different attributes depending on rollout.
//! A record missing name or address is not an error; it is dropped and the
//! pipeline continues with the next link.

use crate::error::{Result, ScrapeError};
use crate::selectors::{resolve, SelectorConfig};
use mapscout_browser::PageActions;
use mapscout_core::types::BusinessRecord;
use std::time::Duration;
use url::Url;

/// Extracts one [`BusinessRecord`] per detail page.
pub struct DetailExtractor<'a> {
    selectors: &'a SelectorConfig,
    nav_timeout: Duration,
    probe_timeout: Duration,
}

impl<'a> DetailExtractor<'a> {
    /// Create an extractor over the given selector configuration.
    #[must_use]
    pub fn new(
        selectors: &'a SelectorConfig,
        nav_timeout: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            selectors,
            nav_timeout,
            probe_timeout,
        }
    }

    async fn field_text(
        &self,
        page: &dyn PageActions,
        chain: &crate::selectors::SelectorChain,
    ) -> Result<Option<String>> {
        let Some(resolved) = resolve(page, chain, 1, self.probe_timeout).await else {
            return Ok(None);
        };
        Ok(page.extract_text(&resolved.selector).await?)
    }

    /// Navigate to a detail link and extract the business fields.
    ///
    /// Returns `Ok(None)` when name or address is empty post-extraction;
    /// the caller skips the item rather than failing the job.
    ///
    /// # Errors
    /// Returns [`ScrapeError::DetailExtractionFailed`] when the detail page
    /// cannot be reached or its fields cannot be read. Item-local; the
    /// pipeline swallows it. A gateway error on one detail page never
    /// escalates past that item.
    pub async fn extract(
        &self,
        page: &dyn PageActions,
        link: &str,
    ) -> Result<Option<BusinessRecord>> {
        page.navigate(link, self.nav_timeout)
            .await
            .map_err(|e| ScrapeError::DetailExtractionFailed {
                url: link.to_string(),
                reason: e.to_string(),
            })?;

        self.extract_fields(page, link).await.map_err(|e| match e {
            ScrapeError::Gateway(inner) => ScrapeError::DetailExtractionFailed {
                url: link.to_string(),
                reason: inner.to_string(),
            },
            other => other,
        })
    }

    /// Field reads stay gateway-typed here; [`Self::extract`] re-wraps them
    /// as item-local before they reach the pipeline.
    async fn extract_fields(
        &self,
        page: &dyn PageActions,
        link: &str,
    ) -> Result<Option<BusinessRecord>> {
        let name = self.field_text(page, &self.selectors.name).await?;
        let address = self.field_text(page, &self.selectors.address).await?;

        let (Some(name), Some(address)) = (name, address) else {
            tracing::debug!(link, "detail page missing name or address, dropping");
            return Ok(None);
        };

        let mut record = BusinessRecord::new(name, address);
        if !record.has_required_fields() {
            tracing::debug!(link, "detail page fields empty after trim, dropping");
            return Ok(None);
        }

        record.phone = self.field_text(page, &self.selectors.phone).await?;

        if let Some(resolved) = resolve(page, &self.selectors.website, 1, self.probe_timeout).await
        {
            record.website = page
                .extract_attr(&resolved.selector, "href")
                .await?
                .map(|href| unwrap_redirect(&href))
                .and_then(|href| normalize_website(&href));
        }

        Ok(Some(record))
    }
}

/// Unwrap a Google redirect wrapper (`/url?q=<dest>`) to its true destination.
///
/// Non-wrapper URLs pass through unchanged.
#[must_use]
pub fn unwrap_redirect(href: &str) -> String {
    let Ok(parsed) = Url::parse(href) else {
        return href.to_string();
    };
    let is_wrapper = parsed
        .host_str()
        .is_some_and(|h| h.contains("google."))
        && parsed.path() == "/url";
    if !is_wrapper {
        return href.to_string();
    }
    parsed
        .query_pairs()
        .find(|(k, _)| k == "q" || k == "url")
        .map_or_else(|| href.to_string(), |(_, v)| v.into_owned())
}

/// Normalize a website URL to include a scheme; returns `None` when the
/// value is not a usable URL at all.
#[must_use]
pub fn normalize_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate).ok()?;
    parsed.host_str()?;
    Some(candidate)
}
