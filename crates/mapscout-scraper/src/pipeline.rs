//! The sequential extraction pipeline.
//!
//! One pipeline run owns one page and executes the stages strictly in order:
//! navigate, consent, load, harvest, then a per-link detail+email loop with a
//! fixed inter-item delay. Item-local failures are logged and skipped;
//! consent deadlock, an empty feed, and fatal gateway errors terminate the
//! run. The pipeline reports progress through a [`ProgressSink`] after every
//! stage and every item; it holds no session state of its own.

use crate::consent::{ConsentConfig, ConsentHandler};
use crate::detail::DetailExtractor;
use crate::email::EmailDiscovery;
use crate::error::{Result, ScrapeError};
use crate::loader::ResultLoader;
use crate::selectors::{resolve, SelectorConfig};
use mapscout_browser::PageActions;
use mapscout_core::config::AppConfig;
use mapscout_core::progress::ProgressSink;
use mapscout_core::types::BusinessRecord;
use std::time::Duration;

const SEARCH_URL_BASE: &str = "https://www.google.com/maps/search/";

/// Progress share reserved for the per-item loop (the rest covers setup stages).
const ITEM_PROGRESS_START: u8 = 40;
const ITEM_PROGRESS_END: u8 = 95;

/// Runs the full extraction sequence for one job.
pub struct ScrapePipeline {
    selectors: SelectorConfig,
    consent: ConsentConfig,
    config: AppConfig,
}

impl ScrapePipeline {
    /// Create a pipeline with default selector chains and consent vocabulary.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            selectors: SelectorConfig::default(),
            consent: ConsentConfig::default(),
            config,
        }
    }

    /// Replace the selector chains (e.g. loaded from configuration).
    #[must_use]
    pub fn with_selectors(mut self, selectors: SelectorConfig) -> Self {
        self.selectors = selectors;
        self
    }

    /// Replace the consent vocabulary.
    #[must_use]
    pub fn with_consent(mut self, consent: ConsentConfig) -> Self {
        self.consent = consent;
        self
    }

    fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.config.browser.selector_probe_timeout_ms)
    }

    /// Build the search URL for a free-text query.
    #[must_use]
    pub fn search_url(query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{SEARCH_URL_BASE}{encoded}?hl=en")
    }

    /// Navigate to the search results, retrying transient gateway failures
    /// with linear backoff.
    async fn navigate_with_retry(&self, page: &dyn PageActions, url: &str) -> Result<()> {
        let timeout = Duration::from_secs(self.config.browser.navigation_timeout_secs);
        let attempts = self.config.scraping.navigation_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match page.navigate(url, timeout).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        url,
                        attempt = attempt + 1,
                        attempts,
                        error = %e,
                        "search navigation failed"
                    );
                    last_error = Some(e);
                    if attempt < attempts - 1 {
                        let delay = Duration::from_millis(
                            self.config.scraping.navigation_retry_delay_ms
                                * u64::from(attempt + 1),
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(ScrapeError::Gateway(last_error.expect(
            "last_error is Some after at least one failed attempt",
        )))
    }

    /// Harvest detail links from the loaded feed, deduplicated in feed order.
    async fn harvest_links(&self, page: &dyn PageActions, limit: usize) -> Result<Vec<String>> {
        let Some(resolved) =
            resolve(page, &self.selectors.result_link, 1, self.probe_timeout()).await
        else {
            return Ok(Vec::new());
        };

        let hrefs = page.extract_attr_all(&resolved.selector, "href").await?;
        let mut links: Vec<String> = Vec::new();
        for href in hrefs {
            if links.len() >= limit {
                break;
            }
            let absolute = if href.starts_with('/') {
                format!("https://www.google.com{href}")
            } else {
                href
            };
            if !links.contains(&absolute) {
                links.push(absolute);
            }
        }
        Ok(links)
    }

    /// Run the pipeline for one query against one page.
    ///
    /// Returns the extracted records; an empty list is a valid completion.
    pub async fn run(
        &self,
        page: &dyn PageActions,
        query: &str,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<BusinessRecord>> {
        let scraping = &self.config.scraping;
        let target = scraping.result_target;

        progress.report("Navigating to search results", 5).await;
        self.navigate_with_retry(page, &Self::search_url(query)).await?;

        progress.report("Checking for consent screen", 10).await;
        let consent = ConsentHandler::new(self.consent.clone());
        consent.dismiss_if_present(page).await?;
        if consent.is_wall(page).await? {
            return Err(ScrapeError::ConsentUnresolved);
        }

        progress.report("Loading results", 15).await;
        let loader = ResultLoader::new(&self.selectors, scraping, self.probe_timeout());
        let loaded = loader.load(page, target).await?;
        tracing::info!(query, loaded, target, "result feed loaded");

        progress.report("Collecting business links", 30).await;
        let links = self.harvest_links(page, target).await?;
        if links.is_empty() {
            return Err(ScrapeError::NoResultsFound);
        }

        let detail = DetailExtractor::new(
            &self.selectors,
            Duration::from_secs(self.config.browser.detail_timeout_secs),
            self.probe_timeout(),
        );
        let discovery =
            EmailDiscovery::new(Duration::from_secs(self.config.browser.detail_timeout_secs));

        let mut records = Vec::new();
        let total = links.len();
        for (index, link) in links.iter().enumerate() {
            let span = u32::from(ITEM_PROGRESS_END - ITEM_PROGRESS_START);
            #[allow(clippy::cast_possible_truncation)]
            let step = ((index as u32 + 1) * span / total as u32).min(span) as u8;
            let pct = ITEM_PROGRESS_START + step;
            progress
                .report(
                    &format!("Extracting business {} of {}", index + 1, total),
                    pct,
                )
                .await;

            match detail.extract(page, link).await {
                Ok(Some(mut record)) => {
                    let (emails, provenance) =
                        discovery.discover(page, record.website.as_deref()).await;
                    record.provenance = provenance;
                    for email in emails {
                        record.push_email(email);
                    }
                    records.push(record);
                }
                Ok(None) => {
                    tracing::debug!(link, "record dropped: missing required fields");
                }
                Err(e) if e.is_item_local() => {
                    tracing::warn!(link, error = %e, "skipping item after local failure");
                }
                Err(e) => return Err(e),
            }

            if index + 1 < total {
                tokio::time::sleep(Duration::from_millis(scraping.inter_item_delay_ms)).await;
            }
        }

        progress.report("Extraction complete", 100).await;
        tracing::info!(query, records = records.len(), "pipeline finished");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encoding() {
        let url = ScrapePipeline::search_url("bakeries in Utrecht");
        assert!(url.starts_with(SEARCH_URL_BASE));
        assert!(!url.contains(' '));
        assert!(url.ends_with("?hl=en"));
    }
}
