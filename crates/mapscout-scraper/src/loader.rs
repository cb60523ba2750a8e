//! Scroll-driven result loading.
//!
//! The results feed materializes incrementally as it scrolls. Each round
//! counts the currently materialized result links, scrolls the feed container
//! to its bottom, waits a settle interval, and compares the container's
//! scroll extent with the previous round. Unchanged extent across consecutive
//! rounds increments a stall counter; exceeding the stall threshold or the
//! round budget stops the loop early. Partial results are acceptable; zero
//! results after exhaustion is not.

use crate::error::{Result, ScrapeError};
use crate::selectors::{resolve, SelectorConfig};
use mapscout_browser::PageActions;
use mapscout_core::config::ScrapingConfig;
use std::time::Duration;

/// Loads results by scrolling the feed until a target count or growth stalls.
pub struct ResultLoader<'a> {
    selectors: &'a SelectorConfig,
    scraping: &'a ScrapingConfig,
    probe_timeout: Duration,
}

impl<'a> ResultLoader<'a> {
    /// Create a loader over the given selector and pipeline configuration.
    #[must_use]
    pub fn new(
        selectors: &'a SelectorConfig,
        scraping: &'a ScrapingConfig,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            selectors,
            scraping,
            probe_timeout,
        }
    }

    /// Count the result links currently materialized on the page.
    async fn count_results(&self, page: &dyn PageActions) -> usize {
        resolve(page, &self.selectors.result_link, 1, self.probe_timeout)
            .await
            .map_or(0, |r| r.element_count)
    }

    /// Scroll-load the feed until `target` results exist or growth stalls.
    ///
    /// Returns the number of materialized results.
    ///
    /// # Errors
    /// Returns [`ScrapeError::NoResultsFound`] when no results materialized
    /// after the loop exhausted its rounds.
    pub async fn load(&self, page: &dyn PageActions, target: usize) -> Result<usize> {
        let feed_selector = resolve(page, &self.selectors.feed_container, 1, self.probe_timeout)
            .await
            .map(|r| r.selector);

        let mut count = 0;
        let mut last_extent: Option<i64> = None;
        let mut stall_rounds: u32 = 0;

        for round in 0..self.scraping.max_load_rounds {
            count = self.count_results(page).await;
            tracing::debug!(round, count, target, "result loading round");

            if count >= target {
                break;
            }

            let Some(feed) = feed_selector.as_deref() else {
                tracing::warn!("results feed container not found, cannot scroll further");
                break;
            };

            let extent = page.scroll_to_bottom(feed).await?;
            tokio::time::sleep(Duration::from_millis(self.scraping.settle_delay_ms)).await;

            if last_extent == Some(extent) {
                stall_rounds += 1;
                tracing::debug!(stall_rounds, extent, "scroll extent unchanged");
                if stall_rounds > self.scraping.stall_threshold {
                    tracing::info!(
                        count,
                        target,
                        "result loading stalled, accepting partial results"
                    );
                    count = self.count_results(page).await;
                    break;
                }
            } else {
                stall_rounds = 0;
            }
            last_extent = Some(extent);
        }

        if count == 0 {
            return Err(ScrapeError::NoResultsFound);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapscout_browser::testing::{MockDoc, MockPage};
    use std::collections::HashMap;

    const PROBE: Duration = Duration::from_millis(20);

    fn fast_config() -> ScrapingConfig {
        ScrapingConfig {
            settle_delay_ms: 1,
            ..ScrapingConfig::default()
        }
    }

    async fn page_with_feed(counts: Vec<usize>, extents: Vec<i64>) -> MockPage {
        let mut doc = MockDoc::default();
        doc.count_rounds
            .insert("a[href*='/maps/place/']".to_string(), counts);
        doc.count_rounds
            .insert("div[role='feed']".to_string(), vec![1]);
        doc.scroll_extents = extents;
        let mut docs = HashMap::new();
        docs.insert("u".to_string(), doc);
        let page = MockPage::new(docs);
        page.navigate("u", PROBE).await.expect("navigate");
        page
    }

    #[tokio::test]
    async fn test_reaches_target() {
        let page = page_with_feed(vec![5, 12, 20], vec![1000, 2000, 3000]).await;
        let selectors = SelectorConfig::default();
        let config = fast_config();
        let loader = ResultLoader::new(&selectors, &config, PROBE);

        let count = loader.load(&page, 20).await.expect("load");
        assert_eq!(count, 20);
    }

    #[tokio::test]
    async fn test_stall_accepts_partial_results() {
        // Feed grows to 10 then stalls: scenario "target 20, exhausts at 10"
        let page = page_with_feed(
            vec![4, 8, 10, 10, 10, 10],
            vec![1000, 2000, 2500, 2500, 2500, 2500],
        )
        .await;
        let selectors = SelectorConfig::default();
        let config = fast_config();
        let loader = ResultLoader::new(&selectors, &config, PROBE);

        let count = loader.load(&page, 20).await.expect("load");
        assert_eq!(count, 10);
    }

    #[tokio::test]
    async fn test_zero_results_is_fatal() {
        let page = page_with_feed(vec![0], vec![500, 500, 500, 500]).await;
        let selectors = SelectorConfig::default();
        let config = ScrapingConfig {
            max_load_rounds: 4,
            ..fast_config()
        };
        let loader = ResultLoader::new(&selectors, &config, PROBE);

        let err = loader.load(&page, 20).await.expect_err("should fail");
        assert!(matches!(err, ScrapeError::NoResultsFound));
    }

    #[tokio::test]
    async fn test_round_budget_bounds_loop() {
        // Growing extents forever; the round budget must stop the loop
        let extents: Vec<i64> = (1..=50).map(|i| i * 1000).collect();
        let counts: Vec<usize> = (1..=50).collect();
        let page = page_with_feed(counts, extents).await;
        let selectors = SelectorConfig::default();
        let config = ScrapingConfig {
            max_load_rounds: 3,
            ..fast_config()
        };
        let loader = ResultLoader::new(&selectors, &config, PROBE);

        let count = loader.load(&page, 1000).await.expect("load");
        assert!(count <= 4);
    }
}
