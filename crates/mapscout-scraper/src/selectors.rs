//! Selector chains and the fallback resolver.
//!
//! The upstream site's markup classes are unstable and unversioned, so every
//! semantic target carries an ordered list of candidate selectors. The
//! resolver probes them in priority order against the live page and accepts
//! the first that yields enough matches. Chains are data, not code: the
//! defaults below were tuned against one observed markup snapshot and can be
//! replaced from configuration without recompiling.

use mapscout_browser::PageActions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An ordered list of candidate selector expressions for one semantic target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorChain {
    /// Semantic target label, for logging
    pub target: String,
    /// Candidate CSS selectors, highest priority first
    pub candidates: Vec<String>,
}

impl SelectorChain {
    /// Build a chain from a target label and candidate list.
    pub fn new(target: impl Into<String>, candidates: &[&str]) -> Self {
        Self {
            target: target.into(),
            candidates: candidates.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// The candidate selector that won, and how many elements it matched.
#[derive(Debug, Clone)]
pub struct ResolvedSelector {
    pub selector: String,
    pub element_count: usize,
}

/// One chain per semantic field of the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Links from a result card to the business detail view
    pub result_link: SelectorChain,
    /// The scrollable results feed container
    pub feed_container: SelectorChain,
    /// Business display name on the detail view
    pub name: SelectorChain,
    /// Postal address on the detail view
    pub address: SelectorChain,
    /// Phone number on the detail view
    pub phone: SelectorChain,
    /// Website link on the detail view
    pub website: SelectorChain,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            result_link: SelectorChain::new(
                "result link",
                &[
                    "a[href*='/maps/place/']",
                    "div[role='feed'] a[href*='/place/']",
                    "a.hfpxzc",
                ],
            ),
            feed_container: SelectorChain::new(
                "results feed",
                &[
                    "div[role='feed']",
                    "div[aria-label^='Results for']",
                    "div.m6QErb[aria-label]",
                ],
            ),
            name: SelectorChain::new(
                "business name",
                &["h1.DUwDvf", "h1[class*='fontHeadline']", "h1"],
            ),
            address: SelectorChain::new(
                "address",
                &[
                    "button[data-item-id='address']",
                    "button[aria-label^='Address']",
                    "[data-tooltip='Copy address']",
                ],
            ),
            phone: SelectorChain::new(
                "phone",
                &[
                    "button[data-item-id^='phone']",
                    "button[aria-label^='Phone']",
                    "[data-tooltip='Copy phone number']",
                ],
            ),
            website: SelectorChain::new(
                "website",
                &[
                    "a[data-item-id='authority']",
                    "a[aria-label^='Website']",
                    "a[data-tooltip='Open website']",
                ],
            ),
        }
    }
}

/// Probe a chain's candidates in priority order against the live page.
///
/// Accepts the first candidate whose match count is at least `min_matches`.
/// Returns `None` on exhaustion; the caller decides whether that is fatal.
/// Probe failures (timeouts, evaluation errors) fall through to the next
/// candidate rather than propagating.
pub async fn resolve(
    page: &dyn PageActions,
    chain: &SelectorChain,
    min_matches: usize,
    probe_timeout: Duration,
) -> Option<ResolvedSelector> {
    for candidate in &chain.candidates {
        if page.wait_for_selector(candidate, probe_timeout).await.is_err() {
            tracing::debug!(
                target_field = %chain.target,
                selector = %candidate,
                "selector candidate not present, trying next"
            );
            continue;
        }
        match page.match_count(candidate).await {
            Ok(count) if count >= min_matches => {
                tracing::debug!(
                    target_field = %chain.target,
                    selector = %candidate,
                    count,
                    "selector candidate accepted"
                );
                return Some(ResolvedSelector {
                    selector: candidate.clone(),
                    element_count: count,
                });
            }
            Ok(count) => {
                tracing::debug!(
                    target_field = %chain.target,
                    selector = %candidate,
                    count,
                    min_matches,
                    "selector candidate below threshold"
                );
            }
            Err(e) => {
                tracing::debug!(
                    target_field = %chain.target,
                    selector = %candidate,
                    error = %e,
                    "selector probe failed, trying next"
                );
            }
        }
    }
    tracing::debug!(target_field = %chain.target, "selector chain exhausted");
    None
}
