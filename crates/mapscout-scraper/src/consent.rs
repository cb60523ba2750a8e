//! Cookie/consent interstitial handling.
//!
//! The upstream surface intermittently serves a consent wall before the
//! results page. Detection is text-based (locale-aware phrases in the title
//! or body, or a consent redirect in the URL); dismissal tries visible
//! controls by accept-vocabulary text first, then a small set of attribute
//! selectors. Failure to dismiss is not fatal by itself; the pipeline only
//! raises [`ScrapeError::ConsentUnresolved`] when the wall is still
//! unmistakably present afterwards.

use crate::error::Result;
use mapscout_browser::PageActions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settle time after a consent click, letting the redirect land.
const POST_CLICK_SETTLE_MS: u64 = 500;

/// Consent-wall vocabulary and fallback selectors. Kept as data since the
/// phrasing is locale-dependent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    /// Phrases marking the page as a consent wall (lowercase)
    pub wall_markers: Vec<String>,
    /// URL fragment marking the consent redirect host
    pub wall_url_fragment: String,
    /// Accept-button vocabulary (lowercase, substring match)
    pub accept_labels: Vec<String>,
    /// Selector covering clickable consent controls
    pub control_selector: String,
    /// Attribute-based fallbacks when no textual match is found
    pub fallback_selectors: Vec<String>,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            wall_markers: vec![
                "before you continue".to_string(),
                "voordat je verdergaat".to_string(),
                "bevor sie fortfahren".to_string(),
                "avant d'accéder".to_string(),
            ],
            wall_url_fragment: "consent.google.".to_string(),
            accept_labels: vec![
                "accept all".to_string(),
                "alles accepteren".to_string(),
                "alle akzeptieren".to_string(),
                "tout accepter".to_string(),
                "i agree".to_string(),
                "akkoord".to_string(),
            ],
            control_selector: "button, div[role='button'], input[type='submit']".to_string(),
            fallback_selectors: vec![
                "button[aria-label*='Accept']".to_string(),
                "form[action*='consent'] button".to_string(),
                "#L2AGLb".to_string(),
            ],
        }
    }
}

/// Detects and dismisses the consent interstitial.
pub struct ConsentHandler {
    config: ConsentConfig,
}

impl ConsentHandler {
    /// Create a handler with the given vocabulary.
    #[must_use]
    pub fn new(config: ConsentConfig) -> Self {
        Self { config }
    }

    /// Whether the page currently shows the consent wall.
    pub async fn is_wall(&self, page: &dyn PageActions) -> Result<bool> {
        let url = page.current_url().await?;
        if url.contains(&self.config.wall_url_fragment) {
            return Ok(true);
        }

        let title = page.title().await?.to_lowercase();
        let body = page.body_text().await?.to_lowercase();
        Ok(self
            .config
            .wall_markers
            .iter()
            .any(|marker| title.contains(marker) || body.contains(marker)))
    }

    /// Dismiss the consent wall if one is present.
    ///
    /// Returns whether a wall was detected and a dismissal was attempted
    /// successfully. Not every invocation shows the wall; absence is the
    /// common case and returns `Ok(false)`.
    pub async fn dismiss_if_present(&self, page: &dyn PageActions) -> Result<bool> {
        if !self.is_wall(page).await? {
            return Ok(false);
        }
        tracing::info!("consent wall detected, attempting dismissal");

        if page
            .click_by_text(&self.config.control_selector, &self.config.accept_labels)
            .await?
        {
            tracing::info!("consent dismissed via accept vocabulary");
            tokio::time::sleep(Duration::from_millis(POST_CLICK_SETTLE_MS)).await;
            return Ok(true);
        }

        for selector in &self.config.fallback_selectors {
            if page.click(selector).await.is_ok() {
                tracing::info!(selector = %selector, "consent dismissed via fallback selector");
                tokio::time::sleep(Duration::from_millis(POST_CLICK_SETTLE_MS)).await;
                return Ok(true);
            }
        }

        tracing::warn!("consent wall present but no dismiss control matched");
        Ok(false)
    }
}
