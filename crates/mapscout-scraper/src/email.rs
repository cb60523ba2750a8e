//! Two-tier email discovery.
//!
//! Tier 1 scans the current detail page for free-text email addresses.
//! Tier 2 runs only when tier 1 found nothing and a website URL exists: it
//! visits the website, treats `mailto:` links as authoritative, falls back to
//! free-text scanning of the body, and finally probes a short list of likely
//! contact-page paths. An unreachable or erroring website degrades to an
//! empty list; email discovery never fails a job.

use crate::error::ScrapeError;
use mapscout_browser::PageActions;
use mapscout_core::types::{EmailProvenance, MAX_EMAILS_PER_RECORD};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use url::Url;

/// Contact-style subpaths probed in order when the website front page
/// yields nothing.
pub const CONTACT_PATHS: [&str; 3] = ["/contact", "/contact-us", "/about"];

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

/// Domains whose addresses are platform-internal, never a business contact.
const EXCLUDED_DOMAINS: [&str; 5] = [
    "example.com",
    "sentry.io",
    "wixpress.com",
    "gstatic.com",
    "google.com",
];

/// Whether an address is an obvious non-business contact.
#[must_use]
pub fn is_excluded(email: &str) -> bool {
    let lowered = email.to_lowercase();
    if lowered.starts_with("test@") || lowered.starts_with("support@") {
        return true;
    }
    if lowered.contains("no-reply") || lowered.contains("noreply") {
        return true;
    }
    let Some(domain) = lowered.rsplit('@').next() else {
        return true;
    };
    EXCLUDED_DOMAINS
        .iter()
        .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
}

/// Scan free text for plausible business email addresses.
///
/// Returns lowercased addresses in order of appearance, deduplicated and
/// capped, with the exclusion list applied.
#[must_use]
pub fn scan_text(text: &str) -> Vec<String> {
    let found = EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.').to_lowercase())
        .filter(|email| !is_excluded(email));
    dedupe_cap(found)
}

fn dedupe_cap(emails: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for email in emails {
        if out.len() >= MAX_EMAILS_PER_RECORD {
            break;
        }
        if !out.contains(&email) {
            out.push(email);
        }
    }
    out
}

/// Discovers business emails on a detail page and, failing that, on the
/// business website.
pub struct EmailDiscovery {
    nav_timeout: Duration,
}

impl EmailDiscovery {
    /// Create a discovery pass with the given per-navigation timeout.
    #[must_use]
    pub fn new(nav_timeout: Duration) -> Self {
        Self { nav_timeout }
    }

    /// Run both tiers. The page is expected to currently show the detail view.
    pub async fn discover(
        &self,
        page: &dyn PageActions,
        website: Option<&str>,
    ) -> (Vec<String>, EmailProvenance) {
        // Tier 1: the detail page itself
        match page.body_text().await {
            Ok(body) => {
                let emails = scan_text(&body);
                if !emails.is_empty() {
                    return (emails, EmailProvenance::ResultsPage);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read detail page body for email scan");
            }
        }

        // Tier 2: the business website
        let Some(website) = website else {
            return (Vec::new(), EmailProvenance::ResultsPage);
        };
        let emails = self.scan_website(page, website).await;
        if emails.is_empty() {
            // The tag says where an email was found; nothing was
            return (Vec::new(), EmailProvenance::ResultsPage);
        }
        (emails, EmailProvenance::WebsiteScan)
    }

    async fn scan_website(&self, page: &dyn PageActions, website: &str) -> Vec<String> {
        if page.navigate(website, self.nav_timeout).await.is_err() {
            let unreachable = ScrapeError::WebsiteUnreachable {
                url: website.to_string(),
            };
            tracing::warn!(error = %unreachable, "skipping email scan");
            return Vec::new();
        }

        if let Some(emails) = self.scan_current_page(page).await {
            return emails;
        }

        for path in CONTACT_PATHS {
            let Some(target) = join_path(website, path) else {
                continue;
            };
            if page.navigate(&target, self.nav_timeout).await.is_err() {
                tracing::debug!(url = %target, "contact path unreachable");
                continue;
            }
            if let Some(emails) = self.scan_current_page(page).await {
                return emails;
            }
        }
        Vec::new()
    }

    /// Scan the page currently shown: `mailto:` links first (authoritative),
    /// then free-text. Returns `None` when the page yields nothing.
    async fn scan_current_page(&self, page: &dyn PageActions) -> Option<Vec<String>> {
        match page.extract_attr_all("a[href^='mailto:']", "href").await {
            Ok(hrefs) => {
                let mailto = dedupe_cap(
                    hrefs
                        .iter()
                        .flat_map(|href| parse_mailto(href))
                        .filter(|email| !is_excluded(email)),
                );
                if !mailto.is_empty() {
                    return Some(mailto);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "mailto scan failed");
            }
        }

        match page.body_text().await {
            Ok(body) => {
                let emails = scan_text(&body);
                (!emails.is_empty()).then_some(emails)
            }
            Err(e) => {
                tracing::debug!(error = %e, "body text scan failed");
                None
            }
        }
    }
}

/// Parse the address list out of a `mailto:` href, lowercased.
fn parse_mailto(href: &str) -> Vec<String> {
    let Some(rest) = href.strip_prefix("mailto:") else {
        return Vec::new();
    };
    let addresses = rest.split('?').next().unwrap_or_default();
    addresses
        .split(',')
        .map(|a| a.trim().to_lowercase())
        .filter(|a| a.contains('@'))
        .collect()
}

fn join_path(base: &str, path: &str) -> Option<String> {
    let parsed = Url::parse(base).ok()?;
    parsed.join(path).ok().map(|u| u.to_string())
}
