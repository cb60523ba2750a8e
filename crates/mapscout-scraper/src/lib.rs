//! Mapscout Scraper - Map-search extraction pipeline.
//!
//! This crate drives a headless-browser page through the full extraction
//! sequence against an unversioned, frequently-changing results surface:
//!
//! 1. Navigate to the search results (with retry for transient failures)
//! 2. Dismiss the cookie-consent wall if one appears
//! 3. Scroll-load the results feed until a target count or growth stalls
//! 4. Harvest detail links and visit each sequentially
//! 5. Extract name/address/phone/website per business
//! 6. Discover emails on the detail page, falling back to the business website
//!
//! Every selector is a [`SelectorChain`] of candidates tried in priority
//! order, because the upstream markup classes are unstable. Per-item failures
//! are logged and skipped; only consent deadlock, an empty feed, or a fatal
//! gateway error fails the whole job.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod consent;
pub mod detail;
pub mod email;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod selectors;

// Re-export commonly used types
pub use consent::{ConsentConfig, ConsentHandler};
pub use detail::DetailExtractor;
pub use email::EmailDiscovery;
pub use error::{Result, ScrapeError};
pub use loader::ResultLoader;
pub use pipeline::ScrapePipeline;
pub use selectors::{resolve, ResolvedSelector, SelectorChain, SelectorConfig};
