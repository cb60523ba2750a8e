//! Browser automation gateway for the Mapscout extraction pipeline.
//!
//! Provides the [`PageActions`] contract the pipeline consumes, plus a
//! chromiumoxide-backed engine that launches headless Chromium and mints
//! one isolated page per extraction job.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod testing;

pub use actions::PageActions;
pub use engine::{BrowserEngine, EnginePage};
pub use error::{BrowserError, Result};
pub use fingerprint::Fingerprint;
