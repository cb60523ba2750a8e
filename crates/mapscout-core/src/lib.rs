//! Mapscout Core - Foundation crate for the Mapscout extraction service.
//!
//! This crate provides the shared types, error handling, and configuration
//! management that all other Mapscout crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and records (`SessionId`, `UserId`, `BusinessRecord`)
//! - [`progress`] - Progress-reporting contract between the pipeline and the session layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod progress;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, CreditsConfig, ScrapingConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use progress::{NullSink, ProgressSink};
pub use types::{BusinessRecord, EmailProvenance, SessionId, UserId};
