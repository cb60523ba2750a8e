//! Core error types for the Mapscout application.
//!
//! This module defines the central error type used across all subsystems.
//! Each subsystem error is represented as a variant for clear error propagation.

use thiserror::Error;

/// Central error type for all Mapscout operations.
///
/// Each variant represents an error from a specific subsystem, allowing
/// for clear error propagation and handling across module boundaries.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Browser automation errors (launch, navigation, element not found)
    #[error("browser error: {0}")]
    Browser(String),

    /// Extraction pipeline errors (consent wall, empty result feed)
    #[error("scrape error: {0}")]
    Scrape(String),

    /// Session errors (unknown session id, illegal state transition)
    #[error("session error: {0}")]
    Session(String),

    /// Credit ledger errors (insufficient balance, unknown user)
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Validation("empty search query".to_string());
        assert_eq!(err.to_string(), "validation error: empty search query");

        let err = ConfigError::NoConfigDir;
        assert_eq!(
            err.to_string(),
            "could not determine config directory (XDG base directories not available)"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let core_err: CoreError = config_err.into();
        assert!(matches!(core_err, CoreError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
    }
}
