//! Configuration management for Mapscout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The pipeline's empirically tuned
//! constants (result target, stall threshold, settle delays) live here
//! as data, since the upstream markup they were tuned against is
//! unversioned and subject to change.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/mapscout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction pipeline settings
    pub scraping: ScrapingConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Credit accounting settings
    pub credits: CreditsConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MAPSCOUT_HEADLESS`: Override browser headless mode (true/false)
    /// - `MAPSCOUT_JOB_COST`: Override the per-job credit cost
    /// - `MAPSCOUT_RESULT_TARGET`: Override the default result target
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("MAPSCOUT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                config.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("MAPSCOUT_JOB_COST") {
            if let Ok(cost) = val.parse() {
                config.credits.job_cost = cost;
                tracing::debug!("Override credits.job_cost from env: {}", cost);
            }
        }

        if let Ok(val) = std::env::var("MAPSCOUT_RESULT_TARGET") {
            if let Ok(target) = val.parse() {
                config.scraping.result_target = target;
                tracing::debug!("Override scraping.result_target from env: {}", target);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/mapscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "mapscout", "mapscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/mapscout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "mapscout", "mapscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Extraction pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// How many results to try to materialize before harvesting links
    pub result_target: usize,
    /// Maximum scroll-to-load rounds before giving up
    pub max_load_rounds: u32,
    /// Consecutive rounds without scroll-extent growth before stopping
    pub stall_threshold: u32,
    /// Settle interval after each scroll, in milliseconds
    pub settle_delay_ms: u64,
    /// Delay between detail-page visits, in milliseconds
    pub inter_item_delay_ms: u64,
    /// Session retention window, in seconds
    pub session_retention_secs: u64,
    /// How often the retention sweep runs, in seconds
    pub sweep_interval_secs: u64,
    /// Attempts for the initial search navigation
    pub navigation_attempts: u32,
    /// Base delay between navigation retries, in milliseconds
    pub navigation_retry_delay_ms: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            result_target: 20,
            max_load_rounds: 10,
            stall_threshold: 2,
            settle_delay_ms: 1500,
            inter_item_delay_ms: 800,
            session_retention_secs: 3600,
            sweep_interval_secs: 60,
            navigation_attempts: 3,
            navigation_retry_delay_ms: 2000,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Initial search navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Detail-page navigation timeout in seconds
    pub detail_timeout_secs: u64,
    /// Per-candidate selector probe timeout in milliseconds
    pub selector_probe_timeout_ms: u64,
    /// Consent probing timeout in milliseconds
    pub consent_timeout_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            detail_timeout_secs: 15,
            selector_probe_timeout_ms: 2000,
            consent_timeout_ms: 3000,
            user_agent: "Mapscout/0.1.0 (+https://github.com/mapscout/mapscout)".to_string(),
        }
    }
}

/// Credit accounting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditsConfig {
    /// Credits reserved per extraction job
    pub job_cost: u64,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self { job_cost: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scraping.result_target, 20);
        assert_eq!(config.scraping.stall_threshold, 2);
        assert!(config.browser.headless);
        assert_eq!(config.credits.job_cost, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[scraping]"));
        assert!(toml_str.contains("[browser]"));
        assert!(toml_str.contains("[credits]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.scraping.result_target, config.scraping.result_target);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.scraping.result_target = 50;
        config.credits.job_cost = 25;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.scraping.result_target, 50);
        assert_eq!(loaded.credits.job_cost, 25);
    }

    #[test]
    fn test_partial_config() {
        // Partial TOML configs fill in from defaults
        let toml_str = r#"
[scraping]
result_target = 40

[credits]
job_cost = 5
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scraping.result_target, 40);
        assert_eq!(config.credits.job_cost, 5);
        // These should be defaults
        assert_eq!(config.scraping.max_load_rounds, 10);
        assert!(config.browser.headless);
    }
}
