use mapscout_core::config::BrowserConfig;

/// Browser identity presented to the upstream site.
///
/// Mapscout does not try to defeat anti-automation measures; the fingerprint
/// is a descriptive user-agent plus a fixed desktop viewport.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Fingerprint {
    /// Build a fingerprint from the browser configuration.
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            viewport_width: config.window_width,
            viewport_height: config.window_height,
        }
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::from_config(&BrowserConfig::default())
    }
}
