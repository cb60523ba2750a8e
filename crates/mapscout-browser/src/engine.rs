use crate::actions::PageActions;
use crate::error::{BrowserError, Result};
use crate::fingerprint::Fingerprint;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures_util::stream::StreamExt;
use std::time::Duration;

/// How often `wait_for_selector` re-probes the page.
const SELECTOR_POLL_INTERVAL_MS: u64 = 100;

/// Browser automation engine.
///
/// Launches one Chromium process per engine and mints one isolated page per
/// extraction job, so navigation state never leaks between jobs.
pub struct BrowserEngine {
    browser: Browser,
    fingerprint: Fingerprint,
}

impl BrowserEngine {
    /// Launch a new browser engine with default configuration.
    pub async fn new() -> Result<Self> {
        Self::with_config(&mapscout_core::config::BrowserConfig::default()).await
    }

    /// Launch a new browser engine with specific configuration.
    pub async fn with_config(config: &mapscout_core::config::BrowserConfig) -> Result<Self> {
        let fingerprint = Fingerprint::from_config(config);

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        tracing::info!("browser engine launched (headless: {})", config.headless);

        Ok(Self {
            browser,
            fingerprint,
        })
    }

    /// Open a fresh page for one extraction job.
    pub async fn new_job_page(&self) -> Result<EnginePage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        page.set_user_agent(&self.fingerprint.user_agent)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        Ok(EnginePage { page })
    }
}

/// A chromiumoxide-backed page implementing the [`PageActions`] contract.
pub struct EnginePage {
    page: Page,
}

impl EnginePage {
    /// Close the underlying browser tab.
    pub async fn close(self) -> Result<()> {
        self.page
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn evaluate_json<T: serde::de::DeserializeOwned>(&self, expr: &str) -> Result<T> {
        self.page
            .evaluate(expr)
            .await
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl PageActions for EnginePage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout(format!("navigate {url}")))?
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(SELECTOR_POLL_INTERVAL_MS)).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| BrowserError::Timeout(format!("wait_for_selector {selector}")))
    }

    async fn match_count(&self, selector: &str) -> Result<usize> {
        let quoted = serde_json::to_string(selector)
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        let expr = format!("document.querySelectorAll({quoted}).length");
        self.evaluate_json(&expr).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn click_by_text(&self, selector: &str, needles: &[String]) -> Result<bool> {
        let quoted_selector = serde_json::to_string(selector)
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        let lowered: Vec<String> = needles.iter().map(|n| n.to_lowercase()).collect();
        let quoted_needles = serde_json::to_string(&lowered)
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        let expr = format!(
            "(() => {{\
               const needles = {quoted_needles};\
               for (const el of document.querySelectorAll({quoted_selector})) {{\
                 const text = (el.innerText || el.textContent || '').toLowerCase();\
                 if (needles.some(n => text.includes(n))) {{ el.click(); return true; }}\
               }}\
               return false;\
             }})()"
        );
        self.evaluate_json(&expr).await
    }

    async fn extract_text(&self, selector: &str) -> Result<Option<String>> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(None);
        };
        let text = element
            .inner_text()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
    }

    async fn extract_attr(&self, selector: &str, attr: &str) -> Result<Option<String>> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(None);
        };
        element
            .attribute(attr)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn extract_attr_all(&self, selector: &str, attr: &str) -> Result<Vec<String>> {
        let elements = self.page.find_elements(selector).await.unwrap_or_default();
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(value) = element
                .attribute(attr)
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?
            {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn body_text(&self) -> Result<String> {
        self.evaluate_json("document.body ? document.body.innerText : ''")
            .await
    }

    async fn title(&self) -> Result<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn scroll_to_bottom(&self, selector: &str) -> Result<i64> {
        let quoted = serde_json::to_string(selector)
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        let expr = format!(
            "(() => {{\
               const el = document.querySelector({quoted});\
               if (!el) return -1;\
               el.scrollTop = el.scrollHeight;\
               return el.scrollHeight;\
             }})()"
        );
        self.evaluate_json(&expr).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.page
            .screenshot(ScreenshotParams::builder().build())
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Chrome browser to be installed"]
    async fn test_engine_launch_and_page() {
        let engine = BrowserEngine::new().await.expect("launch browser");
        let page = engine.new_job_page().await.expect("open page");
        page.navigate("about:blank", Duration::from_secs(5))
            .await
            .expect("navigate");
        page.close().await.expect("close page");
    }
}
