//! Test support: a scripted page implementing [`PageActions`].
//!
//! Lets pipeline and session tests drive the full extraction flow without a
//! browser. Each reachable URL is described by a [`MockDoc`]; match counts and
//! scroll extents can vary per scroll round to script stall behavior.

use crate::actions::PageActions;
use crate::error::{BrowserError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted contents of one page.
#[derive(Debug, Clone, Default)]
pub struct MockDoc {
    /// Document title
    pub title: String,
    /// Visible body text
    pub body: String,
    /// Text returned for a selector
    pub texts: HashMap<String, String>,
    /// Attribute values returned for a (selector, attribute) pair, in DOM order
    pub attrs: HashMap<(String, String), Vec<String>>,
    /// Match counts per selector, indexed by scroll round (last entry repeats)
    pub count_rounds: HashMap<String, Vec<usize>>,
    /// Scroll extents returned by successive `scroll_to_bottom` calls (last repeats)
    pub scroll_extents: Vec<i64>,
    /// If set, `click_by_text` succeeds and the page switches to this URL
    pub accept_click_goto: Option<String>,
    /// If set, element reads (`extract_text`, `extract_attr`) fail
    pub fail_reads: bool,
}

impl MockDoc {
    /// Convenience: a doc with just a title and body.
    pub fn with_text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    fn count_for(&self, selector: &str, round: usize) -> usize {
        if let Some(rounds) = self.count_rounds.get(selector) {
            let idx = round.min(rounds.len().saturating_sub(1));
            return rounds.get(idx).copied().unwrap_or(0);
        }
        if let Some(values) = self
            .attrs
            .iter()
            .find(|((sel, _), _)| sel == selector)
            .map(|(_, v)| v)
        {
            return values.len();
        }
        usize::from(self.texts.contains_key(selector))
    }
}

struct MockState {
    current: String,
    scroll_calls: usize,
    visited: Vec<String>,
    clicked: Vec<String>,
}

/// A scripted page for tests.
pub struct MockPage {
    docs: HashMap<String, MockDoc>,
    failing: HashSet<String>,
    state: Mutex<MockState>,
}

impl MockPage {
    /// Create a page whose first navigation target must be one of `docs`.
    #[must_use]
    pub fn new(docs: HashMap<String, MockDoc>) -> Self {
        Self {
            docs,
            failing: HashSet::new(),
            state: Mutex::new(MockState {
                current: String::new(),
                scroll_calls: 0,
                visited: Vec::new(),
                clicked: Vec::new(),
            }),
        }
    }

    /// Mark a URL as unreachable (navigation fails).
    #[must_use]
    pub fn with_failing_url(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// URLs navigated to, in order.
    pub fn visited(&self) -> Vec<String> {
        self.state.lock().expect("mock state lock").visited.clone()
    }

    /// Selectors clicked, in order.
    pub fn clicked(&self) -> Vec<String> {
        self.state.lock().expect("mock state lock").clicked.clone()
    }

    fn current_doc(&self) -> Option<&MockDoc> {
        let current = self.state.lock().expect("mock state lock").current.clone();
        self.docs.get(&current)
    }
}

#[async_trait::async_trait]
impl PageActions for MockPage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        let mut state = self.state.lock().expect("mock state lock");
        state.visited.push(url.to_string());
        if self.failing.contains(url) || !self.docs.contains_key(url) {
            return Err(BrowserError::NavigationError(format!("unreachable: {url}")));
        }
        state.current = url.to_string();
        state.scroll_calls = 0;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<()> {
        let round = self.state.lock().expect("mock state lock").scroll_calls;
        match self.current_doc() {
            Some(doc) if doc.count_for(selector, round) > 0 => Ok(()),
            _ => Err(BrowserError::Timeout(format!(
                "wait_for_selector {selector}"
            ))),
        }
    }

    async fn match_count(&self, selector: &str) -> Result<usize> {
        let round = self.state.lock().expect("mock state lock").scroll_calls;
        Ok(self
            .current_doc()
            .map_or(0, |doc| doc.count_for(selector, round)))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let round = self.state.lock().expect("mock state lock").scroll_calls;
        let found = self
            .current_doc()
            .is_some_and(|doc| doc.count_for(selector, round) > 0);
        if !found {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        let mut state = self.state.lock().expect("mock state lock");
        state.clicked.push(selector.to_string());
        Ok(())
    }

    async fn click_by_text(&self, _selector: &str, _needles: &[String]) -> Result<bool> {
        let goto = self.current_doc().and_then(|d| d.accept_click_goto.clone());
        match goto {
            Some(url) => {
                let mut state = self.state.lock().expect("mock state lock");
                state.current = url;
                state.scroll_calls = 0;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn extract_text(&self, selector: &str) -> Result<Option<String>> {
        let Some(doc) = self.current_doc() else {
            return Ok(None);
        };
        if doc.fail_reads {
            return Err(BrowserError::EvaluationError("node detached".to_string()));
        }
        Ok(doc.texts.get(selector).cloned())
    }

    async fn extract_attr(&self, selector: &str, attr: &str) -> Result<Option<String>> {
        let Some(doc) = self.current_doc() else {
            return Ok(None);
        };
        if doc.fail_reads {
            return Err(BrowserError::EvaluationError("node detached".to_string()));
        }
        Ok(doc
            .attrs
            .get(&(selector.to_string(), attr.to_string()))
            .and_then(|v| v.first().cloned()))
    }

    async fn extract_attr_all(&self, selector: &str, attr: &str) -> Result<Vec<String>> {
        let Some(doc) = self.current_doc() else {
            return Ok(Vec::new());
        };
        if doc.fail_reads {
            return Err(BrowserError::EvaluationError("node detached".to_string()));
        }
        Ok(doc
            .attrs
            .get(&(selector.to_string(), attr.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self.current_doc().map_or(String::new(), |d| d.body.clone()))
    }

    async fn title(&self) -> Result<String> {
        Ok(self
            .current_doc()
            .map_or(String::new(), |d| d.title.clone()))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().expect("mock state lock").current.clone())
    }

    async fn scroll_to_bottom(&self, _selector: &str) -> Result<i64> {
        let extent = self.current_doc().map_or(-1, |doc| {
            let calls = self.state.lock().expect("mock state lock").scroll_calls;
            if doc.scroll_extents.is_empty() {
                -1
            } else {
                let idx = calls.min(doc.scroll_extents.len() - 1);
                doc.scroll_extents[idx]
            }
        });
        self.state.lock().expect("mock state lock").scroll_calls += 1;
        Ok(extent)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}
