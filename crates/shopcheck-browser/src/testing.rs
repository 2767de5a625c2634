//! In-memory [`Page`] for tests
//!
//! `ScriptedPage` keeps a tiny DOM of selector -> element entries. Clicks and
//! navigations can run scripted reactions that rewrite that DOM, which is
//! enough to stand in for simple page flows without a browser.

use crate::error::{Result, ShopError};
use crate::page::Page;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Bytes written for every scripted capture
pub const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Elements matching one selector
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    /// Inner text of each match; the match count is `texts.len()`
    pub texts: Vec<String>,
    pub visible: bool,
    pub enabled: bool,
}

impl ScriptedElement {
    pub fn text(text: &str) -> Self {
        Self::many(&[text])
    }

    pub fn many(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            visible: true,
            enabled: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Mutable page state visible to reactions
#[derive(Debug, Default)]
pub struct ScriptedDom {
    pub url: String,
    pub elements: HashMap<String, ScriptedElement>,
    /// Last value filled into each selector
    pub values: HashMap<String, String>,
    /// URLs visited before the current one
    pub history: Vec<String>,
}

impl ScriptedDom {
    pub fn set(&mut self, selector: &str, element: ScriptedElement) {
        self.elements.insert(selector.to_string(), element);
    }

    pub fn remove(&mut self, selector: &str) {
        self.elements.remove(selector);
    }

    pub fn value(&self, selector: &str) -> &str {
        self.values.get(selector).map(String::as_str).unwrap_or("")
    }

    /// Move to `url`, remembering the current page for `go_back`
    pub fn navigate(&mut self, url: &str) {
        let previous = std::mem::replace(&mut self.url, url.to_string());
        self.history.push(previous);
    }

    /// Drop every element and filled value
    pub fn clear(&mut self) {
        self.elements.clear();
        self.values.clear();
    }
}

/// Reaction to a click: receives the DOM and the index of the clicked match
pub type ClickReaction = Arc<dyn Fn(&mut ScriptedDom, usize) + Send + Sync>;

/// Reaction to a navigation: receives the DOM with `url` already updated
pub type NavigationReaction = Arc<dyn Fn(&mut ScriptedDom) + Send + Sync>;

#[derive(Default)]
struct ScriptedState {
    dom: ScriptedDom,
    closed: bool,
    screenshot_error: Option<String>,
    clicks: Vec<String>,
    screenshots: Vec<(PathBuf, bool)>,
    on_navigate: Option<NavigationReaction>,
    on_click: HashMap<String, ClickReaction>,
}

/// Scripted, browser-free [`Page`]
#[derive(Default)]
pub struct ScriptedPage {
    state: Mutex<ScriptedState>,
}

impl ScriptedPage {
    pub fn new(url: &str) -> Self {
        let page = Self::default();
        page.lock().dom.url = url.to_string();
        page
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedState> {
        self.state.lock().expect("scripted page lock poisoned")
    }

    fn live(&self) -> Result<MutexGuard<'_, ScriptedState>> {
        let state = self.lock();
        if state.closed {
            return Err(ShopError::SessionClosed("scripted page closed".to_string()));
        }
        Ok(state)
    }

    /// Builder form of [`ScriptedPage::set_element`]
    pub fn with_element(self, selector: &str, element: ScriptedElement) -> Self {
        self.set_element(selector, element);
        self
    }

    pub fn set_element(&self, selector: &str, element: ScriptedElement) {
        self.lock().dom.set(selector, element);
    }

    pub fn remove_element(&self, selector: &str) {
        self.lock().dom.remove(selector);
    }

    pub fn set_url(&self, url: &str) {
        self.lock().dom.url = url.to_string();
    }

    /// Run `reaction` after every `goto` and `go_back`
    pub fn on_navigate(&self, reaction: impl Fn(&mut ScriptedDom) + Send + Sync + 'static) {
        self.lock().on_navigate = Some(Arc::new(reaction));
    }

    /// Run `reaction` whenever `selector` is clicked
    pub fn on_click(
        &self,
        selector: &str,
        reaction: impl Fn(&mut ScriptedDom, usize) + Send + Sync + 'static,
    ) {
        self.lock()
            .on_click
            .insert(selector.to_string(), Arc::new(reaction));
    }

    /// Make every later capture fail with `message`
    pub fn fail_screenshots(&self, message: &str) {
        self.lock().screenshot_error = Some(message.to_string());
    }

    /// Selectors clicked so far, formatted as `selector[index]`
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    /// Captures taken so far as `(path, full_page)`
    pub fn screenshots(&self) -> Vec<(PathBuf, bool)> {
        self.lock().screenshots.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn element(state: &ScriptedState, selector: &str) -> Result<ScriptedElement> {
        state
            .dom
            .elements
            .get(selector)
            .cloned()
            .ok_or_else(|| ShopError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

#[async_trait]
impl Page for ScriptedPage {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.live()?;
        state.dom.navigate(url);
        if let Some(reaction) = state.on_navigate.clone() {
            reaction(&mut state.dom);
        }
        Ok(())
    }

    async fn go_back(&self) -> Result<()> {
        let mut state = self.live()?;
        if let Some(previous) = state.dom.history.pop() {
            state.dom.url = previous;
            if let Some(reaction) = state.on_navigate.clone() {
                reaction(&mut state.dom);
            }
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.live()?.dom.url.clone())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.live()?;
        Self::element(&state, selector)?;
        state
            .dom
            .values
            .insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.click_nth(selector, 0).await
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        let mut state = self.live()?;
        let element = Self::element(&state, selector)?;
        if index >= element.texts.len() {
            return Err(ShopError::ElementNotFound {
                selector: format!("{} (index {})", selector, index),
            });
        }

        state.clicks.push(format!("{}[{}]", selector, index));
        if let Some(reaction) = state.on_click.get(selector).cloned() {
            reaction(&mut state.dom, index);
        }
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let state = self.live()?;
        Ok(state
            .dom
            .elements
            .get(selector)
            .is_some_and(|e| e.visible && !e.texts.is_empty()))
    }

    async fn is_enabled(&self, selector: &str) -> Result<bool> {
        let state = self.live()?;
        Ok(state.dom.elements.get(selector).is_some_and(|e| e.enabled))
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let state = self.live()?;
        Ok(state
            .dom
            .elements
            .get(selector)
            .map_or(0, |e| e.texts.len()))
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let state = self.live()?;
        Ok(state
            .dom
            .elements
            .get(selector)
            .map(|e| e.texts.iter().map(|t| t.trim().to_string()).collect())
            .unwrap_or_default())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        let state = self.live()?;
        if state.dom.elements.contains_key(selector) {
            Ok(())
        } else {
            Err(ShopError::Timeout {
                what: format!("element {}", selector),
                waited_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> Result<()> {
        {
            let state = self.live()?;
            if let Some(message) = &state.screenshot_error {
                return Err(ShopError::ScreenshotFailed(message.clone()));
            }
        }

        tokio::fs::write(path, PNG_SIGNATURE).await?;
        self.lock().screenshots.push((path.to_path_buf(), full_page));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.lock().closed = true;
        Ok(())
    }
}
