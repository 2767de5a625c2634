//! The browser-page seam used by tests, hooks and capturers

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// An open page in a browser session
///
/// Selectors are CSS selectors. Interactions wait for their target using the
/// session's default timeout; predicates (`is_visible`, `count`, ...) answer
/// immediately from the current DOM.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate and wait for the load to finish
    async fn goto(&self, url: &str) -> Result<()>;

    /// Step back in session history
    async fn go_back(&self) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Replace the value of an input
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Click the `index`-th match of `selector` (0-based)
    async fn click_nth(&self, selector: &str, index: usize) -> Result<()>;

    async fn is_visible(&self, selector: &str) -> Result<bool>;

    async fn is_enabled(&self, selector: &str) -> Result<bool>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Trimmed inner text of every match, in document order
    async fn texts(&self, selector: &str) -> Result<Vec<String>>;

    /// Trimmed inner text of the first match
    async fn text_content(&self, selector: &str) -> Result<String> {
        self.texts(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::ShopError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    /// Wait until `selector` is present in the DOM
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Write a PNG capture of the page to `path`
    async fn screenshot(&self, path: &Path, full_page: bool) -> Result<()>;

    /// Close the page; later calls fail
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
