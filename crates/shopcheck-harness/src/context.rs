//! Per-test context handed to every phase

use shopcheck_browser::screenshot::{take_screenshot, ScreenshotRequest};
use shopcheck_browser::Page;
use shopcheck_core::{Fixtures, Result, ShopError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// What a test can reach while it runs: shared fixtures and its own page
pub struct TestContext {
    test_id: String,
    fixtures: Arc<Fixtures>,
    page: Option<Arc<dyn Page>>,
    timeout: Duration,
}

impl TestContext {
    pub fn new(test_id: &str, fixtures: Arc<Fixtures>, timeout: Duration) -> Self {
        Self {
            test_id: test_id.to_string(),
            fixtures,
            page: None,
            timeout,
        }
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    /// Default timeout for `expect_*` assertions
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn attach_page(&mut self, page: Arc<dyn Page>) {
        self.page = Some(page);
    }

    /// The test's browser page
    pub fn page(&self) -> Result<&dyn Page> {
        self.page
            .as_deref()
            .ok_or_else(|| ShopError::SessionClosed(format!("no browser session for {}", self.test_id)))
    }

    pub fn page_handle(&self) -> Option<Arc<dyn Page>> {
        self.page.clone()
    }

    /// Capture a full-page screenshot into the suite's screenshot directory
    pub async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        let request = ScreenshotRequest::named(name).in_dir(&self.fixtures.screenshot_dir);
        take_screenshot(self.page()?, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcheck_browser::testing::ScriptedPage;
    use shopcheck_core::SuiteConfig;
    use tempfile::TempDir;

    fn fixtures(dir: PathBuf) -> Arc<Fixtures> {
        let config = SuiteConfig {
            screenshot_dir: dir,
            ..SuiteConfig::default()
        };
        Arc::new(Fixtures::from_config(&config).unwrap())
    }

    #[test]
    fn test_page_missing_before_setup() {
        let ctx = TestContext::new("t", fixtures(PathBuf::from("unused")), Duration::from_secs(1));
        assert!(matches!(ctx.page(), Err(ShopError::SessionClosed(_))));
        assert!(ctx.page_handle().is_none());
    }

    #[tokio::test]
    async fn test_manual_screenshot_uses_fixture_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut ctx = TestContext::new("t", fixtures(temp_dir.path().to_path_buf()), Duration::from_secs(1));
        ctx.attach_page(Arc::new(ScriptedPage::new("https://shop.test/")));

        let path = ctx.screenshot("order-complete").await.unwrap();
        assert!(path.starts_with(temp_dir.path()));
        assert!(path.exists());
    }
}
