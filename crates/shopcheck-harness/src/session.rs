//! Browser session acquisition for test setup

use async_trait::async_trait;
use shopcheck_browser::{BrowserConfig, BrowserSession, Page};
use shopcheck_core::Result;
use std::sync::Arc;
use tracing::debug;

/// Opens one fresh page per test
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Arc<dyn Page>>;
}

/// Launches a dedicated Chrome instance for every test
pub struct ChromeSessionFactory {
    config: BrowserConfig,
}

impl ChromeSessionFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn open(&self) -> Result<Arc<dyn Page>> {
        debug!("Opening Chrome session for test");
        let session = BrowserSession::launch_with_config(self.config.clone()).await?;
        Ok(Arc::new(session))
    }
}
