//! Chrome sessions driven over the DevTools Protocol
//!
//! Every [`Page`] operation is synchronous CDP under the hood; interactions
//! wait for their element with the session timeout and then sleep for the
//! configured slow-mo delay.

use crate::error::{Result, ShopError};
use crate::page::Page;
use async_trait::async_trait;
use base64::Engine;
use headless_chrome::protocol::cdp::Page::{
    CaptureScreenshot, CaptureScreenshotFormatOption, Viewport,
};
use headless_chrome::{Browser, LaunchOptions, Tab};
use shopcheck_core::BrowserSettings;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Launch options derived from [`BrowserSettings`]
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Viewport width in CSS pixels
    pub window_width: u32,
    pub window_height: u32,
    /// Overrides Chrome's default user agent
    pub user_agent: Option<String>,
    /// Element wait timeout in seconds
    pub timeout_seconds: u64,
    /// Pause after each interaction
    pub slow_mo: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::from(&BrowserSettings::default())
    }
}

impl From<&BrowserSettings> for BrowserConfig {
    fn from(settings: &BrowserSettings) -> Self {
        Self {
            headless: settings.headless,
            window_width: settings.viewport_width,
            window_height: settings.viewport_height,
            user_agent: settings.user_agent.clone(),
            timeout_seconds: settings.timeout_seconds,
            slow_mo: Duration::from_millis(settings.slow_mo_ms),
        }
    }
}

/// One Chrome process with a single tab
///
/// Dropping the session shuts Chrome down.
pub struct BrowserSession {
    // Owns the Chrome process; the tab dies with it
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<Tab>,
    config: BrowserConfig,
}

impl BrowserSession {
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Start a new Chrome process
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Starting Chrome ({}, viewport {}x{})",
            if config.headless { "headless" } else { "headed" },
            config.window_width,
            config.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .idle_browser_timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ShopError::Browser(format!("Invalid launch options: {}", e)))?;

        let user_agent_arg: Option<String> =
            config.user_agent.as_ref().map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| ShopError::Browser(format!("Chrome did not start: {}", e)))?;
        Self::with_new_tab(browser, config)
    }

    /// Attach to a Chrome already listening for DevTools on `port`
    pub async fn connect(port: u16, config: BrowserConfig) -> Result<Self> {
        info!("Attaching to Chrome on port {}", port);

        let browser = Browser::connect(format!("http://127.0.0.1:{}", port))
            .map_err(|e| ShopError::Browser(format!("Cannot attach to port {}: {}", port, e)))?;
        Self::with_new_tab(browser, config)
    }

    fn with_new_tab(browser: Browser, config: BrowserConfig) -> Result<Self> {
        let tab = browser
            .new_tab()
            .map_err(|e| ShopError::Browser(format!("Cannot open tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.timeout_seconds));
        debug!("Tab ready");

        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    /// Evaluate `script` in the page and return its value
    pub async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        debug!("evaluate: {}", script);

        let remote = self
            .tab
            .evaluate(script, false)
            .map_err(|e| ShopError::Browser(format!("Script failed: {}", e)))?;

        Ok(remote.value.unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate an expression whose value is serialized with `JSON.stringify`
    async fn evaluate_json<T: serde::de::DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let script = format!("JSON.stringify({})", expression);
        let raw = self.evaluate_script(&script).await?;
        let text = raw.as_str().unwrap_or("null");
        Ok(serde_json::from_str(text)?)
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    async fn pace(&self) {
        if !self.config.slow_mo.is_zero() {
            tokio::time::sleep(self.config.slow_mo).await;
        }
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }
}

/// Quote a selector for embedding in a JavaScript expression
fn js_selector(selector: &str) -> String {
    serde_json::Value::String(selector.to_string()).to_string()
}

#[async_trait]
impl Page for BrowserSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| ShopError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| ShopError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        info!("Navigated to {}", url);
        self.pace().await;
        Ok(())
    }

    async fn go_back(&self) -> Result<()> {
        debug!("Navigating back");
        self.evaluate_script("history.back()").await?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| ShopError::Browser(format!("Back navigation failed: {}", e)))?;
        self.pace().await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        debug!("Filling {}", selector);

        let element = self
            .tab
            .wait_for_element_with_custom_timeout(selector, self.default_timeout())
            .map_err(|_e| ShopError::ElementNotFound {
                selector: selector.to_string(),
            })?;

        element
            .click()
            .map_err(|e| ShopError::Browser(format!("Failed to focus {}: {}", selector, e)))?;
        element
            .call_js_fn("function() { this.select(); }", vec![], false)
            .map_err(|e| ShopError::Browser(format!("Failed to select {}: {}", selector, e)))?;

        if value.is_empty() {
            self.tab
                .press_key("Backspace")
                .map_err(|e| ShopError::Browser(format!("Failed to clear {}: {}", selector, e)))?;
        } else {
            element
                .type_into(value)
                .map_err(|e| ShopError::Browser(format!("Failed to type into {}: {}", selector, e)))?;
        }

        self.pace().await;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        debug!("Clicking {}", selector);

        let element = self
            .tab
            .wait_for_element_with_custom_timeout(selector, self.default_timeout())
            .map_err(|_e| ShopError::ElementNotFound {
                selector: selector.to_string(),
            })?;

        element
            .click()
            .map_err(|e| ShopError::Browser(format!("Failed to click {}: {}", selector, e)))?;

        self.pace().await;
        Ok(())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        debug!("Clicking {} #{}", selector, index);

        let elements = self.tab.find_elements(selector).map_err(|_e| ShopError::ElementNotFound {
            selector: selector.to_string(),
        })?;

        let element = elements.get(index).ok_or_else(|| ShopError::ElementNotFound {
            selector: format!("{} (index {})", selector, index),
        })?;

        element
            .click()
            .map_err(|e| ShopError::Browser(format!("Failed to click {}: {}", selector, e)))?;

        self.pace().await;
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) {{ return false; }}
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                return style.visibility !== 'hidden' && style.display !== 'none'
                    && rect.width > 0 && rect.height > 0;
            }})()"#,
            js_selector(selector)
        );
        Ok(self.evaluate_script(&script).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return !!el && !el.disabled; }})()",
            js_selector(selector)
        );
        Ok(self.evaluate_script(&script).await?.as_bool().unwrap_or(false))
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let script = format!("document.querySelectorAll({}).length", js_selector(selector));
        let value = self.evaluate_script(&script).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let expression = format!(
            "Array.from(document.querySelectorAll({})).map(el => el.innerText.trim())",
            js_selector(selector)
        );
        self.evaluate_json(&expression).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        debug!("Waiting for element: {} (timeout: {:?})", selector, timeout);

        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|_e| ShopError::Timeout {
                what: format!("element {}", selector),
                waited_ms: timeout.as_millis() as u64,
            })?;

        Ok(())
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> Result<()> {
        let clip = if full_page {
            let (width, height): (f64, f64) = self
                .evaluate_json(
                    "[document.documentElement.scrollWidth, document.documentElement.scrollHeight]",
                )
                .await
                .map_err(|e| ShopError::ScreenshotFailed(format!("Failed to measure page: {}", e)))?;
            Some(Viewport {
                x: 0.0,
                y: 0.0,
                width,
                height,
                scale: 1.0,
            })
        } else {
            None
        };

        let encoded = self
            .tab
            .call_method(capture_command(clip))
            .map_err(|e| ShopError::ScreenshotFailed(format!("CDP capture failed: {}", e)))?
            .data;
        let data = decode_png(&encoded)?;

        tokio::fs::write(path, &data).await?;
        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        info!("Closing browser tab");
        self.tab
            .close(false)
            .map_err(|e| ShopError::SessionClosed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }
}

/// `Page.captureScreenshot` as PNG
///
/// A clip means full page: Chrome only renders content outside the viewport
/// when `captureBeyondViewport` is set.
fn capture_command(clip: Option<Viewport>) -> CaptureScreenshot {
    let beyond_viewport = clip.is_some();
    CaptureScreenshot {
        format: Some(CaptureScreenshotFormatOption::Png),
        quality: None,
        clip,
        from_surface: Some(true),
        capture_beyond_viewport: Some(beyond_viewport),
        optimize_for_speed: None,
    }
}

fn decode_png(encoded: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ShopError::ScreenshotFailed(format!("Invalid image data: {}", e)))
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("Shutting down Chrome session");
    }
}
