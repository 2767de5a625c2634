//! Configuration management for shopcheck
//!
//! Suite-level settings: target URL, artifact location, browser launch
//! options and scenario user overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::Credentials;
use crate::Result;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "shopcheck.toml";

/// Default artifact directory, relative to the working directory
pub const SCREENSHOT_DIR: &str = "reports/screenshots";

/// Suite configuration
///
/// Loaded from `shopcheck.toml`; every field has a default so an empty or
/// missing file runs the stock saucedemo suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Application under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where screenshots are written
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,

    /// Browser launch options
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Credential overrides merged over the built-in user table
    #[serde(default)]
    pub users: BTreeMap<String, Credentials>,

    /// Users expected to be rejected by the login form
    #[serde(default = "default_login_failure_users")]
    pub login_failure_users: Vec<String>,
}

/// Browser launch options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Run without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Pause after every interaction, in milliseconds
    #[serde(default)]
    pub slow_mo_ms: u64,

    /// Default wait timeout for element lookups
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

// Default value providers
fn default_base_url() -> String {
    "https://www.saucedemo.com/".to_string()
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from(SCREENSHOT_DIR)
}

fn default_login_failure_users() -> Vec<String> {
    vec![
        "lockedUser1".to_string(),
        "wrongPass1".to_string(),
        "emptyUsername1".to_string(),
        "emptyPassword1".to_string(),
    ]
}

fn default_headless() -> bool {
    true
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    800
}

fn default_timeout_seconds() -> u64 {
    10
}

impl SuiteConfig {
    /// Load configuration from `path`, or use defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            crate::ShopError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Write the default configuration to `path`, creating parent directories
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&Self::default()).map_err(|e| {
            crate::ShopError::Config(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            screenshot_dir: default_screenshot_dir(),
            browser: BrowserSettings::default(),
            users: BTreeMap::new(),
            login_failure_users: default_login_failure_users(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            slow_mo_ms: 0,
            timeout_seconds: default_timeout_seconds(),
            user_agent: None,
        }
    }
}
