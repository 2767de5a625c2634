//! Browser automation for the shopcheck suite
//!
//! Drives Chrome through the Chrome DevTools Protocol and exposes it behind the
//! [`Page`] trait so tests, hooks and capturers never depend on a concrete
//! browser.
//!
//! # Example
//!
//! ```no_run
//! use shopcheck_browser::{BrowserSession, Page};
//! use shopcheck_browser::screenshot::{take_screenshot, ScreenshotRequest};
//! use shopcheck_browser::verification::expect_visible;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = BrowserSession::launch().await?;
//!     session.goto("https://www.saucedemo.com/").await?;
//!
//!     expect_visible(&session, "#login-button", Duration::from_secs(5)).await?;
//!     let path = take_screenshot(&session, &ScreenshotRequest::named("login")).await?;
//!     println!("Saved {}", path.display());
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`page`]: the `Page` trait
//! - [`browser`]: Chrome session lifecycle and the `Page` implementation
//! - [`screenshot`]: artifact naming, manual and failure captures
//! - [`verification`]: polling `expect_*` assertions
//! - [`error`]: error types for browser operations

pub mod browser;
pub mod error;
pub mod page;
pub mod screenshot;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod verification;

pub use browser::{BrowserConfig, BrowserSession};
pub use error::{BrowserError, Result};
pub use page::Page;
pub use screenshot::{
    capture_failure_screenshot, slugify, take_screenshot, ScreenshotRequest, SCREENSHOT_DIR,
};
