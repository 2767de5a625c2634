//! Screenshot capture and artifact naming
//!
//! Two entry points share the same naming rules:
//!
//! - [`capture_failure_screenshot`] names the file after the failing test
//!   (slug + second-resolution UTC timestamp) and always captures the full page.
//! - [`take_screenshot`] is called directly from test bodies with a chosen base
//!   name; its timestamp carries microseconds and it never reuses a path.

use crate::error::{Result, ShopError};
use crate::page::Page;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

pub use shopcheck_core::config::SCREENSHOT_DIR;

/// Default base name for manual captures
pub const DEFAULT_NAME: &str = "screenshot";

/// Longest slug kept from a test identifier
pub const MAX_SLUG_LEN: usize = 100;

const FAILURE_TIMESTAMP: &str = "%Y%m%d-%H%M%S";
const MANUAL_TIMESTAMP: &str = "%Y%m%d-%H%M%S-%6f";

static SLUG_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Turn a test identifier into a filesystem-safe, length-bounded slug
///
/// Lowercases, collapses every run of characters outside `[a-z0-9_.-]` into a
/// single `_`, trims leading and trailing `_`, and truncates to
/// [`MAX_SLUG_LEN`] characters.
pub fn slugify(test_id: &str) -> String {
    let pattern =
        SLUG_PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_.-]+").expect("slug pattern is valid"));

    let lowered = test_id.to_lowercase();
    let replaced = pattern.replace_all(&lowered, "_");
    let slug: String = replaced.trim_matches('_').chars().take(MAX_SLUG_LEN).collect();

    if slug.is_empty() {
        "test".to_string()
    } else {
        slug
    }
}

/// File name for an automatic failure capture: `<slug>-<YYYYMMDD-HHMMSS>.png`
pub fn failure_file_name(test_id: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.png", slugify(test_id), at.format(FAILURE_TIMESTAMP))
}

/// File name for a manual capture: `<name>-<YYYYMMDD-HHMMSS-ffffff>.png`
pub fn manual_file_name(name: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.png", name, at.format(MANUAL_TIMESTAMP))
}

/// A manual base name must stay inside the target directory
fn check_base_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(ShopError::ScreenshotFailed(format!(
            "Invalid screenshot name '{}': must be non-empty without path separators",
            name
        )));
    }
    Ok(())
}

/// Options for a manual capture
#[derive(Debug, Clone)]
pub struct ScreenshotRequest {
    /// Base name of the file
    pub name: String,
    /// Target directory, created if missing
    pub dir: PathBuf,
    /// Capture the whole scrollable page instead of the viewport
    pub full_page: bool,
}

impl Default for ScreenshotRequest {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            dir: PathBuf::from(SCREENSHOT_DIR),
            full_page: true,
        }
    }
}

impl ScreenshotRequest {
    /// Full-page capture with the given base name in the default directory
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn viewport_only(mut self) -> Self {
        self.full_page = false;
        self
    }
}

/// Capture a screenshot on demand and return where it was written
///
/// Errors from directory creation or the capture itself are returned to the
/// caller.
///
/// # Example
/// ```no_run
/// use shopcheck_browser::browser::BrowserSession;
/// use shopcheck_browser::page::Page;
/// use shopcheck_browser::screenshot::{take_screenshot, ScreenshotRequest};
///
/// #[tokio::main]
/// async fn main() -> shopcheck_core::Result<()> {
///     let session = BrowserSession::launch().await?;
///     session.goto("https://www.saucedemo.com/").await?;
///
///     let path = take_screenshot(&session, &ScreenshotRequest::named("login-form")).await?;
///     println!("Screenshot saved: {}", path.display());
///     Ok(())
/// }
/// ```
pub async fn take_screenshot(page: &dyn Page, request: &ScreenshotRequest) -> Result<PathBuf> {
    check_base_name(&request.name)?;
    fs::create_dir_all(&request.dir).await?;

    let mut path = request.dir.join(manual_file_name(&request.name, Utc::now()));
    while fs::try_exists(&path).await? {
        tokio::time::sleep(Duration::from_micros(1)).await;
        path = request.dir.join(manual_file_name(&request.name, Utc::now()));
    }

    debug!(
        "Capturing {} screenshot '{}'",
        if request.full_page { "full page" } else { "viewport" },
        request.name
    );
    page.screenshot(&path, request.full_page).await?;

    info!("Screenshot saved: {}", path.display());
    Ok(path)
}

/// Capture a full-page screenshot named after a failed test
///
/// Returns the capture error as-is; the post-test hook decides how to
/// contain it.
pub async fn capture_failure_screenshot(
    page: &dyn Page,
    dir: &Path,
    test_id: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;

    let path = dir.join(failure_file_name(test_id, Utc::now()));
    debug!("Capturing failure screenshot for {}", test_id);
    page.screenshot(&path, true).await?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPage;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32, micros: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap()
            + chrono::Duration::microseconds(micros as i64)
    }

    #[test]
    fn test_slugify_node_id() {
        assert_eq!(
            slugify("tests/test_login.py::test_login_failure[lockedUser1]"),
            "tests_test_login.py_test_login_failure_lockeduser1"
        );
        assert_eq!(slugify("checkout::happy_path"), "checkout_happy_path");
    }

    #[test]
    fn test_slugify_trims_and_defaults() {
        assert_eq!(slugify("  ::Login::  "), "login");
        assert_eq!(slugify("???"), "test");
        assert_eq!(slugify(""), "test");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "a".repeat(250);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_failure_file_name() {
        assert_eq!(
            failure_file_name("login::login_success", at(14, 5, 9, 123_456)),
            "login_login_success-20240309-140509.png"
        );
    }

    #[test]
    fn test_manual_file_name_has_micros() {
        assert_eq!(
            manual_file_name("cart", at(14, 5, 9, 42)),
            "cart-20240309-140509-000042.png"
        );
        assert_ne!(
            manual_file_name("cart", at(14, 5, 9, 1)),
            manual_file_name("cart", at(14, 5, 9, 2))
        );
    }

    #[test]
    fn test_request_defaults() {
        let request = ScreenshotRequest::default();
        assert_eq!(request.name, "screenshot");
        assert_eq!(request.dir, PathBuf::from("reports/screenshots"));
        assert!(request.full_page);

        let request = ScreenshotRequest::named("x").in_dir("/tmp/shots").viewport_only();
        assert_eq!(request.name, "x");
        assert_eq!(request.dir, PathBuf::from("/tmp/shots"));
        assert!(!request.full_page);
    }

    #[test]
    fn test_request_dir_matches_config_default() {
        let config = shopcheck_core::SuiteConfig::default();
        assert_eq!(ScreenshotRequest::default().dir, config.screenshot_dir);
    }

    #[tokio::test]
    async fn test_take_screenshot_twice_is_distinct() {
        let temp_dir = TempDir::new().unwrap();
        let page = ScriptedPage::new("https://shop.test/");
        let request = ScreenshotRequest::named("cart").in_dir(temp_dir.path().join("shots"));

        let first = take_screenshot(&page, &request).await.unwrap();
        let second = take_screenshot(&page, &request).await.unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
        assert!(first
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .starts_with("cart-"));
        assert_eq!(page.screenshots().len(), 2);
    }

    #[tokio::test]
    async fn test_take_screenshot_viewport_flag() {
        let temp_dir = TempDir::new().unwrap();
        let page = ScriptedPage::new("https://shop.test/");
        let request = ScreenshotRequest::default()
            .in_dir(temp_dir.path())
            .viewport_only();

        take_screenshot(&page, &request).await.unwrap();
        assert!(!page.screenshots()[0].1);
    }

    #[tokio::test]
    async fn test_take_screenshot_propagates_closed_session() {
        let temp_dir = TempDir::new().unwrap();
        let page = ScriptedPage::new("https://shop.test/");
        page.close().await.unwrap();

        let result = take_screenshot(&page, &ScreenshotRequest::default().in_dir(temp_dir.path())).await;
        assert!(matches!(result, Err(crate::error::ShopError::SessionClosed(_))));
    }

    #[tokio::test]
    async fn test_take_screenshot_rejects_path_in_name() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("d");
        let page = ScriptedPage::new("https://shop.test/");

        for name in ["../escaped", "nested/name", "..\\escaped", ""] {
            let result = take_screenshot(&page, &ScreenshotRequest::named(name).in_dir(&dir)).await;
            assert!(
                matches!(result, Err(ShopError::ScreenshotFailed(_))),
                "{:?} accepted",
                name
            );
        }

        assert!(page.screenshots().is_empty());
        assert!(!dir.exists());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_capture_failure_screenshot_path() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("reports").join("screenshots");
        let page = ScriptedPage::new("https://shop.test/");

        let path = capture_failure_screenshot(&page, &dir, "Checkout::Happy Path")
            .await
            .unwrap();

        assert!(path.starts_with(&dir));
        assert!(path.exists());
        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(name.starts_with("checkout_happy_path-"));
        assert!(name.ends_with(".png"));
        assert_eq!(page.screenshots(), vec![(path.clone(), true)]);
    }
}
