//! Browser error types - re-exports the unified ShopError from shopcheck-core
//!
//! Browser operations report through these variants:
//! - Browser(String) - launch, navigation, CDP and script evaluation failures
//! - ElementNotFound { selector } - lookups that found nothing
//! - ScreenshotFailed(String) / SessionClosed(String) - capture failures
//! - Timeout { what, waited_ms } - polling assertions that never held

pub use shopcheck_core::{Result, ShopError};

pub type BrowserError = ShopError;
