//! Unified error types for shopcheck

use thiserror::Error;

/// Unified error type for all shopcheck operations
#[derive(Error, Debug)]
pub enum ShopError {
    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Browser session closed: {0}")]
    SessionClosed(String),

    // Test body errors
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Timed out after {waited_ms}ms: {what}")]
    Timeout { what: String, waited_ms: u64 },

    // Fixture errors
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl ShopError {
    /// Build an assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }
}

/// Result type alias using ShopError
pub type Result<T> = std::result::Result<T, ShopError>;

/// Fail the current test body with an assertion error unless `cond` holds.
///
/// ```
/// use shopcheck_core::{ensure_that, Result};
///
/// fn check(count: usize) -> Result<()> {
///     ensure_that!(count > 0, "no products found");
///     ensure_that!(count < 10, "too many products: {}", count);
///     Ok(())
/// }
///
/// assert!(check(3).is_ok());
/// assert!(check(0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_that {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::ShopError::Assertion(format!($($arg)+)));
        }
    };
}
