//! Fail-open utilities for best-effort side channels
//!
//! Use these for work that accompanies a test but must never decide its
//! outcome: failure screenshots, report attachments, artifact cleanup.
//!
//! DO NOT use fail-open for:
//! - Test bodies (the authoritative failure signal)
//! - Explicit, caller-requested captures

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Run a best-effort operation and report failure as a plain status
///
/// The error is logged with `warn!` and returned as its display string, so
/// it can be attached to a report without ever being propagated with `?`.
pub async fn fail_open_status<F, Fut, T>(operation: &str, f: F) -> std::result::Result<T, String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    f().await.map_err(|e| {
        warn!("{} failed (continuing): {}", operation, e);
        e.to_string()
    })
}

/// Run a best-effort operation, logging and discarding any error
///
/// ```no_run
/// use shopcheck_core::fail_open::fail_open;
/// use shopcheck_core::Result;
///
/// async fn remove_stale_artifacts() -> Result<usize> {
///     Ok(0)
/// }
///
/// async fn example() {
///     let removed = fail_open("remove_stale_artifacts", remove_stale_artifacts).await;
///     assert!(removed.is_none() || removed == Some(0));
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    fail_open_status(operation, f).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShopError;

    #[tokio::test]
    async fn test_fail_open_passes_value_through() {
        let shots = fail_open("count_shots", || async { Ok::<_, ShopError>(3usize) }).await;
        assert_eq!(shots, Some(3));
    }

    #[tokio::test]
    async fn test_fail_open_swallows_error() {
        let closed = fail_open("close_tab", || async {
            Err::<(), _>(ShopError::Browser("tab already gone".to_string()))
        })
        .await;
        assert!(closed.is_none());
    }

    #[tokio::test]
    async fn test_fail_open_status_keeps_message() {
        let result = fail_open_status("capture", || async {
            Err::<(), _>(ShopError::SessionClosed("tab gone".to_string()))
        })
        .await;
        assert_eq!(result, Err("Browser session closed: tab gone".to_string()));
    }
}
