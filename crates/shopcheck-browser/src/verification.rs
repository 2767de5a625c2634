//! Page assertions for test bodies
//!
//! The `expect_*` helpers poll the page until the condition holds or the
//! timeout elapses, then fail with [`ShopError::Timeout`] describing what was
//! expected and what was last observed.

use crate::error::{Result, ShopError};
use crate::page::Page;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Interval between polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What one poll observed
enum Probe {
    Holds,
    NotYet(String),
}

async fn poll_until<F, Fut>(what: String, timeout: Duration, mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        let observed = match probe().await {
            Ok(Probe::Holds) => {
                debug!("Expectation met: {}", what);
                return Ok(());
            }
            Ok(Probe::NotYet(observed)) => observed,
            Err(e @ ShopError::SessionClosed(_)) => return Err(e),
            Err(e) => e.to_string(),
        };

        if Instant::now() >= deadline {
            return Err(ShopError::Timeout {
                what: format!("{} (last seen: {})", what, observed),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Wait until `selector` is visible
pub async fn expect_visible(page: &dyn Page, selector: &str, timeout: Duration) -> Result<()> {
    poll_until(format!("{} to be visible", selector), timeout, move || async move {
        Ok(if page.is_visible(selector).await? {
            Probe::Holds
        } else {
            Probe::NotYet("not visible".to_string())
        })
    })
    .await
}

/// Wait until `selector` is absent or hidden
pub async fn expect_hidden(page: &dyn Page, selector: &str, timeout: Duration) -> Result<()> {
    poll_until(format!("{} to be hidden", selector), timeout, move || async move {
        Ok(if page.is_visible(selector).await? {
            Probe::NotYet("visible".to_string())
        } else {
            Probe::Holds
        })
    })
    .await
}

/// Wait until `selector` is enabled
pub async fn expect_enabled(page: &dyn Page, selector: &str, timeout: Duration) -> Result<()> {
    poll_until(format!("{} to be enabled", selector), timeout, move || async move {
        Ok(if page.is_enabled(selector).await? {
            Probe::Holds
        } else {
            Probe::NotYet("disabled".to_string())
        })
    })
    .await
}

/// Wait until the first match of `selector` has exactly `expected` as its text
pub async fn expect_text(
    page: &dyn Page,
    selector: &str,
    expected: &str,
    timeout: Duration,
) -> Result<()> {
    let expected = expected.trim();
    poll_until(
        format!("{} to have text '{}'", selector, expected),
        timeout,
        move || async move {
            let actual = page.text_content(selector).await?;
            Ok(if actual == expected {
                Probe::Holds
            } else {
                Probe::NotYet(format!("'{}'", actual))
            })
        },
    )
    .await
}

/// Wait until some match of `selector` contains `needle`
pub async fn expect_contains_text(
    page: &dyn Page,
    selector: &str,
    needle: &str,
    timeout: Duration,
) -> Result<()> {
    poll_until(
        format!("{} to contain '{}'", selector, needle),
        timeout,
        move || async move {
            let texts = page.texts(selector).await?;
            Ok(if texts.iter().any(|t| t.contains(needle)) {
                Probe::Holds
            } else {
                Probe::NotYet(format!("{:?}", texts))
            })
        },
    )
    .await
}

/// Wait until exactly `expected` elements match `selector`
pub async fn expect_count(
    page: &dyn Page,
    selector: &str,
    expected: usize,
    timeout: Duration,
) -> Result<()> {
    poll_until(
        format!("{} to match {} elements", selector, expected),
        timeout,
        move || async move {
            let actual = page.count(selector).await?;
            Ok(if actual == expected {
                Probe::Holds
            } else {
                Probe::NotYet(format!("{} elements", actual))
            })
        },
    )
    .await
}

/// Wait until the current URL contains `fragment`
pub async fn expect_url_contains(page: &dyn Page, fragment: &str, timeout: Duration) -> Result<()> {
    poll_until(format!("URL to contain '{}'", fragment), timeout, move || async move {
        let url = page.current_url().await?;
        Ok(if url.contains(fragment) {
            Probe::Holds
        } else {
            Probe::NotYet(url)
        })
    })
    .await
}

/// Wait until the current URL equals `expected`
pub async fn expect_url(page: &dyn Page, expected: &str, timeout: Duration) -> Result<()> {
    poll_until(format!("URL to be '{}'", expected), timeout, move || async move {
        let url = page.current_url().await?;
        Ok(if url == expected {
            Probe::Holds
        } else {
            Probe::NotYet(url)
        })
    })
    .await
}

/// Check text content against an expected value without waiting
///
/// # Arguments
/// * `page` - Active page
/// * `selector` - CSS selector for the element
/// * `expected_text` - Expected text content
pub async fn verify_text(page: &dyn Page, selector: &str, expected_text: &str) -> Result<bool> {
    debug!("Verifying text in {}: expected '{}'", selector, expected_text);

    let actual_text = page.text_content(selector).await?;
    let matches = actual_text.trim() == expected_text.trim();

    if matches {
        info!("Text verification passed for {}", selector);
    } else {
        info!(
            "Text verification failed for {}: expected '{}', got '{}'",
            selector, expected_text, actual_text
        );
    }

    Ok(matches)
}
