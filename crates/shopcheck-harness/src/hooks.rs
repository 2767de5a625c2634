//! Hook pipeline for post-test callbacks
//!
//! Hooks run after every test body, before teardown closes the browser.
//! They are fail-open: a failing or panicking hook is logged and reported as
//! a failed [`HookResult`], never as a test failure.

use async_trait::async_trait;
use futures::FutureExt;
use shopcheck_browser::{capture_failure_screenshot, Page};
use shopcheck_core::fail_open::fail_open_status;
use shopcheck_core::{Fixtures, TestRecord};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a hook can see about the test that just ran
pub struct PostTestContext<'a> {
    /// Phase outcomes of the test that just ran
    pub record: &'a TestRecord,
    /// The test's page, if setup managed to open one
    pub page: Option<Arc<dyn Page>>,
    pub fixtures: &'a Fixtures,
}

impl PostTestContext<'_> {
    pub fn test_id(&self) -> &str {
        self.record.test_id()
    }
}

/// Status reported by a hook
#[derive(Debug, Clone)]
pub struct HookResult {
    pub success: bool,
    /// Human-readable summary, logged on failure
    pub message: String,
    /// File the hook wrote, if any
    pub artifact: Option<PathBuf>,
}

impl HookResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            artifact: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, path: PathBuf) -> Self {
        self.artifact = Some(path);
        self
    }
}

/// Callback run after a test body and before teardown
#[async_trait]
pub trait PostTestHook: Send + Sync {
    fn name(&self) -> &str;

    /// Problems are reported through the returned status; there is no error
    /// channel back into the test outcome.
    async fn execute(&self, context: &PostTestContext<'_>) -> HookResult;
}

/// Ordered list of post-test hooks
#[derive(Default)]
pub struct HookPipeline {
    hooks: Vec<Box<dyn PostTestHook>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `hook`; hooks run in insertion order
    pub fn add_hook(&mut self, hook: Box<dyn PostTestHook>) {
        self.hooks.push(hook);
    }

    /// Run every hook against `context`
    ///
    /// A failed or panicking hook does not stop the remaining hooks.
    pub async fn execute_all(&self, context: &PostTestContext<'_>) -> Vec<HookResult> {
        let mut results = Vec::with_capacity(self.hooks.len());

        for hook in &self.hooks {
            debug!("Running hook {} for {}", hook.name(), context.test_id());

            let result = match AssertUnwindSafe(hook.execute(context)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Hook {} panicked for {} (continuing)", hook.name(), context.test_id());
                    HookResult::failure(format!("hook {} panicked", hook.name()))
                }
            };

            // Failed results are surfaced by the caller
            if !result.success {
                debug!(
                    "Hook {} failed for {}: {}",
                    hook.name(),
                    context.test_id(),
                    result.message
                );
            }

            results.push(result);
        }

        results
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Captures a full-page screenshot when a test's call phase failed
///
/// Setup and teardown failures never trigger a capture. Capture errors are
/// logged and reported in the hook result; the test's own outcome stands.
pub struct FailureScreenshotHook {
    dir: PathBuf,
}

impl FailureScreenshotHook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Hook writing into the suite's configured screenshot directory
    pub fn for_fixtures(fixtures: &Fixtures) -> Self {
        Self::new(fixtures.screenshot_dir.clone())
    }
}

#[async_trait]
impl PostTestHook for FailureScreenshotHook {
    fn name(&self) -> &str {
        "failure_screenshot"
    }

    async fn execute(&self, context: &PostTestContext<'_>) -> HookResult {
        let test_id = context.test_id();

        if !context.record.call_failed() {
            return HookResult::success("call phase did not fail, nothing captured");
        }

        let Some(page) = context.page.as_deref() else {
            return HookResult::failure(format!("no browser session to capture for {}", test_id));
        };

        match fail_open_status(self.name(), || {
            capture_failure_screenshot(page, &self.dir, test_id)
        })
        .await
        {
            Ok(path) => {
                info!("Screenshot for failed test {}: {}", test_id, path.display());
                HookResult::success(format!("captured {}", path.display())).with_artifact(path)
            }
            Err(message) => HookResult::failure(format!(
                "no screenshot for failed test {}: {}",
                test_id, message
            )),
        }
    }
}
