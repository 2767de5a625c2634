//! Sequential test runner
//!
//! For each test: open a session and run `setup`, run `call` if setup
//! passed, run the post-test hooks while the page is still open, then run
//! `teardown` and close the page. Every phase goes through
//! [`observe_phase`], so the record the hooks see is complete up to `call`.

use crate::case::{Suite, TestCase};
use crate::context::TestContext;
use crate::hooks::{FailureScreenshotHook, HookPipeline, PostTestContext, PostTestHook};
use crate::lifecycle::observe_phase;
use crate::report::{SuiteReport, TestReport, TestStatus};
use crate::session::SessionFactory;
use shopcheck_core::{Fixtures, Phase, TestRecord};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Default timeout for `expect_*` assertions inside test bodies
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Runner {
    sessions: Arc<dyn SessionFactory>,
    fixtures: Arc<Fixtures>,
    hooks: HookPipeline,
    filter: Option<String>,
    timeout: Duration,
}

impl Runner {
    /// Runner with the failure-screenshot hook installed
    pub fn new(sessions: Arc<dyn SessionFactory>, fixtures: Arc<Fixtures>) -> Self {
        let mut hooks = HookPipeline::new();
        hooks.add_hook(Box::new(FailureScreenshotHook::for_fixtures(&fixtures)));

        Self {
            sessions,
            fixtures,
            hooks,
            filter: None,
            timeout: DEFAULT_EXPECT_TIMEOUT,
        }
    }

    pub fn with_hook(mut self, hook: impl PostTestHook + 'static) -> Self {
        self.hooks.add_hook(Box::new(hook));
        self
    }

    /// Only run tests whose id contains `filter`
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run every selected test of `suite` in order
    pub async fn run(&self, suite: &Suite) -> SuiteReport {
        let cases = suite.ordered(self.filter.as_deref());
        let mut report = SuiteReport::new();
        info!("Run {}: {} test(s) selected", report.run_id, cases.len());

        for case in cases {
            report.tests.push(self.run_case(case).await);
        }

        info!(
            "Run {} finished: {} passed, {} failed",
            report.run_id,
            report.passed(),
            report.failed()
        );
        report
    }

    /// Run one test through setup, call, hooks and teardown
    pub async fn run_case(&self, case: &dyn TestCase) -> TestReport {
        let started = Instant::now();
        let mut record = TestRecord::new(case.id());
        let mut ctx = TestContext::new(case.id(), self.fixtures.clone(), self.timeout);
        info!("Running {}", case.id());

        let setup = observe_phase(&mut record, Phase::Setup, async {
            let page = self.sessions.open().await?;
            ctx.attach_page(page);
            case.setup(&ctx).await
        })
        .await;

        if setup.is_ok() {
            // The failure is already on the record; the report reads it from there.
            let _ = observe_phase(&mut record, Phase::Call, case.call(&ctx)).await;
        }

        let hook_results = self
            .hooks
            .execute_all(&PostTestContext {
                record: &record,
                page: ctx.page_handle(),
                fixtures: &self.fixtures,
            })
            .await;

        let _ = observe_phase(&mut record, Phase::Teardown, async {
            let result = case.teardown(&ctx).await;
            let closed = match ctx.page_handle() {
                Some(page) => page.close().await,
                None => Ok(()),
            };
            result.and(closed)
        })
        .await;

        let mut artifacts = Vec::new();
        let mut hook_warnings = Vec::new();
        for result in hook_results {
            if let Some(path) = result.artifact {
                artifacts.push(path);
            }
            if !result.success {
                hook_warnings.push(result.message);
            }
        }

        let (status, failed_phase, failure) = match record.first_failure() {
            Some((phase, detail)) => (TestStatus::Failed, Some(phase), Some(detail.to_string())),
            None => (TestStatus::Passed, None, None),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        match (&failed_phase, &failure) {
            (Some(phase), Some(detail)) => {
                error!("{} {} ({}): {}", status, case.id(), phase, detail);
                for path in &artifacts {
                    error!("  screenshot: {}", path.display());
                }
                for warning in &hook_warnings {
                    warn!("  {}", warning);
                }
            }
            _ => info!("{} {} in {}ms", status, case.id(), duration_ms),
        }

        TestReport {
            id: case.id().to_string(),
            status,
            failed_phase,
            failure,
            record,
            artifacts,
            hook_warnings,
            duration_ms,
        }
    }
}
