//! # shopcheck-harness
//!
//! Test lifecycle for the shopcheck browser suite.
//!
//! This crate provides:
//! - Phase observation that records setup/call/teardown outcomes per test
//! - A fail-open post-test hook pipeline
//! - Full-page screenshots for tests whose call phase failed
//! - A sequential runner with JSON run reports
//! - The saucedemo login and checkout scenarios

mod case;
mod context;
mod hooks;
mod lifecycle;
mod report;
mod runner;
pub mod scenarios;
mod session;

pub use case::{Suite, TestCase};
pub use context::TestContext;
pub use hooks::{FailureScreenshotHook, HookPipeline, HookResult, PostTestContext, PostTestHook};
pub use lifecycle::{observe_phase, PhaseFailure};
pub use report::{SuiteReport, TestReport, TestStatus};
pub use runner::{Runner, DEFAULT_EXPECT_TIMEOUT};
pub use scenarios::default_suite;
pub use session::{ChromeSessionFactory, SessionFactory};
