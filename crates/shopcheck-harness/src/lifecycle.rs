//! Phase observation
//!
//! [`observe_phase`] runs one phase of a test, records its outcome on the
//! test's [`TestRecord`] and hands the original failure back to the caller.

use futures::FutureExt;
use shopcheck_core::{Phase, PhaseOutcome, ShopError, TestRecord};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::debug;

/// Why a phase failed
#[derive(Debug, thiserror::Error)]
pub enum PhaseFailure {
    /// The phase returned an error
    #[error(transparent)]
    Error(#[from] ShopError),

    /// The phase panicked (a failed `assert!` in a test body, for instance)
    #[error("panicked: {0}")]
    Panic(String),
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run `phase` to completion and record its outcome
///
/// Errors and panics are both recorded as `failed` with a readable detail,
/// then returned unchanged so the runner reports the real reason.
pub async fn observe_phase<Fut>(
    record: &mut TestRecord,
    phase: Phase,
    fut: Fut,
) -> Result<(), PhaseFailure>
where
    Fut: Future<Output = shopcheck_core::Result<()>>,
{
    debug!("{}: {} phase starting", record.test_id(), phase);

    let result = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(PhaseFailure::Error(e)),
        Err(payload) => Err(PhaseFailure::Panic(panic_message(payload))),
    };

    let outcome = match &result {
        Ok(()) => PhaseOutcome::Passed,
        Err(failure) => PhaseOutcome::failed(failure.to_string()),
    };
    debug!("{}: {} phase {:?}", record.test_id(), phase, outcome);
    record.record(phase, outcome);

    result
}
