//! Maps a lifecycle event to the status it reports.

use crate::error::ClassifyError;
use crate::event::{LifecycleEvent, Phase, PhaseOutcome};
use crate::outcome::Status;

/// Classify an outcome-bearing event.
///
/// A failed call of an expected-failure test counts as XPASS, the same as
/// a passing one. Passed setup/teardown reports have no status and are
/// rejected; callers filter them with [`LifecycleEvent::carries_outcome`].
pub fn classify(event: &LifecycleEvent) -> Result<Status, ClassifyError> {
    let xfail = event.expected_failure;

    let status = match (event.phase, event.outcome) {
        (_, PhaseOutcome::Skipped) if xfail => Status::XFail,
        (_, PhaseOutcome::Skipped) => Status::Skip,
        (Phase::Call, PhaseOutcome::Passed | PhaseOutcome::Failed) if xfail => Status::XPass,
        (Phase::Call, PhaseOutcome::Passed) => Status::Pass,
        (Phase::Call, PhaseOutcome::Failed) => Status::Fail,
        (Phase::Setup | Phase::Teardown, PhaseOutcome::Failed) => Status::Error,
        (phase @ (Phase::Setup | Phase::Teardown), PhaseOutcome::Passed) => {
            return Err(ClassifyError::PassedOutsideCall {
                test_id: event.test_id.clone(),
                phase,
            });
        }
    };

    Ok(status)
}
