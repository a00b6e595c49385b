//! Collapses reruns of a flaky test into one logical outcome.
//!
//! When a rerun capability is active the runner executes a failing test
//! again, up to `max_rerun` more times, delivering each execution under the
//! same test id. Consecutive executions of one id form a window; the window
//! closes on the first pass, on a non-retried status (skip, xfail, xpass),
//! or once the failures exhaust the allowed attempts.

use tracing::debug;

use crate::outcome::TestOutcome;

/// Folds physical executions into logical outcomes.
#[derive(Debug, Clone, Default)]
pub struct RerunDeduplicator {
    max_rerun: Option<u32>,
    previous_test_id: Option<String>,
    consecutive_failures: u32,
    attempts: u32,
    pending: Option<TestOutcome>,
}

impl RerunDeduplicator {
    /// `None` disables folding: every execution is its own outcome.
    pub fn new(max_rerun: Option<u32>) -> Self {
        Self {
            max_rerun,
            ..Self::default()
        }
    }

    /// Feed one completed execution.
    ///
    /// Returns the logical outcomes that became final, in order. A failure
    /// chain interrupted by a different test id is flushed first with its
    /// last status so no execution is lost.
    pub fn push(&mut self, execution: TestOutcome) -> Vec<TestOutcome> {
        let Some(max_rerun) = self.max_rerun else {
            return vec![execution];
        };

        let mut finished = Vec::new();

        if self.previous_test_id.as_deref() != Some(execution.test_id.as_str()) {
            if let Some(interrupted) = self.pending.take() {
                debug!(
                    test_id = %interrupted.test_id,
                    attempts = interrupted.attempt_count,
                    "rerun chain ended before exhausting its attempts"
                );
                finished.push(interrupted);
            }
            self.previous_test_id = Some(execution.test_id.clone());
            self.reset_window();
        }

        self.attempts += 1;
        let mut outcome = execution;
        outcome.attempt_count = self.attempts;

        let closes_window = if outcome.status.is_failure() {
            self.consecutive_failures += 1;
            self.consecutive_failures > max_rerun
        } else {
            true
        };

        if closes_window {
            self.pending = None;
            self.reset_window();
            finished.push(outcome);
        } else {
            self.pending = Some(outcome);
        }

        finished
    }

    /// Release a failure chain still waiting for a rerun.
    pub fn flush(&mut self) -> Option<TestOutcome> {
        self.reset_window();
        self.pending.take()
    }

    fn reset_window(&mut self) {
        self.consecutive_failures = 0;
        self.attempts = 0;
    }
}
