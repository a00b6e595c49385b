//! The suite that failed the most in a run.

use serde::Serialize;

use crate::snapshot::RunSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteHighlight {
    pub suite_name: String,
    /// FAIL plus ERROR outcomes.
    pub failure_count: u64,
    /// Other suites with the same failure count.
    pub tied_suites: usize,
    pub total_tests: u64,
    pub failure_percent: f64,
}

impl SuiteHighlight {
    /// Pick the suite with the most failures; the first one wins a tie.
    ///
    /// Returns `None` when no suite failed.
    pub fn from_snapshot(snapshot: &RunSnapshot) -> Option<Self> {
        let mut worst: Option<&crate::suite::SuiteRecord> = None;
        for suite in &snapshot.suites {
            let failures = suite.counts.failures();
            if failures == 0 {
                continue;
            }
            if worst.map_or(true, |w| failures > w.counts.failures()) {
                worst = Some(suite);
            }
        }

        let worst = worst?;
        let failure_count = worst.counts.failures();
        let tied_suites = snapshot
            .suites
            .iter()
            .filter(|s| s.counts.failures() == failure_count)
            .count()
            - 1;
        let total_tests = worst.counts.total();
        let failure_percent = if total_tests == 0 {
            0.0
        } else {
            failure_count as f64 * 100.0 / total_tests as f64
        };

        Some(Self {
            suite_name: worst.suite_name.clone(),
            failure_count,
            tied_suites,
            total_tests,
            failure_percent,
        })
    }
}
