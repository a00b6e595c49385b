//! Suite boundary detection and per-suite aggregation.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::outcome::{Status, StatusCounts, TestOutcome};

/// Separator between a suite path and the scenario within it.
pub const SCENARIO_SEPARATOR: &str = "::";

/// The suite a test id belongs to: everything before the first `::`.
///
/// `tests/test_login.py::TestForm::test_submit` → `tests/test_login.py`
pub fn suite_id(test_id: &str) -> &str {
    match test_id.find(SCENARIO_SEPARATOR) {
        Some(idx) => &test_id[..idx],
        None => test_id,
    }
}

/// A finalized suite: its outcomes in arrival order plus frozen totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SuiteRecordRepr", from = "SuiteRecordRepr")]
pub struct SuiteRecord {
    pub suite_name: String,
    pub tests: Vec<TestOutcome>,
    pub counts: StatusCounts,
    /// Executions spent on tests that needed more than one attempt.
    pub rerun_total: u64,
}

impl SuiteRecord {
    /// File stem of the suite path, e.g. `test_login` for `tests/test_login.py`.
    pub fn short_name(&self) -> &str {
        let file = self.suite_name.rsplit('/').next().unwrap_or(&self.suite_name);
        file.strip_suffix(".py").unwrap_or(file)
    }

    pub fn has_failures(&self) -> bool {
        self.counts.failures() > 0
    }
}

#[derive(Serialize, Deserialize)]
struct SuiteRecordRepr {
    suite_name: String,
    status: SuiteTotals,
    #[serde(default)]
    tests: BTreeMap<usize, TestOutcome>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct SuiteTotals {
    total_pass: u64,
    total_fail: u64,
    total_skip: u64,
    total_xpass: u64,
    total_xfail: u64,
    total_error: u64,
    total_rerun: u64,
}

impl From<SuiteRecord> for SuiteRecordRepr {
    fn from(record: SuiteRecord) -> Self {
        let c = record.counts;
        Self {
            suite_name: record.suite_name,
            status: SuiteTotals {
                total_pass: c.pass,
                total_fail: c.fail,
                total_skip: c.skip,
                total_xpass: c.xpass,
                total_xfail: c.xfail,
                total_error: c.error,
                total_rerun: record.rerun_total,
            },
            tests: record.tests.into_iter().enumerate().collect(),
        }
    }
}

impl From<SuiteRecordRepr> for SuiteRecord {
    fn from(repr: SuiteRecordRepr) -> Self {
        let s = repr.status;
        Self {
            suite_name: repr.suite_name,
            tests: repr.tests.into_values().collect(),
            counts: StatusCounts {
                pass: s.total_pass,
                fail: s.total_fail,
                skip: s.total_skip,
                error: s.total_error,
                xpass: s.total_xpass,
                xfail: s.total_xfail,
            },
            rerun_total: s.total_rerun,
        }
    }
}

#[derive(Debug)]
struct OpenSuite {
    suite_id: String,
    tests: Vec<TestOutcome>,
    counts: StatusCounts,
    rerun_total: u64,
}

impl OpenSuite {
    fn new(suite_id: String) -> Self {
        Self {
            suite_id,
            tests: Vec::new(),
            counts: StatusCounts::default(),
            rerun_total: 0,
        }
    }

    fn accumulate(&mut self, outcome: TestOutcome) {
        if !outcome.status.is_failure() {
            self.counts.increment(outcome.status);
        }
        if outcome.attempt_count > 1 {
            self.rerun_total += u64::from(outcome.attempt_count);
        }
        self.tests.push(outcome);
    }

    /// FAIL and ERROR come from the outcome list, not from the stream.
    fn finalize(self) -> SuiteRecord {
        let mut counts = self.counts;
        counts.fail = count_status(&self.tests, Status::Fail);
        counts.error = count_status(&self.tests, Status::Error);

        SuiteRecord {
            suite_name: self.suite_id,
            tests: self.tests,
            counts,
            rerun_total: self.rerun_total,
        }
    }
}

fn count_status(tests: &[TestOutcome], status: Status) -> u64 {
    tests.iter().filter(|t| t.status == status).count() as u64
}

/// Tracks the open suite and the suites finalized so far.
#[derive(Debug, Default)]
pub struct SuiteAggregator {
    open: Option<OpenSuite>,
    finalized: Vec<SuiteRecord>,
    seen: HashSet<String>,
}

impl SuiteAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logical outcome, finalizing the open suite on a boundary.
    pub fn push(&mut self, outcome: TestOutcome) -> Result<()> {
        let id = outcome.suite_id();

        if self.open.as_ref().is_some_and(|open| open.suite_id != id) {
            self.finalize_open();
        }

        if self.open.is_none() {
            if self.seen.contains(id) {
                return Err(ReportError::InterleavedSuite {
                    suite: id.to_string(),
                });
            }
            debug!(suite = id, "opening suite");
            self.seen.insert(id.to_string());
            self.open = Some(OpenSuite::new(id.to_string()));
        }

        if let Some(open) = self.open.as_mut() {
            open.accumulate(outcome);
        }
        Ok(())
    }

    /// Id of the suite currently receiving outcomes.
    pub fn current_suite(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.suite_id.as_str())
    }

    pub fn finalized(&self) -> &[SuiteRecord] {
        &self.finalized
    }

    /// Finalize whatever is still open and hand back every suite in
    /// first-seen order. An empty run yields no suites.
    pub fn finish(mut self) -> Vec<SuiteRecord> {
        self.finalize_open();
        self.finalized
    }

    fn finalize_open(&mut self) {
        if let Some(open) = self.open.take() {
            let record = open.finalize();
            debug!(
                suite = %record.suite_name,
                tests = record.tests.len(),
                failures = record.counts.failures(),
                "finalized suite"
            );
            self.finalized.push(record);
        }
    }
}
