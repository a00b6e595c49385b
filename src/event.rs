//! Lifecycle events delivered by the host test runner.
//!
//! The host reports each phase of a test (setup, call, teardown) as one
//! event. Events can also be replayed from an NDJSON log, one JSON object
//! per line:
//!
//! ```text
//! {"test_id":"tests/test_login.py::test_ok","phase":"setup","outcome":"passed"}
//! {"test_id":"tests/test_login.py::test_ok","phase":"call","outcome":"failed","longrepr":"E   assert 1 == 2"}
//! {"test_id":"tests/test_login.py::test_ok","phase":"teardown","outcome":"passed","duration":0.01}
//! ```

use std::fmt;
use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The test phase a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Call => "call",
            Phase::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// Raw result of a single phase as reported by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseOutcome {
    Passed,
    Failed,
    Skipped,
}

/// One phase report for one physical execution of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub test_id: String,
    pub phase: Phase,
    pub outcome: PhaseOutcome,
    /// The test is marked as expected to fail.
    #[serde(default)]
    pub expected_failure: bool,
    /// Seconds spent in this phase.
    #[serde(default)]
    pub duration: f64,
    /// The runner's textual failure representation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longrepr: Option<String>,
}

impl LifecycleEvent {
    pub fn new(test_id: impl Into<String>, phase: Phase, outcome: PhaseOutcome) -> Self {
        Self {
            test_id: test_id.into(),
            phase,
            outcome,
            expected_failure: false,
            duration: 0.0,
            longrepr: None,
        }
    }

    pub fn expected_failure(mut self, flag: bool) -> Self {
        self.expected_failure = flag;
        self
    }

    pub fn with_longrepr(mut self, longrepr: impl Into<String>) -> Self {
        self.longrepr = Some(longrepr.into());
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Passed setup and teardown reports are bookkeeping only.
    pub fn carries_outcome(&self) -> bool {
        self.phase == Phase::Call || self.outcome != PhaseOutcome::Passed
    }

    /// The test's name without its suite path.
    pub fn test_name(&self) -> &str {
        test_name(&self.test_id)
    }
}

/// Last `::`-separated component of a test id.
pub fn test_name(test_id: &str) -> &str {
    test_id.rsplit("::").next().unwrap_or(test_id)
}

/// Parse an NDJSON event log from a file.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<Vec<LifecycleEvent>> {
    let path = path.as_ref();
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open event log: {:?}", path))?;
    parse_events(file).with_context(|| format!("Failed to parse event log: {:?}", path))
}

/// Parse an NDJSON event log from any reader.
pub fn parse_events<R: Read>(reader: R) -> Result<Vec<LifecycleEvent>> {
    let reader = BufReader::new(reader);
    let mut events = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: LifecycleEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid event on line {}", idx + 1))?;
        events.push(event);
    }

    Ok(events)
}
