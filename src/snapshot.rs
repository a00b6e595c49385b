//! The persisted summary of one test run.
//!
//! A [`RunSnapshot`] is built once, at session finish, from the finalized
//! suites. On disk it keeps the layout report renderers already consume:
//!
//! ```text
//! {
//!   "version": 1,
//!   "date": "October 18, 2026",
//!   "start_time": 1792300000.5,
//!   "total_suite": 2,
//!   "status": "FAIL",
//!   "status_list": {"pass": "2", "fail": "1", ..., "rerun": "0"},
//!   "total_tests": "5",
//!   "content": {"suites": {"0": {...}, "1": {...}}}
//! }
//! ```
//!
//! Readers that only need the headline numbers (trends, history) use
//! [`SnapshotSummary`], which ignores `content` entirely.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result, SnapshotReadError};
use crate::outcome::StatusCounts;
use crate::suite::SuiteRecord;

/// Current layout version written to `output.json`.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Format of the human-readable `date` field.
pub const DATE_FORMAT: &str = "%B %d, %Y";

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[serde(rename = "PASS", alias = "pass")]
    Pass,
    #[serde(rename = "FAIL", alias = "fail")]
    Fail,
}

impl RunStatus {
    pub fn from_counts(counts: &StatusCounts) -> Self {
        if counts.failures() > 0 {
            RunStatus::Fail
        } else {
            RunStatus::Pass
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pass => "PASS",
            RunStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finalized suites plus aggregate totals for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RunSnapshotRepr", try_from = "RunSnapshotRepr")]
pub struct RunSnapshot {
    pub version: u32,
    pub date: String,
    /// Session start, seconds since the Unix epoch.
    pub start_time: f64,
    pub suites: Vec<SuiteRecord>,
    pub counts: StatusCounts,
    pub rerun_total: u64,
    pub status: RunStatus,
}

impl RunSnapshot {
    /// Compose the snapshot for a session that started at `started_at`.
    pub fn build<Tz: TimeZone>(suites: Vec<SuiteRecord>, started_at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let mut counts = StatusCounts::default();
        let mut rerun_total = 0;
        for suite in &suites {
            counts += suite.counts;
            rerun_total += suite.rerun_total;
        }

        Self {
            version: SNAPSHOT_VERSION,
            date: started_at.format(DATE_FORMAT).to_string(),
            start_time: epoch_seconds(started_at),
            status: RunStatus::from_counts(&counts),
            suites,
            counts,
            rerun_total,
        }
    }

    pub fn total_tests(&self) -> u64 {
        self.counts.total()
    }

    pub fn total_suites(&self) -> usize {
        self.suites.len()
    }

    /// Sum of recorded test durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.suites
            .iter()
            .flat_map(|s| &s.tests)
            .map(|t| t.duration)
            .sum()
    }

    /// Start time in local time, if representable.
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        local_from_epoch(self.start_time)
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            date: self.date.clone(),
            start_time: self.start_time,
            status: self.status,
            counts: self.counts,
            rerun_total: self.rerun_total,
            total_tests: self.total_tests(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot as JSON to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(ReportError::io("write", path))
    }

    /// Load a complete snapshot, suites included.
    pub fn read<P: AsRef<Path>>(path: P) -> std::result::Result<Self, SnapshotReadError> {
        let path = path.as_ref();
        let contents = read_file(path)?;
        serde_json::from_str(&contents).map_err(|source| SnapshotReadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Headline numbers of a persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub date: String,
    pub start_time: f64,
    pub status: RunStatus,
    pub counts: StatusCounts,
    pub rerun_total: u64,
    pub total_tests: u64,
}

impl SnapshotSummary {
    /// Read only the top-level fields of a snapshot file.
    pub fn read<P: AsRef<Path>>(path: P) -> std::result::Result<Self, SnapshotReadError> {
        let path = path.as_ref();
        let contents = read_file(path)?;
        let repr: SummaryRepr =
            serde_json::from_str(&contents).map_err(|source| SnapshotReadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let list = repr
            .status_list
            .parse()
            .map_err(|(field, value)| SnapshotReadError::BadCount {
                path: path.to_path_buf(),
                field,
                value,
            })?;
        let total_tests = match repr.total_tests {
            Some(count) => count
                .parse("total_tests")
                .map_err(|(field, value)| SnapshotReadError::BadCount {
                    path: path.to_path_buf(),
                    field,
                    value,
                })?,
            None => list.counts.total(),
        };

        Ok(Self {
            date: repr.date,
            start_time: repr.start_time,
            status: repr.status,
            counts: list.counts,
            rerun_total: list.rerun,
            total_tests,
        })
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        local_from_epoch(self.start_time)
    }
}

fn read_file(path: &Path) -> std::result::Result<String, SnapshotReadError> {
    fs::read_to_string(path).map_err(|source| SnapshotReadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn epoch_seconds<Tz: TimeZone>(at: &DateTime<Tz>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}

pub(crate) fn local_from_epoch(seconds: f64) -> Option<DateTime<Local>> {
    if !seconds.is_finite() {
        return None;
    }
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1_000_000_000.0).round() as u32;
    Local.timestamp_opt(secs as i64, nanos.min(999_999_999)).single()
}

/// A count stored as a string (current layout) or a bare number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    fn parse(&self, field: &'static str) -> std::result::Result<u64, (&'static str, String)> {
        match self {
            Count::Number(n) => Ok(*n),
            Count::Text(s) => s.trim().parse().map_err(|_| (field, s.clone())),
        }
    }
}

impl From<u64> for Count {
    fn from(n: u64) -> Self {
        Count::Text(n.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StatusListRepr {
    pass: Count,
    fail: Count,
    skip: Count,
    error: Count,
    xpass: Count,
    xfail: Count,
    /// Absent in snapshots written without rerun support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rerun: Option<Count>,
}

struct StatusList {
    counts: StatusCounts,
    rerun: u64,
}

impl StatusListRepr {
    fn new(counts: &StatusCounts, rerun: u64) -> Self {
        Self {
            pass: counts.pass.into(),
            fail: counts.fail.into(),
            skip: counts.skip.into(),
            error: counts.error.into(),
            xpass: counts.xpass.into(),
            xfail: counts.xfail.into(),
            rerun: Some(rerun.into()),
        }
    }

    fn parse(&self) -> std::result::Result<StatusList, (&'static str, String)> {
        Ok(StatusList {
            counts: StatusCounts {
                pass: self.pass.parse("pass")?,
                fail: self.fail.parse("fail")?,
                skip: self.skip.parse("skip")?,
                error: self.error.parse("error")?,
                xpass: self.xpass.parse("xpass")?,
                xfail: self.xfail.parse("xfail")?,
            },
            rerun: match &self.rerun {
                Some(count) => count.parse("rerun")?,
                None => 0,
            },
        })
    }
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    suites: BTreeMap<usize, SuiteRecord>,
}

#[derive(Serialize, Deserialize)]
struct RunSnapshotRepr {
    #[serde(default = "legacy_version")]
    version: u32,
    date: String,
    start_time: f64,
    total_suite: usize,
    status: RunStatus,
    status_list: StatusListRepr,
    total_tests: Count,
    content: Content,
}

fn legacy_version() -> u32 {
    1
}

#[derive(Deserialize)]
struct SummaryRepr {
    date: String,
    start_time: f64,
    status: RunStatus,
    status_list: StatusListRepr,
    #[serde(default)]
    total_tests: Option<Count>,
}

impl From<RunSnapshot> for RunSnapshotRepr {
    fn from(snapshot: RunSnapshot) -> Self {
        Self {
            version: snapshot.version,
            date: snapshot.date,
            start_time: snapshot.start_time,
            total_suite: snapshot.suites.len(),
            status: snapshot.status,
            status_list: StatusListRepr::new(&snapshot.counts, snapshot.rerun_total),
            total_tests: snapshot.counts.total().into(),
            content: Content {
                suites: snapshot.suites.into_iter().enumerate().collect(),
            },
        }
    }
}

impl TryFrom<RunSnapshotRepr> for RunSnapshot {
    type Error = String;

    fn try_from(repr: RunSnapshotRepr) -> std::result::Result<Self, Self::Error> {
        let list = repr
            .status_list
            .parse()
            .map_err(|(field, value)| format!("status_list.{field} is not a count: {value:?}"))?;

        Ok(Self {
            version: repr.version,
            date: repr.date,
            start_time: repr.start_time,
            suites: repr.content.suites.into_values().collect(),
            counts: list.counts,
            rerun_total: list.rerun,
            status: repr.status,
        })
    }
}
