//! Test statuses, per-status counters and logical test outcomes.

use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::event;
use crate::suite;

/// Number of characters kept in a message preview.
pub const PREVIEW_LEN: usize = 50;

/// The six outcome kinds a test can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "SKIP")]
    Skip,
    #[serde(rename = "xPASS", alias = "XPASS")]
    XPass,
    #[serde(rename = "xFAIL", alias = "XFAIL")]
    XFail,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Pass,
        Status::Fail,
        Status::Skip,
        Status::Error,
        Status::XPass,
        Status::XFail,
    ];

    /// Label used in persisted snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Error => "ERROR",
            Status::Skip => "SKIP",
            Status::XPass => "xPASS",
            Status::XFail => "xFAIL",
        }
    }

    /// FAIL and ERROR; the statuses a rerun policy retries.
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Fail | Status::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One counter per status kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pass: u64,
    pub fail: u64,
    pub skip: u64,
    pub error: u64,
    pub xpass: u64,
    pub xfail: u64,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> u64 {
        match status {
            Status::Pass => self.pass,
            Status::Fail => self.fail,
            Status::Error => self.error,
            Status::Skip => self.skip,
            Status::XPass => self.xpass,
            Status::XFail => self.xfail,
        }
    }

    pub fn slot(&mut self, status: Status) -> &mut u64 {
        match status {
            Status::Pass => &mut self.pass,
            Status::Fail => &mut self.fail,
            Status::Error => &mut self.error,
            Status::Skip => &mut self.skip,
            Status::XPass => &mut self.xpass,
            Status::XFail => &mut self.xfail,
        }
    }

    pub fn increment(&mut self, status: Status) {
        *self.slot(status) += 1;
    }

    pub fn total(&self) -> u64 {
        Status::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// FAIL and ERROR together.
    pub fn failures(&self) -> u64 {
        self.fail + self.error
    }
}

impl AddAssign for StatusCounts {
    fn add_assign(&mut self, rhs: Self) {
        for status in Status::ALL {
            *self.slot(status) += rhs.get(status);
        }
    }
}

/// The rerun-deduplicated result of one test id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub status: Status,
    /// Full failure message.
    pub message: String,
    pub test_name: String,
    /// Physical executions folded into this outcome, persisted as the
    /// number of reruns.
    #[serde(rename = "rerun", with = "rerun_field")]
    pub attempt_count: u32,
    #[serde(default)]
    pub test_id: String,
    #[serde(default)]
    pub duration: f64,
}

impl TestOutcome {
    pub fn new(test_id: impl Into<String>, status: Status) -> Self {
        let test_id = test_id.into();
        Self {
            status,
            message: String::new(),
            test_name: event::test_name(&test_id).to_string(),
            attempt_count: 1,
            test_id,
            duration: 0.0,
        }
    }

    pub fn suite_id(&self) -> &str {
        suite::suite_id(&self.test_id)
    }

    /// Executions beyond the first.
    pub fn reruns(&self) -> u32 {
        self.attempt_count.saturating_sub(1)
    }

    /// The message truncated to [`PREVIEW_LEN`] characters.
    pub fn message_preview(&self) -> &str {
        match self.message.char_indices().nth(PREVIEW_LEN) {
            Some((idx, _)) => &self.message[..idx],
            None => &self.message,
        }
    }

    /// Whether the preview hides part of the message.
    pub fn is_message_truncated(&self) -> bool {
        self.message.chars().count() > PREVIEW_LEN
    }
}

/// Reduce a runner's failure representation to the stored message.
///
/// Assertion-style outcomes (FAIL, XFAIL) keep only the `E   ` lines with
/// their marker removed; ERROR and SKIP keep the whole text; passes carry
/// no message.
pub fn extract_message(status: Status, longrepr: Option<&str>) -> String {
    let Some(longrepr) = longrepr else {
        return String::new();
    };

    match status {
        Status::Fail | Status::XFail => {
            let mut message = String::new();
            for line in longrepr.lines().filter(|l| l.starts_with("E   ")) {
                message.push_str(line);
                message.push('\n');
            }
            message.replace("E    ", "")
        }
        Status::Error | Status::Skip => {
            let mut message = String::new();
            for line in longrepr.lines() {
                message.push_str(line);
                message.push('\n');
            }
            message
        }
        Status::Pass | Status::XPass => String::new(),
    }
}

/// `attempt_count` is stored as a string-encoded rerun count.
mod rerun_field {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(attempts: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&attempts.saturating_sub(1).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u32),
        }

        let reruns = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s.trim().parse::<u32>().map_err(de::Error::custom)?,
        };
        Ok(reruns + 1)
    }
}
