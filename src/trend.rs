//! Pass/fail/skip trend over the most recent runs.

use std::path::PathBuf;

use serde::Serialize;

use crate::archive::{self, ArchiveManager, SkippedArchive};
use crate::error::Result;
use crate::snapshot::{self, SnapshotSummary};

/// Most archives read for one trend.
pub const MAX_TREND_ARCHIVES: usize = 5;

/// Longest series: the current run plus [`MAX_TREND_ARCHIVES`].
pub const MAX_TREND_POINTS: usize = MAX_TREND_ARCHIVES + 1;

const LABEL_FORMAT: &str = "%-I:%M %p | %b %d";

/// One run in the trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub pass_count: u64,
    /// FAIL and ERROR together.
    pub fail_count: u64,
    pub skip_count: u64,
    pub start_time: f64,
}

impl TrendPoint {
    pub fn from_summary(summary: &SnapshotSummary) -> Self {
        Self {
            label: trend_label(summary.start_time),
            pass_count: summary.counts.pass,
            fail_count: summary.counts.failures(),
            skip_count: summary.counts.skip,
            start_time: summary.start_time,
        }
    }
}

/// Trend points, current run first, plus any archives that were skipped.
#[derive(Debug, Default)]
pub struct Trend {
    pub points: Vec<TrendPoint>,
    pub skipped: Vec<SkippedArchive>,
}

impl Trend {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Build the trend from `output.json` and the newest archives.
///
/// Archives are taken newest first by file name. Files that cannot be read
/// are skipped without using up a slot.
pub fn compute(manager: &ArchiveManager) -> Result<Trend> {
    let mut trend = Trend::default();

    let current = manager.paths().snapshot_path();
    if current.is_file() {
        read_point(&mut trend, current);
    }

    let mut taken = 0;
    for path in manager.archive_files_newest_first()? {
        if taken == MAX_TREND_ARCHIVES {
            break;
        }
        if read_point(&mut trend, path) {
            taken += 1;
        }
    }

    Ok(trend)
}

fn read_point(trend: &mut Trend, path: PathBuf) -> bool {
    match SnapshotSummary::read(&path) {
        Ok(summary) => {
            trend.points.push(TrendPoint::from_summary(&summary));
            true
        }
        Err(reason) => {
            archive::skip(&mut trend.skipped, path, reason);
            false
        }
    }
}

/// `"2:30 PM | Oct 18"` in local time; empty if the time is not representable.
pub fn trend_label(start_time: f64) -> String {
    snapshot::local_from_epoch(start_time)
        .map(|t| t.format(LABEL_FORMAT).to_string())
        .unwrap_or_default()
}
