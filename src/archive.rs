//! Report directory management: snapshot rotation, retention and history.
//!
//! Layout of a report directory:
//!
//! ```text
//! <base>/output.json                      latest snapshot
//! <base>/archive/output_<start>.json      earlier snapshots
//! ```
//!
//! Before a new snapshot is written, the previous `output.json` moves into
//! `archive/` under a name suffixed with the new run's start time, so file
//! names sort chronologically. The retention sweep then trims the archive
//! oldest-first by modification time.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use humansize::{format_size, BINARY};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ReportError, Result, SnapshotReadError};
use crate::snapshot::{RunSnapshot, SnapshotSummary};

/// File name of the latest snapshot.
pub const SNAPSHOT_FILE: &str = "output.json";

/// Subdirectory holding archived snapshots.
pub const ARCHIVE_DIR: &str = "archive";

/// Report file name used when the output is a directory.
pub const DEFAULT_REPORT_FILE: &str = "report.html";

/// How many runs to keep on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArchiveRetention {
    /// Keep every archive (`""`).
    #[default]
    Unbounded,
    /// No archive at all (`"0"`).
    Disabled,
    /// Keep this many runs, the current one included.
    Keep(u32),
}

impl FromStr for ArchiveRetention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ArchiveRetention::Unbounded);
        }
        match s.parse::<u32>() {
            Ok(0) => Ok(ArchiveRetention::Disabled),
            Ok(n) => Ok(ArchiveRetention::Keep(n)),
            Err(_) => Err(format!(
                "Invalid archive count '{}': expected an empty value or a non-negative integer",
                s
            )),
        }
    }
}

impl TryFrom<String> for ArchiveRetention {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArchiveRetention> for String {
    fn from(retention: ArchiveRetention) -> Self {
        retention.to_string()
    }
}

impl fmt::Display for ArchiveRetention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveRetention::Unbounded => Ok(()),
            ArchiveRetention::Disabled => f.write_str("0"),
            ArchiveRetention::Keep(n) => write!(f, "{}", n),
        }
    }
}

/// Locations derived from the configured report output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    base_dir: PathBuf,
    report_file: String,
}

impl ReportPaths {
    /// Resolve an output setting. A value ending in `.html` names the report
    /// file itself; anything else is the report directory.
    pub fn resolve(output: &str) -> Self {
        let expanded = expand_home(output.trim());

        let is_file = expanded
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));

        if is_file {
            let report_file = expanded
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string());
            let base_dir = match expanded.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            Self {
                base_dir,
                report_file,
            }
        } else {
            Self {
                base_dir: expanded,
                report_file: DEFAULT_REPORT_FILE.to_string(),
            }
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where a renderer should write the report.
    pub fn report_path(&self) -> PathBuf {
        self.base_dir.join(&self.report_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.base_dir.join(SNAPSHOT_FILE)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.base_dir.join(ARCHIVE_DIR)
    }

    /// Archive name for the snapshot displaced by a run started at `start_time`.
    pub fn archive_path_for(&self, start_time: f64) -> PathBuf {
        let stem = Path::new(SNAPSHOT_FILE)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.archive_dir()
            .join(format!("{}_{:.6}.json", stem, start_time))
    }
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// An archived snapshot file.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl ArchiveEntry {
    /// Get human-readable size
    pub fn size_human(&self) -> String {
        format_size(self.size, BINARY)
    }

    /// The start time encoded in the file name, if it has one.
    pub fn start_time(&self) -> Option<f64> {
        let stem = self.filename.strip_suffix(".json")?;
        let (_, suffix) = stem.split_once('_')?;
        suffix.parse().ok()
    }
}

/// An archive file that could not be used.
#[derive(Debug)]
pub struct SkippedArchive {
    pub path: PathBuf,
    pub reason: SnapshotReadError,
}

/// What the retention sweep removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    pub deleted: Vec<PathBuf>,
    pub removed_dir: bool,
}

/// Result of persisting a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistResult {
    pub snapshot_path: PathBuf,
    /// Where the previous snapshot went, if there was one.
    pub rotated: Option<PathBuf>,
    pub swept: SweepResult,
}

/// One row of the run history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// `build #N`; the current run has the highest number.
    pub build: usize,
    pub path: PathBuf,
    pub is_current: bool,
    pub summary: SnapshotSummary,
}

/// Current and archived runs, newest first.
#[derive(Debug, Default)]
pub struct ArchiveHistory {
    pub entries: Vec<HistoryEntry>,
    pub skipped: Vec<SkippedArchive>,
}

/// Manages `output.json` and the `archive/` directory of one report.
#[derive(Debug, Clone)]
pub struct ArchiveManager {
    paths: ReportPaths,
    retention: ArchiveRetention,
}

impl ArchiveManager {
    pub fn new(paths: ReportPaths, retention: ArchiveRetention) -> Self {
        Self { paths, retention }
    }

    pub fn paths(&self) -> &ReportPaths {
        &self.paths
    }

    pub fn retention(&self) -> ArchiveRetention {
        self.retention
    }

    /// Ensure the report base directory exists
    pub fn ensure_base_dir(&self) -> Result<PathBuf> {
        let dir = self.paths.base_dir().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(ReportError::io("create directory", &dir))?;
        }
        Ok(dir)
    }

    /// Move an existing `output.json` into the archive.
    ///
    /// `start_time` is the start of the run about to replace it.
    pub fn rotate(&self, start_time: f64) -> Result<Option<PathBuf>> {
        let current = self.paths.snapshot_path();
        if !current.is_file() {
            return Ok(None);
        }

        let archive_dir = self.paths.archive_dir();
        fs::create_dir_all(&archive_dir)
            .map_err(ReportError::io("create directory", &archive_dir))?;

        let target = unique_path(self.paths.archive_path_for(start_time));
        fs::rename(&current, &target).map_err(ReportError::io("archive", &current))?;
        info!(from = %current.display(), to = %target.display(), "archived previous snapshot");

        Ok(Some(target))
    }

    /// List archived snapshots, oldest first by modification time.
    pub fn list(&self) -> Result<Vec<ArchiveEntry>> {
        let archive_dir = self.paths.archive_dir();
        if !archive_dir.is_dir() {
            return Ok(Vec::new());
        }

        let read_dir =
            fs::read_dir(&archive_dir).map_err(ReportError::io("read directory", &archive_dir))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(ReportError::io("read directory", &archive_dir))?;
            let path = entry.path();

            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            let metadata = fs::metadata(&path).map_err(ReportError::io("stat", &path))?;
            if !metadata.is_file() {
                continue;
            }
            let modified: DateTime<Local> = metadata
                .modified()
                .map_err(ReportError::io("stat", &path))?
                .into();

            entries.push(ArchiveEntry {
                filename: path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string(),
                size: metadata.len(),
                modified,
                path,
            });
        }

        // Names carry the rotation time, so they break mtime ties.
        entries.sort_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        Ok(entries)
    }

    /// Archived snapshot files, newest first by name.
    pub fn archive_files_newest_first(&self) -> Result<Vec<PathBuf>> {
        let mut entries = self.list()?;
        entries.sort_by(|a, b| b.filename.cmp(&a.filename));
        Ok(entries.into_iter().map(|e| e.path).collect())
    }

    /// Apply the retention policy to the archive directory.
    ///
    /// With `Keep(n)` at most `n - 1` archives survive, leaving room for the
    /// current snapshot. Only `*.json` files count as archives; anything
    /// else in the directory is left alone.
    pub fn sweep(&self) -> Result<SweepResult> {
        let mut result = SweepResult::default();

        match self.retention {
            ArchiveRetention::Unbounded => {}
            ArchiveRetention::Disabled => {
                let archive_dir = self.paths.archive_dir();
                if archive_dir.is_dir() {
                    fs::remove_dir_all(&archive_dir)
                        .map_err(ReportError::io("remove directory", &archive_dir))?;
                    info!(dir = %archive_dir.display(), "archiving disabled; removed archive");
                    result.removed_dir = true;
                }
            }
            ArchiveRetention::Keep(n) => {
                let keep = n.saturating_sub(1) as usize;
                let entries = self.list()?;
                let excess = entries.len().saturating_sub(keep);
                for entry in entries.into_iter().take(excess) {
                    fs::remove_file(&entry.path).map_err(ReportError::io("delete", &entry.path))?;
                    debug!(path = %entry.path.display(), "deleted expired archive");
                    result.deleted.push(entry.path);
                }
            }
        }

        Ok(result)
    }

    /// Rotate the previous snapshot, write `snapshot` and apply retention.
    pub fn persist(&self, snapshot: &RunSnapshot) -> Result<PersistResult> {
        self.ensure_base_dir()?;

        let rotated = if self.retention == ArchiveRetention::Disabled {
            None
        } else {
            self.rotate(snapshot.start_time)?
        };

        let snapshot_path = self.paths.snapshot_path();
        snapshot.write(&snapshot_path)?;
        info!(path = %snapshot_path.display(), status = %snapshot.status, "wrote snapshot");

        let swept = self.sweep()?;

        Ok(PersistResult {
            snapshot_path,
            rotated,
            swept,
        })
    }

    /// Build numbered history rows for the current snapshot and archives.
    ///
    /// Unreadable files are skipped and reported; they keep their build
    /// number so the numbering matches the files on disk.
    pub fn history(&self) -> Result<ArchiveHistory> {
        let archives = self.archive_files_newest_first()?;
        let mut history = ArchiveHistory::default();

        let current = self.paths.snapshot_path();
        if current.is_file() {
            match SnapshotSummary::read(&current) {
                Ok(summary) => history.entries.push(HistoryEntry {
                    build: archives.len() + 1,
                    path: current,
                    is_current: true,
                    summary,
                }),
                Err(reason) => skip(&mut history.skipped, current, reason),
            }
        }

        let total = archives.len();
        for (idx, path) in archives.into_iter().enumerate() {
            match SnapshotSummary::read(&path) {
                Ok(summary) => history.entries.push(HistoryEntry {
                    build: total - idx,
                    path,
                    is_current: false,
                    summary,
                }),
                Err(reason) => skip(&mut history.skipped, path, reason),
            }
        }

        Ok(history)
    }
}

pub(crate) fn skip(skipped: &mut Vec<SkippedArchive>, path: PathBuf, reason: SnapshotReadError) {
    warn!(path = %path.display(), error = %reason, "skipping unreadable snapshot");
    skipped.push(SkippedArchive { path, reason });
}

/// Append `_1`, `_2`, ... to the stem until the path is free.
fn unique_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = parent.join(format!("{}_{}.json", stem, n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
