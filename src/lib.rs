//! tally library
//!
//! Aggregates the lifecycle events of a test run into per-suite results,
//! persists the run snapshot with a rotating archive and computes trends
//! over recent runs.

pub mod archive;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod highlights;
pub mod outcome;
pub mod rerun;
pub mod session;
pub mod snapshot;
pub mod suite;
pub mod trend;

pub use archive::{ArchiveManager, ArchiveRetention, ReportPaths};
pub use classify::classify;
pub use config::Config;
pub use error::{ClassifyError, ReportError, SnapshotReadError};
pub use event::{LifecycleEvent, Phase, PhaseOutcome};
pub use highlights::SuiteHighlight;
pub use outcome::{Status, StatusCounts, TestOutcome};
pub use rerun::RerunDeduplicator;
pub use session::{ReportSession, SessionReport, SessionSettings};
pub use snapshot::{RunSnapshot, RunStatus, SnapshotSummary};
pub use suite::{SuiteAggregator, SuiteRecord};
pub use trend::{Trend, TrendPoint};
