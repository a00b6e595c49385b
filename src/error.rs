//! Error types for report generation.
//!
//! Classification problems and filesystem failures are fatal for the step
//! that hit them. Unreadable archives are not errors at this level: the
//! trend and history readers skip them and report them alongside the data.

use std::path::PathBuf;

use crate::event::Phase;

/// An event combination that has no place in the outcome table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("Cannot classify '{test_id}': a passed {phase} report carries no outcome")]
    PassedOutsideCall { test_id: String, phase: Phase },

    #[error("Test '{test_id}' finished without any outcome being reported")]
    NoOutcome { test_id: String },
}

/// Errors raised while aggregating a run or persisting its report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(
        "Suite '{suite}' received results after it was finalized; \
         interleaved (parallel) test delivery is not supported"
    )]
    InterleavedSuite { suite: String },

    #[error("Failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ReportError::Io {
            operation,
            path,
            source,
        }
    }
}

/// Why a persisted snapshot could not be used.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotReadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed snapshot {path}: field '{field}' is not a number ({value:?})")]
    BadCount {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
