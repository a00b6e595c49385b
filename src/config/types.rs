//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveRetention;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub rerun: RerunConfig,
}

/// Where reports are written and how much history is kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report file (`*.html`) or directory; `output.json` and `archive/`
    /// live in its base directory
    #[serde(default = "default_output")]
    pub output: String,
    /// Archive retention: "" keeps everything, "0" disables archiving,
    /// "N" keeps N runs including the current one
    #[serde(default)]
    pub archive_count: ArchiveRetention,
}

pub fn default_output() -> String {
    ".".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            archive_count: ArchiveRetention::default(),
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.output.trim().is_empty() {
            return Err("report.output must not be empty".to_string());
        }
        Ok(())
    }
}

/// Rerun awareness
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerunConfig {
    /// The runner has a rerun capability installed
    #[serde(default)]
    pub enabled: bool,
    /// Maximum reruns of a failing test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rerun: Option<u32>,
}

impl RerunConfig {
    /// The threshold to fold reruns with, or `None` when folding is off.
    ///
    /// Both the capability and a threshold are required.
    pub fn effective_max_rerun(&self) -> Option<u32> {
        if self.enabled {
            self.max_rerun
        } else {
            None
        }
    }
}
