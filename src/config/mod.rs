//! Configuration management for tally

mod io;
mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::archive::ReportPaths;
use crate::session::SessionSettings;

impl Config {
    /// Get the config file path (~/.config/tally/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from an explicit file, or return defaults if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Resolve the report output into its base directory and file name
    pub fn report_paths(&self) -> ReportPaths {
        ReportPaths::resolve(&self.report.output)
    }

    /// Everything a report session needs from the configuration
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            paths: self.report_paths(),
            retention: self.report.archive_count,
            max_rerun: self.rerun.effective_max_rerun(),
        }
    }
}
