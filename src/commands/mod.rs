//! Command handlers for the tally CLI.
//!
//! Each submodule handles one command; dispatch stays in main.rs.

pub mod completions;
pub mod config;
pub mod history;
pub mod ingest;
pub mod status;
pub mod trend;

use anyhow::Result;
use std::path::Path;

use tally::cli::OutputArgs;
use tally::{Config, ReportPaths, StatusCounts};

/// Load the configuration from `--config` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Report paths from `--output`, falling back to the configuration.
pub fn report_paths(output: &OutputArgs, config: &Config) -> ReportPaths {
    match output.output.as_deref() {
        Some(output) => ReportPaths::resolve(output),
        None => config.report_paths(),
    }
}

/// `pass 2, fail 1, skip 1, error 1, xpass 0, xfail 0`
pub fn format_counts(counts: &StatusCounts) -> String {
    format!(
        "pass {}, fail {}, skip {}, error {}, xpass {}, xfail {}",
        counts.pass, counts.fail, counts.skip, counts.error, counts.xpass, counts.xfail
    )
}
