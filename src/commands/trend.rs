//! Trend command handler

use anyhow::{Context, Result};
use std::path::Path;

use tally::cli::OutputArgs;
use tally::trend::{self, Trend};
use tally::ArchiveManager;

use super::{load_config, report_paths};

#[cfg(not(tarpaulin_include))]
pub fn handle(output: &OutputArgs, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let manager = ArchiveManager::new(report_paths(output, &config), config.report.archive_count);
    let trend = trend::compute(&manager)?;

    if json {
        let text =
            serde_json::to_string_pretty(&trend.points).context("Failed to serialize trend")?;
        println!("{}", text);
    } else {
        println!("{}", render(&trend));
    }
    for skipped in &trend.skipped {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    Ok(())
}

pub(crate) fn render(trend: &Trend) -> String {
    if trend.is_empty() {
        return "No runs recorded yet.".to_string();
    }

    let width = trend
        .points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<width$}  {:>5}  {:>5}  {:>5}", "Run", "pass", "fail", "skip");
    for point in &trend.points {
        out.push('\n');
        out.push_str(&format!(
            "{:<width$}  {:>5}  {:>5}  {:>5}",
            point.label, point.pass_count, point.fail_count, point.skip_count
        ));
    }
    out
}
