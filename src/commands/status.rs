//! Status command handler

use anyhow::Result;
use humansize::{format_size, BINARY};
use std::path::Path;

use tally::cli::OutputArgs;
use tally::{ArchiveManager, SnapshotSummary};

use super::{format_counts, load_config, report_paths};

/// Show the latest snapshot and how much archive it has behind it.
#[cfg(not(tarpaulin_include))]
pub fn handle(output: &OutputArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let manager = ArchiveManager::new(report_paths(output, &config), config.report.archive_count);
    println!("{}", summary(&manager)?);
    Ok(())
}

pub(crate) fn summary(manager: &ArchiveManager) -> Result<String> {
    let snapshot_path = manager.paths().snapshot_path();
    let mut lines = Vec::new();

    if snapshot_path.is_file() {
        let latest = SnapshotSummary::read(&snapshot_path)?;
        lines.push(format!("Latest run: {} ({})", latest.status, latest.date));
        lines.push(format!(
            "   Tests: {} ({})",
            latest.total_tests,
            format_counts(&latest.counts)
        ));
        lines.push(format!("   Reruns: {}", latest.rerun_total));
    } else {
        lines.push(format!("No snapshot at {}", snapshot_path.display()));
    }

    let archives = manager.list()?;
    let total: u64 = archives.iter().map(|a| a.size).sum();
    let retention = match manager.retention().to_string() {
        s if s.is_empty() => "unbounded".to_string(),
        s => s,
    };
    lines.push(format!(
        "Archive: {} snapshots, {} (retention: {})",
        archives.len(),
        format_size(total, BINARY),
        retention
    ));
    if let Some(oldest) = archives.first() {
        lines.push(format!(
            "   Oldest: {} ({})",
            oldest.filename,
            oldest.modified.format("%Y-%m-%d %H:%M")
        ));
    }

    Ok(lines.join("\n"))
}
