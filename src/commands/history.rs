//! History command handler

use anyhow::Result;
use std::path::Path;

use tally::archive::ArchiveHistory;
use tally::cli::OutputArgs;
use tally::ArchiveManager;

use super::{load_config, report_paths};

#[cfg(not(tarpaulin_include))]
pub fn handle(output: &OutputArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let manager = ArchiveManager::new(report_paths(output, &config), config.report.archive_count);
    let history = manager.history()?;

    println!("{}", render(&history));
    for skipped in &history.skipped {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    Ok(())
}

pub(crate) fn render(history: &ArchiveHistory) -> String {
    if history.entries.is_empty() {
        return "No builds recorded yet.".to_string();
    }

    history
        .entries
        .iter()
        .map(|entry| {
            let s = &entry.summary;
            let started = s
                .started_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| s.date.clone());
            format!(
                "build #{:<4} {}  {}  {} tests (pass {}, fail {}, skip {}, error {}, rerun {}){}",
                entry.build,
                s.status,
                started,
                s.total_tests,
                s.counts.pass,
                s.counts.fail,
                s.counts.skip,
                s.counts.error,
                s.rerun_total,
                if entry.is_current { "  <- current" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
