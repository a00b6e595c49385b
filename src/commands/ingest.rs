//! Ingest command handler

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;

use tally::cli::IngestArgs;
use tally::event::{parse_events, read_events};
use tally::session::{self, SessionReport};
use tally::{Config, LifecycleEvent, ReportSession, RunSnapshot, RunStatus, SessionSettings};

use super::{format_counts, load_config, report_paths};

/// Aggregate an event log and publish the snapshot.
///
/// Returns the run status, or `None` when no test completed. A failure to
/// write the report is logged but does not change the returned status.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &IngestArgs, config_path: Option<&Path>) -> Result<Option<RunStatus>> {
    let config = load_config(config_path)?;
    let settings = settings_for(args, &config);
    let events = read_input(&args.events)?;
    let started_at = start_time(args.start_time)?;

    let Some(snapshot) = aggregate(&events, settings.clone(), started_at)? else {
        println!("No tests completed; nothing written.");
        return Ok(None);
    };
    let status = snapshot.status;

    match session::publish(snapshot, &settings) {
        Ok(report) => print_report(&report),
        Err(e) => {
            tracing::error!(error = %e, "failed to write report");
            eprintln!("Error: report not written: {}", e);
        }
    }

    Ok(Some(status))
}

/// Run `events` through a session started at `started_at`.
pub(crate) fn aggregate(
    events: &[LifecycleEvent],
    settings: SessionSettings,
    started_at: DateTime<Utc>,
) -> Result<Option<RunSnapshot>> {
    let mut session = ReportSession::start_at(settings, started_at);
    session
        .on_events(events)
        .context("Failed to aggregate events")?;
    Ok(session.into_snapshot()?)
}

/// Merge command-line overrides into the configured settings.
pub(crate) fn settings_for(args: &IngestArgs, config: &Config) -> SessionSettings {
    let mut settings = config.session_settings();
    settings.paths = report_paths(&args.output, config);
    if let Some(retention) = args.archive_count {
        settings.retention = retention;
    }
    if args.no_rerun {
        settings.max_rerun = None;
    } else if args.max_rerun.is_some() {
        settings.max_rerun = args.max_rerun;
    }
    settings
}

fn read_input(source: &str) -> Result<Vec<LifecycleEvent>> {
    if source == "-" {
        parse_events(io::stdin().lock()).context("Failed to parse events from stdin")
    } else {
        read_events(source)
    }
}

fn start_time(epoch: Option<f64>) -> Result<DateTime<Utc>> {
    let Some(epoch) = epoch else {
        return Ok(Utc::now());
    };
    ensure!(epoch.is_finite(), "Invalid --start-time: {}", epoch);
    let secs = epoch.floor();
    let nanos = ((epoch - secs) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .with_context(|| format!("Invalid --start-time: {}", epoch))
}

fn print_report(report: &SessionReport) {
    let snapshot = &report.snapshot;
    println!(
        "Run {}: {} tests in {} suites ({})",
        snapshot.status,
        snapshot.total_tests(),
        snapshot.total_suites(),
        format_counts(&snapshot.counts)
    );
    if snapshot.rerun_total > 0 {
        println!("   Reruns: {}", snapshot.rerun_total);
    }
    println!("   Execution time: {}", report.execution_time);
    println!("   Snapshot: {}", report.persisted.snapshot_path.display());
    if let Some(rotated) = &report.persisted.rotated {
        println!("   Archived previous run: {}", rotated.display());
    }
    if !report.persisted.swept.deleted.is_empty() {
        println!(
            "   Removed {} expired archive(s)",
            report.persisted.swept.deleted.len()
        );
    }
    if let Some(highlight) = &report.highlight {
        println!(
            "   Most failures: {} ({} of {}, {:.2}%)",
            highlight.suite_name,
            highlight.failure_count,
            highlight.total_tests,
            highlight.failure_percent
        );
    }
    println!(
        "   Trend: {} run(s), history: {} build(s)",
        report.trend.len(),
        report.history.entries.len()
    );
}
