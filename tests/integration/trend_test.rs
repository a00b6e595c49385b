//! Integration tests for trend computation over real report directories

use tally::archive::ArchiveManager;
use tally::trend::{self, trend_label, MAX_TREND_POINTS};
use tally::ArchiveRetention;
use tempfile::TempDir;

use crate::helpers::{publish_run, settings, snapshot_json, write_archive};

#[test]
fn trend_is_capped_regardless_of_history() {
    let temp = TempDir::new().unwrap();
    let settings = settings(temp.path(), ArchiveRetention::Unbounded);
    for k in 0..9 {
        publish_run(&settings, 1_700_000_000 + k * 60, k as usize, 1);
    }

    let manager = ArchiveManager::new(settings.paths.clone(), settings.retention);
    assert_eq!(manager.list().unwrap().len(), 8);

    let trend = trend::compute(&manager).unwrap();
    assert_eq!(trend.len(), MAX_TREND_POINTS);

    let passes: Vec<u64> = trend.points.iter().map(|p| p.pass_count).collect();
    assert_eq!(passes, vec![8, 7, 6, 5, 4, 3]);
    assert!(trend.points.iter().all(|p| p.fail_count == 1));
    assert_eq!(trend.points[0].label, trend_label(1_700_000_480.0));
}

#[test]
fn trend_without_current_snapshot_uses_archives() {
    let temp = TempDir::new().unwrap();
    let settings = settings(temp.path(), ArchiveRetention::Unbounded);
    let manager = ArchiveManager::new(settings.paths.clone(), settings.retention);
    write_archive(
        &settings.paths.archive_dir(),
        "output_1700000000.000000.json",
        100,
        &snapshot_json(1_699_999_000.0, 2, 3),
    );

    let trend = trend::compute(&manager).unwrap();
    assert_eq!(trend.len(), 1);
    assert_eq!(trend.points[0].fail_count, 3);
}

#[test]
fn empty_report_dir_has_empty_trend() {
    let temp = TempDir::new().unwrap();
    let settings = settings(&temp.path().join("missing"), ArchiveRetention::Unbounded);
    let manager = ArchiveManager::new(settings.paths.clone(), settings.retention);

    let trend = trend::compute(&manager).unwrap();
    assert!(trend.is_empty());
    assert!(trend.skipped.is_empty());
}

#[test]
fn unreadable_current_snapshot_is_reported() {
    let temp = TempDir::new().unwrap();
    let settings = settings(temp.path(), ArchiveRetention::Unbounded);
    std::fs::write(settings.paths.snapshot_path(), "not json").unwrap();
    let manager = ArchiveManager::new(settings.paths.clone(), settings.retention);

    let trend = trend::compute(&manager).unwrap();
    assert!(trend.is_empty());
    assert_eq!(trend.skipped.len(), 1);
}
