//! Unit tests for configuration

use std::path::Path;

use tally::config::{Config, RerunConfig};
use tally::ArchiveRetention;
use tempfile::TempDir;

#[test]
fn default_config_keeps_everything_and_ignores_reruns() {
    let config = Config::default();
    assert_eq!(config.report.output, ".");
    assert_eq!(config.report.archive_count, ArchiveRetention::Unbounded);
    assert!(!config.rerun.enabled);
    assert_eq!(config.rerun.effective_max_rerun(), None);
}

#[test]
fn parses_full_config() {
    let config: Config = toml::from_str(
        r#"
        [report]
        output = "reports/nightly.html"
        archive_count = "5"

        [rerun]
        enabled = true
        max_rerun = 2
        "#,
    )
    .unwrap();

    assert_eq!(config.report.archive_count, ArchiveRetention::Keep(5));
    assert_eq!(config.rerun.effective_max_rerun(), Some(2));

    let settings = config.session_settings();
    assert_eq!(settings.paths.base_dir(), Path::new("reports"));
    assert_eq!(settings.retention, ArchiveRetention::Keep(5));
    assert_eq!(settings.max_rerun, Some(2));
}

#[test]
fn missing_sections_use_defaults() {
    let config: Config = toml::from_str("[rerun]\nenabled = true\n").unwrap();
    assert_eq!(config.report.output, ".");
    assert_eq!(config.rerun.max_rerun, None);
}

#[test]
fn archive_count_zero_disables_archiving() {
    let config: Config = toml::from_str("[report]\narchive_count = \"0\"\n").unwrap();
    assert_eq!(config.report.archive_count, ArchiveRetention::Disabled);
}

#[test]
fn archive_count_rejects_garbage() {
    let result: Result<Config, _> = toml::from_str("[report]\narchive_count = \"many\"\n");
    assert!(result.is_err());
}

#[test]
fn rerun_threshold_needs_capability() {
    let rerun = RerunConfig {
        enabled: false,
        max_rerun: Some(3),
    };
    assert_eq!(rerun.effective_max_rerun(), None);

    let rerun = RerunConfig {
        enabled: true,
        max_rerun: None,
    };
    assert_eq!(rerun.effective_max_rerun(), None);
}

#[test]
fn save_then_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.report.output = "out".to_string();
    config.report.archive_count = ArchiveRetention::Keep(3);
    config.rerun.enabled = true;
    config.rerun.max_rerun = Some(1);

    config.save_to(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn load_rejects_empty_output() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[report]\noutput = \"  \"\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("report.output"));
}

#[test]
fn load_reports_parse_errors_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[report\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
