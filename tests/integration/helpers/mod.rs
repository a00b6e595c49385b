//! Test helper utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use tally::{
    ArchiveRetention, LifecycleEvent, Phase, PhaseOutcome, ReportPaths, ReportSession,
    SessionSettings,
};
use tempfile::TempDir;

/// `tally` with HOME pointed at `home` so no real config is read.
pub fn tally(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tally").expect("tally binary builds");
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("TALLY_LOG");
    cmd
}

pub fn settings(dir: &Path, retention: ArchiveRetention) -> SessionSettings {
    SessionSettings {
        paths: ReportPaths::resolve(dir.to_str().expect("utf-8 temp path")),
        retention,
        max_rerun: None,
    }
}

/// Run one session of `passes` passing and `fails` failing tests in
/// `suite.py`, started at `start` Unix seconds, and publish it.
pub fn publish_run(settings: &SessionSettings, start: i64, passes: usize, fails: usize) {
    let mut session = ReportSession::start_at(
        settings.clone(),
        Utc.timestamp_opt(start, 0).single().expect("valid start"),
    );
    for i in 0..passes + fails {
        let call = if i < passes {
            PhaseOutcome::Passed
        } else {
            PhaseOutcome::Failed
        };
        let id = format!("suite.py::test_{i}");
        session
            .on_event(&LifecycleEvent::new(&id, Phase::Call, call))
            .unwrap();
        session
            .on_event(&LifecycleEvent::new(&id, Phase::Teardown, PhaseOutcome::Passed))
            .unwrap();
    }
    session.finish().unwrap().expect("run had tests");
}

/// Minimal snapshot JSON with the given counts.
pub fn snapshot_json(start_time: f64, pass: u64, fail: u64) -> String {
    format!(
        r#"{{"date":"October 18, 2026","start_time":{start_time},"total_suite":0,"status":"{}",
            "status_list":{{"pass":"{pass}","fail":"{fail}","skip":"0","error":"0","xpass":"0","xfail":"0","rerun":"0"}},
            "total_tests":"{}","content":{{"suites":{{}}}}}}"#,
        if fail > 0 { "FAIL" } else { "PASS" },
        pass + fail
    )
}

/// Write an archive file and set its modification time to `mtime` Unix seconds.
pub fn write_archive(archive_dir: &Path, name: &str, mtime: u64, contents: &str) -> PathBuf {
    fs::create_dir_all(archive_dir).unwrap();
    let path = archive_dir.join(name);
    fs::write(&path, contents).unwrap();
    set_mtime(&path, mtime);
    path
}

pub fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

/// Sorted file names in `dir`, or empty if it does not exist.
pub fn file_names(dir: &Path) -> Vec<String> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = read_dir
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// NDJSON lines for one complete execution.
pub fn ndjson_execution(test_id: &str, call: &str) -> String {
    format!(
        "{{\"test_id\":\"{test_id}\",\"phase\":\"setup\",\"outcome\":\"passed\"}}\n\
         {{\"test_id\":\"{test_id}\",\"phase\":\"call\",\"outcome\":\"{call}\",\"duration\":0.2}}\n\
         {{\"test_id\":\"{test_id}\",\"phase\":\"teardown\",\"outcome\":\"passed\"}}\n"
    )
}
