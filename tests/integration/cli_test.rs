//! CLI tests against the built binary

use std::fs;

use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{file_names, ndjson_execution, tally};

fn write_events(temp: &TempDir, contents: &str) -> String {
    let path = temp.path().join("events.ndjson");
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("trend"));
}

#[test]
fn ingest_passing_run_exits_zero() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let events = write_events(&out, &ndjson_execution("tests/a.py::t1", "passed"));

    tally(&home)
        .args(["ingest", events.as_str(), "--output"])
        .arg(out.path().join("report"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Run PASS: 1 tests in 1 suites"));

    assert!(out.path().join("report").join("output.json").is_file());
}

#[test]
fn ingest_failing_run_exits_one() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut log = ndjson_execution("tests/a.py::t1", "passed");
    log.push_str(&ndjson_execution("tests/b.py::t1", "failed"));
    let events = write_events(&out, &log);

    tally(&home)
        .args(["ingest", events.as_str(), "--output"])
        .arg(out.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Run FAIL: 2 tests in 2 suites"))
        .stdout(predicate::str::contains("Most failures: tests/b.py"));
}

#[test]
fn ingest_reads_stdin() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    tally(&home)
        .args(["ingest", "-", "--output"])
        .arg(out.path())
        .write_stdin(ndjson_execution("a.py::t", "skipped"))
        .assert()
        .success()
        .stdout(predicate::str::contains("skip 1"));
}

#[test]
fn ingest_folds_reruns_when_asked() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut log = ndjson_execution("a.py::flaky", "failed");
    log.push_str(&ndjson_execution("a.py::flaky", "passed"));
    let events = write_events(&out, &log);

    tally(&home)
        .args(["ingest", events.as_str(), "--max-rerun", "1", "--output"])
        .arg(out.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Run PASS: 1 tests"))
        .stdout(predicate::str::contains("Reruns: 2"));
}

#[test]
fn ingest_malformed_log_is_a_tool_error() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let events = write_events(&out, "{\"test_id\": 1}\n");

    tally(&home)
        .args(["ingest", events.as_str(), "--output"])
        .arg(out.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("line 1"));

    assert_eq!(file_names(out.path()), vec!["events.ndjson"]);
}

#[test]
fn ingest_failed_run_exits_one_even_when_report_cannot_be_written() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let events = write_events(&out, &ndjson_execution("a.py::t", "failed"));
    let blocker = out.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    tally(&home)
        .args(["ingest", events.as_str(), "--output"])
        .arg(blocker.join("sub"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("report not written"));
}

#[test]
fn ingest_rejects_non_finite_start_time() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let events = write_events(&out, &ndjson_execution("a.py::t", "passed"));

    tally(&home)
        .args(["ingest", events.as_str(), "--start-time", "NaN", "--output"])
        .arg(out.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--start-time"));

    assert_eq!(file_names(out.path()), vec!["events.ndjson"]);
}

#[test]
fn ingest_uses_config_file() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let config = home.path().join("tally.toml");
    fs::write(
        &config,
        format!(
            "[report]\noutput = {:?}\narchive_count = \"0\"\n",
            out.path().join("cfg").to_string_lossy()
        ),
    )
    .unwrap();
    let events = write_events(&out, &ndjson_execution("a.py::t", "passed"));

    for _ in 0..2 {
        tally(&home)
            .args(["--config"])
            .arg(&config)
            .args(["ingest", events.as_str()])
            .assert()
            .success();
    }

    assert_eq!(file_names(&out.path().join("cfg")), vec!["output.json"]);
}

#[test]
fn status_trend_history_after_runs() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let events = write_events(&out, &ndjson_execution("a.py::t", "passed"));
    let output = out.path().to_string_lossy().into_owned();

    for start in ["1700000000", "1700000100"] {
        tally(&home)
            .args(["ingest", events.as_str(), "--output", output.as_str()])
            .args(["--start-time", start])
            .assert()
            .success();
    }

    tally(&home)
        .args(["status", "--output", output.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Latest run: PASS"))
        .stdout(predicate::str::contains("Archive: 1 snapshots"));

    tally(&home)
        .args(["trend", "--json", "--output", output.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pass_count\": 1"))
        .stdout(predicate::str::contains("1700000100"));

    tally(&home)
        .args(["history", "--output", output.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("build #2"))
        .stdout(predicate::str::contains("build #1"))
        .stdout(predicate::str::contains("<- current"));
}

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[report]"))
        .stdout(predicate::str::contains("[rerun]"));
}

#[test]
fn config_path_honors_flag() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .args(["--config", "/etc/tally.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/tally.toml"));
}

#[test]
fn completions_for_zsh() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef tally"));
}
