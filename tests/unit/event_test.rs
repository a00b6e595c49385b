//! Unit tests for the NDJSON event reader

use tally::event::{parse_events, read_events};
use tally::{Phase, PhaseOutcome};
use tempfile::TempDir;

const LOG: &str = r#"
{"test_id":"tests/test_login.py::test_ok","phase":"setup","outcome":"passed"}
{"test_id":"tests/test_login.py::test_ok","phase":"call","outcome":"failed","expected_failure":true,"duration":0.25,"longrepr":"E   assert 1 == 2"}

{"test_id":"tests/test_login.py::test_ok","phase":"teardown","outcome":"passed"}
"#;

#[test]
fn parses_log_skipping_blank_lines() {
    let events = parse_events(LOG.as_bytes()).unwrap();
    assert_eq!(events.len(), 3);

    let call = &events[1];
    assert_eq!(call.phase, Phase::Call);
    assert_eq!(call.outcome, PhaseOutcome::Failed);
    assert!(call.expected_failure);
    assert_eq!(call.duration, 0.25);
    assert_eq!(call.longrepr.as_deref(), Some("E   assert 1 == 2"));
    assert_eq!(call.test_name(), "test_ok");

    assert!(!events[0].expected_failure);
    assert_eq!(events[0].longrepr, None);
}

#[test]
fn rejects_unknown_phase() {
    let log = r#"{"test_id":"a::b","phase":"collect","outcome":"passed"}"#;
    assert!(parse_events(log.as_bytes()).is_err());
}

#[test]
fn reads_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("events.ndjson");
    std::fs::write(&path, LOG).unwrap();
    assert_eq!(read_events(&path).unwrap().len(), 3);
}

#[test]
fn missing_file_names_path() {
    let err = read_events("/nonexistent/events.ndjson").unwrap_err();
    assert!(err.to_string().contains("events.ndjson"));
}
