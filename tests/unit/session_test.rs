//! Unit tests for report sessions: classification through snapshot

use tally::{PhaseOutcome, RunStatus, Status};

use crate::helpers::{execution, run, session, setup_error, skipped};

#[test]
fn two_suite_run() {
    let mut events = Vec::new();
    events.extend(execution("tests/a.py::t1", PhaseOutcome::Passed));
    events.extend(execution("tests/a.py::t2", PhaseOutcome::Failed));
    events.extend(execution("tests/a.py::t3", PhaseOutcome::Passed));
    events.extend(skipped("tests/b.py::t1"));
    events.extend(setup_error("tests/b.py::t2"));

    let snapshot = run(session(None), &events);

    assert_eq!(snapshot.suites.len(), 2);
    let a = &snapshot.suites[0];
    assert_eq!(a.suite_name, "tests/a.py");
    assert_eq!((a.counts.pass, a.counts.fail), (2, 1));
    let b = &snapshot.suites[1];
    assert_eq!(b.suite_name, "tests/b.py");
    assert_eq!((b.counts.skip, b.counts.error), (1, 1));

    assert_eq!(snapshot.counts.pass, 2);
    assert_eq!(snapshot.counts.fail, 1);
    assert_eq!(snapshot.counts.skip, 1);
    assert_eq!(snapshot.counts.error, 1);
    assert_eq!(snapshot.status, RunStatus::Fail);
    assert_eq!(snapshot.date, "October 18, 2026");
}

#[test]
fn suites_keep_insertion_order_of_tests() {
    let mut events = Vec::new();
    for name in ["t3", "t1", "t2"] {
        events.extend(execution(&format!("a.py::{name}"), PhaseOutcome::Passed));
    }
    let snapshot = run(session(None), &events);
    let names: Vec<&str> = snapshot.suites[0]
        .tests
        .iter()
        .map(|t| t.test_name.as_str())
        .collect();
    assert_eq!(names, ["t3", "t1", "t2"]);
}

#[test]
fn flaky_test_folds_into_one_pass() {
    let mut events = Vec::new();
    events.extend(execution("a.py::flaky", PhaseOutcome::Failed));
    events.extend(execution("a.py::flaky", PhaseOutcome::Failed));
    events.extend(execution("a.py::flaky", PhaseOutcome::Passed));

    let snapshot = run(session(Some(2)), &events);

    assert_eq!(snapshot.total_tests(), 1);
    let test = &snapshot.suites[0].tests[0];
    assert_eq!(test.status, Status::Pass);
    assert_eq!(test.attempt_count, 3);
    assert_eq!(test.reruns(), 2);
    assert_eq!(snapshot.rerun_total, 3);
    assert_eq!(snapshot.status, RunStatus::Pass);
}

#[test]
fn exhausted_reruns_stay_failed() {
    let mut events = Vec::new();
    for _ in 0..3 {
        events.extend(execution("a.py::broken", PhaseOutcome::Failed));
    }
    events.extend(execution("a.py::next", PhaseOutcome::Passed));

    let snapshot = run(session(Some(2)), &events);

    assert_eq!(snapshot.total_tests(), 2);
    let broken = &snapshot.suites[0].tests[0];
    assert_eq!(broken.status, Status::Fail);
    assert_eq!(broken.attempt_count, 3);
    assert_eq!(snapshot.status, RunStatus::Fail);
}

#[test]
fn without_rerun_support_every_execution_counts() {
    let mut events = Vec::new();
    events.extend(execution("a.py::flaky", PhaseOutcome::Failed));
    events.extend(execution("a.py::flaky", PhaseOutcome::Passed));

    let snapshot = run(session(None), &events);
    assert_eq!(snapshot.total_tests(), 2);
    assert_eq!(snapshot.rerun_total, 0);
}

#[test]
fn interleaved_suites_are_rejected() {
    let mut events = Vec::new();
    events.extend(execution("a.py::t1", PhaseOutcome::Passed));
    events.extend(execution("b.py::t1", PhaseOutcome::Passed));
    events.extend(execution("a.py::t2", PhaseOutcome::Passed));

    let mut session = session(None);
    let err = session.on_events(&events).unwrap_err();
    assert!(err.to_string().contains("'a.py'"));
}

#[test]
fn failure_messages_are_extracted() {
    let events = vec![
        tally::LifecycleEvent::new("a.py::t", tally::Phase::Call, PhaseOutcome::Failed)
            .with_longrepr("def test():\n>       assert x\nE       assert 0\nE        +  where 0 = f()"),
        tally::LifecycleEvent::new("a.py::t", tally::Phase::Teardown, PhaseOutcome::Passed),
    ];
    let snapshot = run(session(None), &events);
    let test = &snapshot.suites[0].tests[0];
    assert_eq!(test.message, "   assert 0\n    +  where 0 = f()\n");
}
