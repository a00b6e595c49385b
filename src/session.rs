//! One test run, from the first lifecycle event to the persisted report.
//!
//! A [`ReportSession`] receives the host's phase reports in order. Each
//! physical execution completes on its teardown report; the resulting
//! outcome goes through rerun folding and suite aggregation. At the end the
//! session produces a [`RunSnapshot`], and [`publish`] rotates the previous
//! snapshot, writes the new one, applies retention and reads back the trend
//! and history.

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info};

use crate::archive::{ArchiveHistory, ArchiveManager, ArchiveRetention, PersistResult, ReportPaths};
use crate::classify::classify;
use crate::error::{ClassifyError, Result};
use crate::event::{LifecycleEvent, Phase};
use crate::highlights::SuiteHighlight;
use crate::outcome::{extract_message, Status, TestOutcome};
use crate::rerun::RerunDeduplicator;
use crate::snapshot::RunSnapshot;
use crate::suite::SuiteAggregator;
use crate::trend::{self, Trend};

/// Report location, retention and rerun threshold for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub paths: ReportPaths,
    pub retention: ArchiveRetention,
    /// `None` turns rerun folding off.
    pub max_rerun: Option<u32>,
}

/// Everything produced by a finished session.
#[derive(Debug)]
pub struct SessionReport {
    pub snapshot: RunSnapshot,
    pub persisted: PersistResult,
    pub trend: Trend,
    pub history: ArchiveHistory,
    pub highlight: Option<SuiteHighlight>,
    pub execution_time: String,
}

/// The physical execution currently between setup and teardown.
#[derive(Debug)]
struct RunningTest {
    test_id: String,
    status: Option<Status>,
    message: String,
    duration: f64,
}

impl RunningTest {
    fn new(test_id: &str) -> Self {
        Self {
            test_id: test_id.to_string(),
            status: None,
            message: String::new(),
            duration: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct ReportSession {
    settings: SessionSettings,
    started_at: DateTime<Local>,
    running: Option<RunningTest>,
    reruns: RerunDeduplicator,
    suites: SuiteAggregator,
    executions: u64,
}

impl ReportSession {
    /// Start a session now.
    pub fn start(settings: SessionSettings) -> Self {
        Self::start_at(settings, Local::now())
    }

    /// Start a session with an explicit start time.
    pub fn start_at<Tz: TimeZone>(settings: SessionSettings, started_at: DateTime<Tz>) -> Self {
        let started_at = started_at.with_timezone(&Local);
        debug!(
            start = %started_at,
            max_rerun = ?settings.max_rerun,
            "report session started"
        );
        Self {
            reruns: RerunDeduplicator::new(settings.max_rerun),
            suites: SuiteAggregator::new(),
            running: None,
            executions: 0,
            started_at,
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Physical executions completed so far.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    /// Handle one phase report.
    ///
    /// A report for a different test than the one running completes the
    /// running test first, as if its teardown had been seen.
    pub fn on_event(&mut self, event: &LifecycleEvent) -> Result<()> {
        if self
            .running
            .as_ref()
            .is_some_and(|running| running.test_id != event.test_id)
        {
            self.complete_running()?;
        }

        let running = self
            .running
            .get_or_insert_with(|| RunningTest::new(&event.test_id));
        running.duration += event.duration;

        if event.carries_outcome() {
            let status = classify(event)?;
            running.status = Some(status);
            running.message = extract_message(status, event.longrepr.as_deref());
        }

        if event.phase == Phase::Teardown {
            self.complete_running()?;
        }
        Ok(())
    }

    /// Feed every event in order.
    pub fn on_events<'a, I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a LifecycleEvent>,
    {
        for event in events {
            self.on_event(event)?;
        }
        Ok(())
    }

    fn complete_running(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        let Some(status) = running.status else {
            return Err(ClassifyError::NoOutcome {
                test_id: running.test_id,
            }
            .into());
        };

        let mut outcome = TestOutcome::new(running.test_id, status);
        outcome.message = running.message;
        outcome.duration = running.duration;
        self.executions += 1;

        for logical in self.reruns.push(outcome) {
            self.suites.push(logical)?;
        }
        Ok(())
    }

    /// Close the session and build its snapshot.
    ///
    /// Returns `None` when no test completed.
    pub fn into_snapshot(mut self) -> Result<Option<RunSnapshot>> {
        self.complete_running()?;
        if let Some(pending) = self.reruns.flush() {
            self.suites.push(pending)?;
        }

        let suites = self.suites.finish();
        if suites.is_empty() {
            info!("no tests completed; nothing to report");
            return Ok(None);
        }

        let snapshot = RunSnapshot::build(suites, &self.started_at);
        info!(
            suites = snapshot.total_suites(),
            tests = snapshot.total_tests(),
            executions = self.executions,
            status = %snapshot.status,
            "run aggregated"
        );
        Ok(Some(snapshot))
    }

    /// Close the session and publish its report.
    pub fn finish(self) -> Result<Option<SessionReport>> {
        let settings = self.settings.clone();
        match self.into_snapshot()? {
            Some(snapshot) => publish(snapshot, &settings).map(Some),
            None => Ok(None),
        }
    }
}

/// Persist `snapshot` and read back the trend and history it belongs to.
pub fn publish(snapshot: RunSnapshot, settings: &SessionSettings) -> Result<SessionReport> {
    let manager = ArchiveManager::new(settings.paths.clone(), settings.retention);

    let persisted = manager.persist(&snapshot)?;
    let trend = trend::compute(&manager)?;
    let history = manager.history()?;

    Ok(SessionReport {
        highlight: SuiteHighlight::from_snapshot(&snapshot),
        execution_time: format_execution_time(snapshot.total_duration()),
        snapshot,
        persisted,
        trend,
        history,
    })
}

/// `"12.34 secs"` under a minute, `"HH:MM:SS Hrs"` otherwise.
pub fn format_execution_time(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{:.2} secs", seconds.max(0.0));
    }
    let total = seconds.round() as u64;
    format!(
        "{:02}:{:02}:{:02} Hrs",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
