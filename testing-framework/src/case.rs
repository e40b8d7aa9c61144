//! Event-scheduled test cases
//!
//! A test case registers pairs of checkpoints with the host scheduler: a
//! setup action at one simulated time and an evaluation action at a later
//! one. [`EventTest`] holds the bookkeeping shared by every concrete test;
//! concrete tests embed it and implement [`TestCase`].

use crate::conservation::Snapshot;
use crate::datalog::LoggedVariable;
use crate::error::HarnessResult;
use crate::orchestrator::{EventAction, EventScheduler};

/// Delay between the last evaluation and a test's tear-down event (seconds)
pub const TEAR_DOWN_DELAY: f64 = 0.1;

/// Name and console messages of a test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    /// Unique within a run; prefixes every event name
    pub name: String,
    /// Logged when the test is set up
    pub start_message: String,
    /// Logged at tear-down
    pub finish_message: String,
}

impl TestInfo {
    /// Build from the three strings
    pub fn new(
        name: impl Into<String>,
        start_message: impl Into<String>,
        finish_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_message: start_message.into(),
            finish_message: finish_message.into(),
        }
    }
}

/// Registration bookkeeping shared by concrete tests
#[derive(Debug, Clone)]
pub struct EventTest {
    info: TestInfo,
    last_test_time: f64,
}

impl EventTest {
    /// Base for a test named `name`
    pub fn new(info: TestInfo) -> Self {
        Self {
            info,
            last_test_time: 0.0,
        }
    }

    /// Test identity
    pub fn info(&self) -> &TestInfo {
        &self.info
    }

    /// Latest evaluation time registered so far
    pub fn last_test_time(&self) -> f64 {
        self.last_test_time
    }

    /// Register `setup` at `start_time` and `evaluate` at `finish_time`
    ///
    /// Events are named `{test}{event}Setup` and `{test}{event}Evaluate`.
    /// Ordering is not checked here; scheduler errors are passed through.
    pub fn register_checkpoint(
        &mut self,
        scheduler: &mut dyn EventScheduler,
        event_name: &str,
        start_time: f64,
        setup: EventAction,
        finish_time: f64,
        evaluate: EventAction,
    ) -> HarnessResult<()> {
        log::info!(
            "Scheduling setup of : {} for time : {} seconds.",
            event_name,
            start_time
        );
        scheduler.schedule(
            format!("{}{}Setup", self.info.name, event_name),
            start_time,
            setup,
        )?;

        log::info!(
            "Scheduling evaluation of : {} for time : {} seconds.",
            event_name,
            finish_time
        );
        scheduler.schedule(
            format!("{}{}Evaluate", self.info.name, event_name),
            finish_time,
            evaluate,
        )?;

        self.last_test_time = self.last_test_time.max(finish_time);
        Ok(())
    }

    /// Register the tear-down event and announce the test
    ///
    /// Tear-down fires [`TEAR_DOWN_DELAY`] after the last evaluation, logs the
    /// finish message and then runs `tear_down_checks` if given.
    pub fn setup(
        &self,
        scheduler: &mut dyn EventScheduler,
        tear_down_checks: Option<EventAction>,
    ) -> HarnessResult<()> {
        let name = self.info.name.clone();
        let finish_message = self.info.finish_message.clone();
        let mut checks = tear_down_checks;

        scheduler.schedule(
            format!("{}TearDown", self.info.name),
            self.last_test_time + TEAR_DOWN_DELAY,
            Box::new(move |ctx| {
                log::info!("{} tear down at t={}s", name, ctx.sim_time);
                if !finish_message.is_empty() {
                    log::info!("{}", finish_message);
                }
                if let Some(checks) = checks.as_mut() {
                    checks(ctx);
                }
            }),
        )?;

        log::info!("{} has been initiated.", self.info.name);
        if !self.info.start_message.is_empty() {
            log::info!("{}", self.info.start_message);
        }
        Ok(())
    }

    /// Action that does nothing, for checkpoints without setup or evaluation
    pub fn no_op() -> EventAction {
        Box::new(|_ctx| {})
    }
}

/// A test the suite can set up and report on
pub trait TestCase {
    /// Test identity
    fn info(&self) -> &TestInfo;

    /// Register every event the test needs
    fn setup(&mut self, scheduler: &mut dyn EventScheduler) -> HarnessResult<()>;

    /// Snapshots captured so far, for reports and artifacts
    fn snapshots(&self) -> Vec<Snapshot> {
        Vec::new()
    }

    /// Plant values the test wants sampled at every event time
    ///
    /// The suite records the union over all tests it runs, so a test's
    /// tear-down checks can also read columns another test asked for.
    fn log_variables(&self) -> Vec<LoggedVariable> {
        Vec::new()
    }
}
