//! Test suite: registers test cases, runs them against a plant and reports
//!
//! ```rust
//! use fluid_testing_framework::case::TestInfo;
//! use fluid_testing_framework::conservation::{Bound, ConservationTest, Quantity};
//! use fluid_testing_framework::network::memory::{MemoryNetwork, MemoryNode, MemoryPlant};
//! use fluid_testing_framework::suite::TestSuite;
//!
//! let mut plant = MemoryPlant::new()
//!     .with_network(MemoryNetwork::new("fluid1").with_node(MemoryNode::new(1.0, 0.0, 300.0)));
//!
//! let mut suite = TestSuite::new(0.1);
//! suite.register_test(Box::new(
//!     ConservationTest::new(TestInfo::new("Test1", "", ""), "fluid1")
//!         .check(Quantity::TotalMass, Bound::Below { upper: 1e-15 }),
//! ));
//!
//! let report = suite.run_all(&mut plant).unwrap();
//! assert!(report.passed());
//! ```

use crate::case::TestCase;
use crate::conservation::Snapshot;
use crate::datalog::{DataLog, DataRecorder};
use crate::error::{ConservationViolation, HarnessError};
use crate::network::Plant;
use crate::orchestrator::rng::SEED_ENV_VAR;
use crate::orchestrator::Executive;
use crate::report::{CheckOutcome, Reporter, TestReporter};
use crate::utilities::artifacts::ArtifactCollector;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Owns registered tests and runs them on a fresh event queue
pub struct TestSuite {
    name: String,
    tear_down_time: f64,
    terminate_time: Option<f64>,
    rng_seed: Option<u64>,
    tests: Vec<Box<dyn TestCase>>,
}

impl TestSuite {
    /// Suite that stops `tear_down_time` seconds after the last scheduled event
    pub fn new(tear_down_time: f64) -> Self {
        Self {
            name: "TestSuite".to_string(),
            tear_down_time,
            terminate_time: None,
            rng_seed: None,
            tests: Vec::new(),
        }
    }

    /// Name shown in the header and report
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fixed terminate time, replacing the tear-down based one
    pub fn with_terminate_time(mut self, time: f64) -> Self {
        self.terminate_time = Some(time);
        self
    }

    /// Seed of the plant's noise RNG, recorded in reports and artifacts
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Add a test; tests run in registration order
    pub fn register_test(&mut self, test: Box<dyn TestCase>) {
        log::debug!("Registered test '{}'", test.info().name);
        self.tests.push(test);
    }

    /// Suite name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of registered tests in order
    pub fn test_names(&self) -> Vec<String> {
        self.tests.iter().map(|t| t.info().name.clone()).collect()
    }

    /// Set up and run every registered test
    pub fn run_all(&mut self, plant: &mut dyn Plant) -> Result<SuiteReport> {
        let indices: Vec<usize> = (0..self.tests.len()).collect();
        self.run_indices(&indices, plant)
    }

    /// Set up and run one registered test
    pub fn run_test(&mut self, name: &str, plant: &mut dyn Plant) -> Result<SuiteReport> {
        let index = self
            .tests
            .iter()
            .position(|t| t.info().name == name)
            .ok_or_else(|| HarnessError::UnknownTest(name.to_string()))?;
        self.run_indices(&[index], plant)
    }

    fn run_indices(&mut self, indices: &[usize], plant: &mut dyn Plant) -> Result<SuiteReport> {
        let mut lines = Vec::new();
        let mut note = |line: String| {
            log::info!("{}", line);
            lines.push(line);
        };

        note("=================================================".to_string());
        note(format!("Test suite '{}': {} test(s)", self.name, indices.len()));
        note("=================================================".to_string());

        let mut exec = Executive::new();
        let mut reporter = TestReporter::new();

        let recorder = DataRecorder::new(
            indices
                .iter()
                .flat_map(|&index| self.tests[index].log_variables()),
        );
        if !recorder.is_empty() {
            note(format!("Logging {} variable(s)", recorder.variables().len()));
        }
        exec.set_recorder(recorder);

        for &index in indices {
            let test = &mut self.tests[index];
            let test_name = test.info().name.clone();
            if let Err(err) = test.setup(&mut exec) {
                note(format!("Setup of '{}' failed: {}", test_name, err));
                reporter.record(CheckOutcome::failure(&test_name, "setup", err.to_string()));
            }
        }

        let terminate_time = self
            .terminate_time
            .unwrap_or_else(|| exec.last_event_time().unwrap_or(0.0) + self.tear_down_time);
        exec.set_terminate_time(terminate_time);
        note(format!("Running until t={}s", terminate_time));

        let summary = exec
            .run(plant, &mut reporter)
            .with_context(|| format!("Event loop of suite '{}' failed", self.name))?;

        note(format!(
            "Fired {} event(s), {} left pending, stopped at t={}s",
            summary.events_fired,
            summary.pending_events.len(),
            summary.final_time
        ));

        let verdicts: Vec<TestVerdict> = indices
            .iter()
            .map(|&index| {
                let test = &self.tests[index];
                let name = test.info().name.clone();
                let outcomes = reporter.outcomes_for(&name);
                TestVerdict {
                    passed: outcomes.iter().all(|o| o.passed),
                    failures: outcomes.iter().filter_map(CheckOutcome::to_violation).collect(),
                    snapshots: test.snapshots(),
                    outcomes,
                    name,
                }
            })
            .collect();

        for verdict in &verdicts {
            note(format!(
                "{} {}",
                verdict.name,
                if verdict.passed { "has passed." } else { "has failed." }
            ));
        }

        Ok(SuiteReport {
            suite_name: self.name.clone(),
            events_fired: summary.events_fired,
            pending_events: summary.pending_events,
            final_time: summary.final_time,
            rng_seed: self.rng_seed,
            verdicts,
            data_log: exec.data_log().clone(),
            log: lines,
        })
    }
}

impl std::fmt::Debug for TestSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSuite")
            .field("name", &self.name)
            .field("tear_down_time", &self.tear_down_time)
            .field("terminate_time", &self.terminate_time)
            .field("tests", &self.test_names())
            .finish()
    }
}

/// Verdict of one test
#[derive(Debug, Clone)]
pub struct TestVerdict {
    /// Test name
    pub name: String,
    /// True when no outcome failed
    pub passed: bool,
    /// Every outcome recorded for the test
    pub outcomes: Vec<CheckOutcome>,
    /// Failed drift comparisons
    pub failures: Vec<ConservationViolation>,
    /// Snapshots the test captured
    pub snapshots: Vec<Snapshot>,
}

/// Result of one suite run
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// Suite name
    pub suite_name: String,
    /// Events whose callbacks ran
    pub events_fired: usize,
    /// Events cut off by the terminate time
    pub pending_events: Vec<String>,
    /// Simulated time the run stopped at
    pub final_time: f64,
    /// Plant noise seed, if known
    pub rng_seed: Option<u64>,
    /// Per-test verdicts in run order
    pub verdicts: Vec<TestVerdict>,
    /// Sampled variables, one row per event time
    pub data_log: DataLog,
    /// Suite log lines
    pub log: Vec<String>,
}

impl SuiteReport {
    /// True when every test passed
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    /// Verdict of `name`
    pub fn verdict(&self, name: &str) -> Option<&TestVerdict> {
        self.verdicts.iter().find(|v| v.name == name)
    }

    /// Every conservation violation across the suite
    pub fn failures(&self) -> Vec<ConservationViolation> {
        self.verdicts
            .iter()
            .flat_map(|v| v.failures.iter().cloned())
            .collect()
    }

    /// Print report to stdout
    pub fn print(&self) {
        let passed = self.verdicts.iter().filter(|v| v.passed).count();
        println!("\n╔════════════════════════════════════════════════════════════╗");
        println!("║  Conservation Suite Report                                 ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║  Name: {:<51} ║", self.suite_name);
        println!(
            "║  Tests: {:<50} ║",
            format!("{} passed / {} run", passed, self.verdicts.len())
        );
        println!(
            "║  Events: {:<49} ║",
            format!(
                "{} fired, {} pending",
                self.events_fired,
                self.pending_events.len()
            )
        );
        println!("║  Final time: {:<45} ║", format!("{} s", self.final_time));
        if !self.data_log.columns().is_empty() {
            println!(
                "║  Data log: {:<47} ║",
                format!(
                    "{} column(s) x {} row(s)",
                    self.data_log.columns().len(),
                    self.data_log.len()
                )
            );
        }
        if let (Some(seed), false) = (self.rng_seed, self.passed()) {
            println!(
                "║  Replay: {:<49} ║",
                format!("{}=0x{:016x}", SEED_ENV_VAR, seed)
            );
        }
        println!(
            "║  Status: {:<49} ║",
            if self.passed() {
                "SUCCESS ✓"
            } else {
                "FAILED ✗"
            }
        );
        println!("╚════════════════════════════════════════════════════════════╝\n");

        for verdict in &self.verdicts {
            println!(
                "{} {}",
                if verdict.passed { "✓" } else { "✗" },
                verdict.name
            );
            for outcome in verdict.outcomes.iter().filter(|o| !o.passed) {
                println!("    {}", outcome);
            }
        }

        println!("\nSuite Log:");
        println!("══════════");
        for entry in &self.log {
            println!("{}", entry);
        }
    }

    /// Write one artifact per failing test into `output_dir`
    pub async fn save_artifacts(&self, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        let mut paths = Vec::new();

        for verdict in self.verdicts.iter().filter(|v| !v.passed) {
            let mut collector = ArtifactCollector::new(verdict.name.clone());
            if let Some(seed) = self.rng_seed {
                collector.set_rng_seed(seed);
            }
            collector.set_sim_time(self.final_time);
            collector.set_data_log(self.data_log.clone());

            let reasons: Vec<String> = verdict
                .outcomes
                .iter()
                .filter(|o| !o.passed)
                .map(|o| format!("{}: {}", o.label, o.comparison))
                .collect();
            collector.set_failure_reason(reasons.join("; "));

            for snapshot in &verdict.snapshots {
                collector.add_snapshot(snapshot.clone());
            }
            for outcome in &verdict.outcomes {
                if !outcome.passed {
                    collector.capture_log("WARN", outcome.to_string());
                }
                collector.add_outcome(outcome.clone());
            }
            for line in &self.log {
                collector.capture_log("INFO", line.clone());
            }

            let path = collector
                .save(output_dir)
                .await
                .with_context(|| format!("Failed to save artifact for '{}'", verdict.name))?;
            paths.push(path);
        }

        Ok(paths)
    }
}
