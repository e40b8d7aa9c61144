//! YAML scenario execution engine
//!
//! Builds the suite a scenario describes and runs it, either against the
//! scenario's own `plant:` section or against a plant supplied by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use fluid_testing_framework::scenarios::{parse_suite, ScenarioExecutor};
//!
//! let scenario = parse_suite(&std::fs::read_to_string("scenarios/mass_overflow.yaml")?)?;
//! let report = ScenarioExecutor::new().execute(&scenario)?;
//!
//! assert!(report.passed());
//! ```

use super::parser::{parse_suite_file, SuiteScenario};
use crate::network::Plant;
use crate::suite::SuiteReport;
use anyhow::{Context, Result};
use std::path::Path;

/// Scenario executor that runs parsed YAML scenarios
#[derive(Debug, Default)]
pub struct ScenarioExecutor {
    only: Option<String>,
}

impl ScenarioExecutor {
    /// Create new executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a single named test instead of the whole suite
    pub fn with_only(mut self, test_name: impl Into<String>) -> Self {
        self.only = Some(test_name.into());
        self
    }

    /// Execute a scenario against its own `plant:` section
    ///
    /// # Errors
    ///
    /// Returns error if the scenario has no plant section, a test cannot be
    /// built, or the event loop fails. Failed comparisons are not errors;
    /// they are reported in the returned [`SuiteReport`].
    pub fn execute(&self, scenario: &SuiteScenario) -> Result<SuiteReport> {
        let plant_spec = scenario.plant.as_ref().with_context(|| {
            format!(
                "Scenario '{}' has no plant section; use execute_with_plant",
                scenario.name
            )
        })?;

        let mut plant = plant_spec.build()?;
        let mut report = self.execute_with_plant(scenario, &mut plant)?;
        if report.rng_seed.is_none() {
            report.rng_seed = plant.noise_seed();
        }
        if !report.passed() {
            if let Some(rng) = plant.noise_rng() {
                rng.on_failure();
            }
        }
        Ok(report)
    }

    /// Execute a scenario against an externally owned plant
    pub fn execute_with_plant(
        &self,
        scenario: &SuiteScenario,
        plant: &mut dyn Plant,
    ) -> Result<SuiteReport> {
        log::info!("Starting scenario: {}", scenario.name);

        let mut suite = scenario
            .to_suite()
            .with_context(|| format!("Failed to build suite for scenario '{}'", scenario.name))?;

        let report = match &self.only {
            Some(name) => suite.run_test(name, plant)?,
            None => suite.run_all(plant)?,
        };

        log::info!(
            "Scenario '{}' {}",
            scenario.name,
            if report.passed() { "passed" } else { "failed" }
        );
        Ok(report)
    }

    /// Parse a scenario file and execute it against its own plant
    pub fn execute_file(&self, path: impl AsRef<Path>) -> Result<SuiteReport> {
        let scenario = parse_suite_file(path)?;
        self.execute(&scenario)
    }
}
