// File: testing-framework/src/conservation/checker.rs
//
// Two-checkpoint conservation checker
//
// Armed -> (initial checkpoint) -> Settled -> (final checkpoint) -> Complete.
// The checker never schedules anything; it only reacts to the two calls.

use super::snapshot::{aggregate, AggregationSpec, Quantity, Snapshot};
use super::tolerance::Bound;
use crate::error::{HarnessError, HarnessResult};
use crate::network::Plant;
use crate::report::{CheckOutcome, Comparison, Reporter};
use serde::{Deserialize, Serialize};

/// Lifecycle of a checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckerState {
    /// Waiting for the initial checkpoint
    Armed,
    /// Initial snapshot taken, waiting for the final checkpoint
    Settled,
    /// Comparisons done (terminal)
    Complete,
}

impl CheckerState {
    /// Lowercase name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckerState::Armed => "armed",
            CheckerState::Settled => "settled",
            CheckerState::Complete => "complete",
        }
    }
}

/// One quantity held to one bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantityCheck {
    /// Tracked aggregate
    pub quantity: Quantity,
    /// Allowed drift
    pub bound: Bound,
}

/// Everything a checker needs to know up front
#[derive(Debug, Clone, PartialEq)]
pub struct CheckerConfig {
    /// Test the outcomes are reported under
    pub test_name: String,
    /// What to aggregate
    pub aggregation: AggregationSpec,
    /// Comparisons made at the final checkpoint, in order
    pub checks: Vec<QuantityCheck>,
}

/// Captures an initial snapshot, then compares a final one against it
#[derive(Debug, Clone)]
pub struct ConservationChecker {
    config: CheckerConfig,
    state: CheckerState,
    initial: Option<Snapshot>,
    final_snapshot: Option<Snapshot>,
}

impl ConservationChecker {
    /// Validate `config` and arm a checker
    ///
    /// Every bound must be well formed, every species check must name a
    /// tracked species, and an energy check needs an energy variant.
    pub fn new(config: CheckerConfig) -> HarnessResult<Self> {
        for check in &config.checks {
            let label = label_for(&config.aggregation, check.quantity);
            check.bound.validate(&label)?;

            let captured = match check.quantity {
                Quantity::TotalMass => true,
                Quantity::SpeciesMass(species) => config.aggregation.species.contains(&species),
                Quantity::Energy => config.aggregation.energy.is_some(),
            };
            if !captured {
                return Err(HarnessError::InvalidBound {
                    label,
                    reason: "quantity is not captured by this test".to_string(),
                });
            }
        }

        Ok(Self {
            config,
            state: CheckerState::Armed,
            initial: None,
            final_snapshot: None,
        })
    }

    /// Current state
    pub fn state(&self) -> CheckerState {
        self.state
    }

    /// Configuration the checker was built with
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Snapshot taken at the initial checkpoint
    pub fn initial(&self) -> Option<&Snapshot> {
        self.initial.as_ref()
    }

    /// Snapshot taken at the final checkpoint
    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.final_snapshot.as_ref()
    }

    /// Both snapshots, whichever exist, in capture order
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.initial
            .iter()
            .chain(self.final_snapshot.iter())
            .cloned()
            .collect()
    }

    /// Report label for `quantity`, e.g. `fluid35 H2O mass`
    pub fn label(&self, quantity: Quantity) -> String {
        label_for(&self.config.aggregation, quantity)
    }

    /// Initial checkpoint: record the starting totals
    pub fn capture_initial(&mut self, plant: &dyn Plant, sim_time: f64) -> HarnessResult<()> {
        if self.state != CheckerState::Armed {
            return Err(HarnessError::CheckpointOrder {
                checkpoint: "initial",
                state: self.state.as_str(),
            });
        }

        let snapshot = aggregate(plant, &self.config.aggregation, sim_time)?;
        log::info!(
            "{}: initial snapshot at t={}s, total mass {:e} kg",
            self.config.test_name,
            sim_time,
            snapshot.total_mass
        );
        self.initial = Some(snapshot);
        self.state = CheckerState::Settled;
        Ok(())
    }

    /// Final checkpoint: aggregate again and evaluate every check
    ///
    /// All checks are evaluated even after one fails. Returns the number of
    /// failed checks.
    pub fn evaluate_final(
        &mut self,
        plant: &dyn Plant,
        sim_time: f64,
        reporter: &mut dyn Reporter,
    ) -> HarnessResult<usize> {
        let initial = match (self.state, &self.initial) {
            (CheckerState::Settled, Some(initial)) => initial.clone(),
            _ => {
                return Err(HarnessError::CheckpointOrder {
                    checkpoint: "final",
                    state: self.state.as_str(),
                })
            }
        };

        let final_snapshot = aggregate(plant, &self.config.aggregation, sim_time)?;
        let mut failures = 0;

        for check in &self.config.checks {
            let label = self.label(check.quantity);
            let outcome = match (initial.value(check.quantity), final_snapshot.value(check.quantity)) {
                (Some(start), Some(end)) => CheckOutcome {
                    test_name: self.config.test_name.clone(),
                    label,
                    passed: check.bound.passes(start, end),
                    comparison: Comparison::Drift {
                        initial: start,
                        final_value: end,
                        delta: end - start,
                        bound: check.bound,
                    },
                },
                _ => CheckOutcome::failure(&self.config.test_name, &label, "quantity was not captured"),
            };

            if !outcome.passed {
                failures += 1;
            }
            reporter.record(outcome);
        }

        log::info!(
            "{}: final snapshot at t={}s, {} of {} check(s) failed",
            self.config.test_name,
            sim_time,
            failures,
            self.config.checks.len()
        );
        self.final_snapshot = Some(final_snapshot);
        self.state = CheckerState::Complete;
        Ok(failures)
    }
}

fn label_for(aggregation: &AggregationSpec, quantity: Quantity) -> String {
    format!("{} {}", aggregation.network, quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conservation::EnergyKind;
    use crate::network::memory::{MemoryNetwork, MemoryNode, MemoryPlant};
    use crate::report::TestReporter;
    use crate::species::Species;

    fn config(checks: Vec<QuantityCheck>) -> CheckerConfig {
        CheckerConfig {
            test_name: "Mass Overflow Test 1".to_string(),
            aggregation: AggregationSpec {
                species: vec![Species::N2],
                energy: Some(EnergyKind::Enthalpy),
                ..AggregationSpec::new("fluid1")
            },
            checks,
        }
    }

    fn plant() -> MemoryPlant {
        MemoryPlant::new().with_network(
            MemoryNetwork::new("fluid1")
                .with_node(MemoryNode::new(1.0, 10.0, 300.0).with_fraction(Species::N2, 1.0))
                .with_node(MemoryNode::new(2.0, 10.0, 300.0)),
        )
    }

    #[test]
    fn test_full_cycle_reaches_complete() {
        let checks = vec![
            QuantityCheck {
                quantity: Quantity::TotalMass,
                bound: Bound::Below { upper: 1.2e-15 },
            },
            QuantityCheck {
                quantity: Quantity::SpeciesMass(Species::N2),
                bound: Bound::Below { upper: 1.2e-15 },
            },
        ];
        let mut checker = ConservationChecker::new(config(checks)).unwrap();
        let mut plant = plant();
        let mut reporter = TestReporter::new();

        checker.capture_initial(&plant, 0.0).unwrap();
        assert_eq!(checker.state(), CheckerState::Settled);
        assert_eq!(checker.initial().unwrap().total_mass, 3.0);

        plant.network_mut("fluid1").unwrap().node_mut(1).unwrap().set_mass(2.0 + 1e-18);
        let failures = checker.evaluate_final(&plant, 10.0, &mut reporter).unwrap();

        assert_eq!(failures, 0);
        assert_eq!(checker.state(), CheckerState::Complete);
        assert_eq!(checker.snapshots().len(), 2);
        assert_eq!(reporter.outcomes().len(), 2);
    }

    #[test]
    fn test_every_check_runs_after_a_failure() {
        let checks = vec![
            QuantityCheck {
                quantity: Quantity::TotalMass,
                bound: Bound::Below { upper: 1e-15 },
            },
            QuantityCheck {
                quantity: Quantity::Energy,
                bound: Bound::Below { upper: 1e-15 },
            },
            QuantityCheck {
                quantity: Quantity::SpeciesMass(Species::N2),
                bound: Bound::Below { upper: 1e-15 },
            },
        ];
        let mut checker = ConservationChecker::new(config(checks)).unwrap();
        let mut plant = plant();
        let mut reporter = TestReporter::new();

        checker.capture_initial(&plant, 0.0).unwrap();
        plant.network_mut("fluid1").unwrap().node_mut(1).unwrap().set_mass(2.5);
        let failures = checker.evaluate_final(&plant, 1.0, &mut reporter).unwrap();

        assert_eq!(failures, 2);
        let labels: Vec<_> = reporter.failures().iter().map(|o| o.label.clone()).collect();
        assert_eq!(labels, vec!["fluid1 total mass", "fluid1 energy"]);
        assert!(reporter.outcomes()[2].passed);
    }

    #[test]
    fn test_out_of_order_checkpoints_are_errors() {
        let mut checker = ConservationChecker::new(config(vec![])).unwrap();
        let plant = plant();
        let mut reporter = TestReporter::new();

        assert_eq!(
            checker.evaluate_final(&plant, 1.0, &mut reporter),
            Err(HarnessError::CheckpointOrder {
                checkpoint: "final",
                state: "armed"
            })
        );

        checker.capture_initial(&plant, 0.0).unwrap();
        assert_eq!(
            checker.capture_initial(&plant, 0.5),
            Err(HarnessError::CheckpointOrder {
                checkpoint: "initial",
                state: "settled"
            })
        );

        checker.evaluate_final(&plant, 1.0, &mut reporter).unwrap();
        assert!(checker.evaluate_final(&plant, 2.0, &mut reporter).is_err());
        assert_eq!(checker.state(), CheckerState::Complete);
    }

    #[test]
    fn test_config_rejects_uncaptured_quantities_and_bad_bounds() {
        let untracked = vec![QuantityCheck {
            quantity: Quantity::SpeciesMass(Species::O2),
            bound: Bound::Below { upper: 1.0 },
        }];
        assert!(matches!(
            ConservationChecker::new(config(untracked)),
            Err(HarnessError::InvalidBound { ref label, .. }) if label == "fluid1 O2 mass"
        ));

        let bad = vec![QuantityCheck {
            quantity: Quantity::TotalMass,
            bound: Bound::Between {
                lower: 1.0,
                upper: -1.0,
            },
        }];
        assert!(ConservationChecker::new(config(bad)).is_err());
    }

    #[test]
    fn test_lookup_failure_leaves_checker_armed() {
        let mut cfg = config(vec![]);
        cfg.aggregation.network = "fluid9".to_string();
        let mut checker = ConservationChecker::new(cfg).unwrap();

        assert!(matches!(
            checker.capture_initial(&plant(), 0.0),
            Err(HarnessError::UnknownNetwork(_))
        ));
        assert_eq!(checker.state(), CheckerState::Armed);
        assert!(checker.snapshots().is_empty());
    }
}
