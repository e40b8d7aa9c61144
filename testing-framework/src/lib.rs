//! # Fluid Testing Framework
//!
//! Event-scheduled conservation testing for fluid network simulations.
//!
//! ## Architecture Overview
//!
//! - **Network**: read-only views of the plant (nodes, networks, reservoirs)
//!   plus an in-memory plant for harness tests
//! - **Orchestrator**: event queue, executive loop, simulation clock, seeded RNG
//! - **Case / Suite**: event-scheduled test cases and the suite that runs them
//! - **Conservation**: aggregation snapshots, bounds and the checkpoint checker
//! - **Scenarios**: YAML suites, optionally carrying their own plant
//! - **Utilities**: failure artifacts and replay
//!
//! ## Quick Start
//!
//! ```rust
//! use fluid_testing_framework::prelude::*;
//!
//! let mut plant = MemoryPlant::new().with_network(
//!     MemoryNetwork::new("fluid1")
//!         .with_node(MemoryNode::new(2.0, 1000.0, 300.0).with_fraction(Species::N2, 1.0))
//!         .with_node(MemoryNode::new(1.0, 1000.0, 300.0).with_fraction(Species::N2, 1.0)),
//! );
//!
//! let test = ConservationTest::new(TestInfo::new("Mass Test", "", ""), "fluid1")
//!     .with_checkpoints(0.0, 10.0)
//!     .check(Quantity::TotalMass, Bound::Near { floor: 1e-12, relative: 1e-12 });
//!
//! let mut suite = TestSuite::new(TEAR_DOWN_DELAY);
//! suite.register_test(Box::new(test));
//! let report = suite.run_all(&mut plant)?;
//! assert!(report.passed());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Design Principles
//!
//! 1. **Read-only**: the harness observes the plant and never writes to it
//! 2. **Deterministic**: fixed aggregation order, simulated clock, seeded noise
//! 3. **Exhaustive reporting**: every comparison is recorded, failures never abort the run

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Harness errors
pub mod error;

/// Chemical species
pub mod species;

/// Plant views and the in-memory plant
pub mod network;

/// Core orchestration - event queue, executive, clock, RNG
pub mod orchestrator;

/// Comparison outcomes and the reporter seam
pub mod report;

/// Conservation aggregation and checking
pub mod conservation;

/// Event-scheduled test cases
pub mod case;

/// Sampled-variable data log and tear-down checks on it
pub mod datalog;

/// Test suites
pub mod suite;

// Snapshot invariants (species closure, non-negative mass)
pub mod invariants;

// YAML scenario parser and executor
pub mod scenarios;

/// Failure artifacts and replay
pub mod utilities;

// Convenient re-exports for common usage
pub mod prelude;

pub use case::{EventTest, TestCase, TestInfo, TEAR_DOWN_DELAY};
pub use conservation::{Bound, ConservationChecker, ConservationTest, Quantity, Snapshot};
pub use error::{ConservationViolation, HarnessError, HarnessResult};
pub use orchestrator::{Clock, Executive, SimClock, TestRng};
pub use suite::{SuiteReport, TestSuite};

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
