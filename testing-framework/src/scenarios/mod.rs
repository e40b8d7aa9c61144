//! YAML scenario parser and executor
//!
//! A scenario file describes a suite of conservation tests:
//! - `compare {lt|gt}` bounds on the delta, one- or two-sided
//! - `within {floor, relative}` bounds scaled by the initial value
//! - an optional `plant:` section with an in-memory plant to run against
//!
//! ## Example Scenario
//!
//! ```yaml
//! name: "SIM_mass_overflow"
//! tear_down_time: 0.1
//! plant:
//!   networks:
//!     - name: "fluid35"
//!       nodes:
//!         - { mass: 1.0, specific_enthalpy: 3.0e5, fractions: { N2: 0.8, O2: 0.2 } }
//!         - { mass: 0.5, specific_enthalpy: 3.0e5, fractions: { N2: 0.8, O2: 0.2 } }
//!   flows:
//!     - { kind: "transfer", network: "fluid35", from: 0, to: 1, rate: 0.01 }
//! tests:
//!   - name: "Mass Overflow Test 35"
//!     network: "fluid35"
//!     species: ["N2", "O2"]
//!     energy: "enthalpy"
//!     initial_time: 0.0
//!     final_time: 10.0
//!     checks:
//!       - quantity: "total_mass"
//!         compare: { lt: 1.0e-12, gt: -1.0e-12 }
//!       - quantity: "all_species"
//!         within: { floor: 1.0e-12, relative: 1.0e-12 }
//!     invariants:
//!       - "non_negative_mass"
//! ```

pub mod executor;
pub mod parser;

pub use executor::ScenarioExecutor;
pub use parser::{parse_suite, parse_suite_file, CheckSpec, PlantSpec, SuiteScenario, TestSpec};
