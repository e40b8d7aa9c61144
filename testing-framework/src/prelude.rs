//! Common imports for writing conservation tests

pub use crate::case::{EventTest, TestCase, TestInfo, TEAR_DOWN_DELAY};
pub use crate::conservation::{
    AggregationSpec, Bound, CheckerState, ConservationChecker, ConservationTest, EnergyKind,
    Quantity, Snapshot,
};
pub use crate::datalog::{DataLog, LogCheck, LogCondition, LoggedVariable};
pub use crate::error::{ConservationViolation, HarnessError, HarnessResult};
pub use crate::invariants::Invariant;
pub use crate::network::memory::{Flow, MemoryNetwork, MemoryNode, MemoryPlant, MemoryReservoir};
pub use crate::network::{AdsorbedReservoir, FluidNetwork, NodeView, Plant};
pub use crate::orchestrator::{EventContext, EventScheduler, Executive, TestRng};
pub use crate::report::{CheckOutcome, Reporter, TestReporter};
pub use crate::scenarios::{parse_suite, ScenarioExecutor};
pub use crate::species::Species;
pub use crate::suite::{SuiteReport, TestSuite};
