// File: testing-framework/src/orchestrator/mod.rs
//
// Orchestrator Module - simulated time and event dispatch
//
// Everything that decides *when* a callback runs lives here: the simulation
// clock, the named event queue, the executive loop that drains it, and the
// seeded RNG that keeps scripted plant noise replayable.

/// Simulation clock
pub mod clock;
/// Event loop driving the plant and the queue
pub mod executive;
/// Deterministic random number generation for reproducible runs
pub mod rng;
/// Named events and the registration capability
pub mod scheduler;

// Re-export key types for convenience
pub use clock::{Clock, SimClock};
pub use executive::{Executive, RunSummary};
pub use rng::TestRng;
pub use scheduler::{EventAction, EventContext, EventQueue, EventScheduler, ScheduledEvent};
