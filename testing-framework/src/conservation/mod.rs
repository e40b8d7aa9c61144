//! Conservation checking
//!
//! A [`ConservationTest`] schedules two checkpoints. At the first, its
//! [`ConservationChecker`] aggregates mass, per-species mass and optionally
//! enthalpy or temperature across a network plus any external reservoirs. At
//! the second it aggregates again and holds each configured quantity's drift
//! to a [`Bound`]. Every comparison is reported; none aborts the others.

pub mod checker;
pub mod snapshot;
pub mod tolerance;

pub use checker::{CheckerConfig, CheckerState, ConservationChecker, QuantityCheck};
pub use snapshot::{
    aggregate, AggregationSpec, EnergyKind, EnergyTotal, Quantity, Snapshot, SpeciesMass,
};
pub use test::{ConservationTest, CHECKPOINT_EVENT};
pub use tolerance::Bound;
