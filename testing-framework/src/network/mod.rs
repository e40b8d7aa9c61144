//! Read-only views into the simulated fluid plant
//!
//! The harness never owns or mutates plant state. It reads node mass,
//! enthalpy, temperature and composition through these traits at the instant
//! a checkpoint fires, plus the inventory held by subsystems that store mass
//! outside the node graph (adsorbers, scrubbers).
//!
//! The in-memory implementations in [`memory`] stand in for the external
//! simulation in tests and demos.

use crate::error::HarnessResult;
use crate::species::Species;
use strum::IntoEnumIterator;

/// In-memory networks, reservoirs and plant used as test doubles
pub mod memory;

/// State of one control volume at the current simulated instant
pub trait NodeView {
    /// Total fluid mass (kg)
    fn mass(&self) -> f64;

    /// Specific enthalpy of the node contents (J/kg)
    fn specific_enthalpy(&self) -> f64;

    /// Node temperature (K)
    fn temperature(&self) -> f64;

    /// Mass fraction of `species` in the mixture, 0 when absent
    fn mass_fraction(&self, species: Species) -> f64;
}

/// A fluid network: an indexed set of nodes
pub trait FluidNetwork {
    /// Network name as known to the plant
    fn name(&self) -> &str;

    /// Number of live nodes, excluding the ground/reference node
    fn node_count(&self) -> usize;

    /// Node at `index` in `0..node_count()`
    fn node(&self, index: usize) -> HarnessResult<&dyn NodeView>;
}

/// A subsystem holding mass that is not resident in any network node
pub trait AdsorbedReservoir {
    /// Reservoir name as known to the plant
    fn name(&self) -> &str;

    /// Mass of `species` currently held (kg)
    fn adsorbed_mass(&self, species: Species) -> f64;

    /// Mass held across every species (kg)
    fn total_adsorbed_mass(&self) -> f64 {
        Species::iter().map(|s| self.adsorbed_mass(s)).sum()
    }
}

/// The external simulation as seen by the harness
///
/// `advance_to` is how the event queue moves the plant forward between
/// events; the harness itself only ever reads.
pub trait Plant {
    /// Look up a network by name
    fn network(&self, name: &str) -> HarnessResult<&dyn FluidNetwork>;

    /// Look up an external reservoir by name
    fn reservoir(&self, name: &str) -> HarnessResult<&dyn AdsorbedReservoir>;

    /// Bring plant state to simulated time `time` (seconds)
    fn advance_to(&mut self, time: f64) -> HarnessResult<()>;
}
