//! Snapshot invariants
//!
//! Properties that must hold for any single snapshot, independent of the
//! drift between two checkpoints:
//! - Species closure (tracked species masses add up to the total mass)
//! - Non-negative mass (no aggregate drops below zero)

use crate::conservation::Snapshot;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Relative slack allowed by [`Invariant::SpeciesClosure`]
pub const CLOSURE_RELATIVE_TOLERANCE: f64 = 1.0e-12;

/// Named snapshot invariant, selectable from scenario files
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Invariant {
    /// Tracked species masses sum to the total mass
    ///
    /// Only meaningful when the species list covers the whole mixture,
    /// including whatever the reservoirs hold.
    SpeciesClosure,
    /// Total and per-species masses are non-negative
    NonNegativeMass,
}

impl Invariant {
    /// Check this invariant against `snapshot`
    pub fn check(&self, snapshot: &Snapshot) -> Result<()> {
        match self {
            Invariant::SpeciesClosure => check_species_closure(
                snapshot,
                f64::EPSILON + CLOSURE_RELATIVE_TOLERANCE * snapshot.total_mass.abs(),
            ),
            Invariant::NonNegativeMass => check_non_negative_mass(snapshot),
        }
    }
}

/// Check that the species masses add up to the total mass within `tolerance`
pub fn check_species_closure(snapshot: &Snapshot, tolerance: f64) -> Result<()> {
    let species_sum = snapshot.species_sum();
    let gap = (snapshot.total_mass - species_sum).abs();
    // NaN gap fails as well
    if !(gap <= tolerance) {
        anyhow::bail!(
            "Species closure broken at t={}s: total mass {:e} kg, species sum {:e} kg (gap {:e} > {:e})",
            snapshot.sim_time,
            snapshot.total_mass,
            species_sum,
            gap,
            tolerance
        );
    }
    Ok(())
}

/// Check that no aggregate mass is negative
pub fn check_non_negative_mass(snapshot: &Snapshot) -> Result<()> {
    if !(snapshot.total_mass >= 0.0) {
        anyhow::bail!(
            "Negative total mass {:e} kg at t={}s",
            snapshot.total_mass,
            snapshot.sim_time
        );
    }
    if let Some(s) = snapshot.species.iter().find(|s| !(s.mass >= 0.0)) {
        anyhow::bail!(
            "Negative {} mass {:e} kg at t={}s",
            s.species,
            s.mass,
            snapshot.sim_time
        );
    }
    Ok(())
}
