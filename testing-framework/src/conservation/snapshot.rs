// File: testing-framework/src/conservation/snapshot.rs
//
// Aggregate state captured at one checkpoint

use crate::error::HarnessResult;
use crate::network::Plant;
use crate::report::nonfinite;
use crate::species::Species;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a test tracks energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyKind {
    /// Sum of node mass times specific enthalpy (J)
    Enthalpy,
    /// Sum of node temperatures (K)
    Temperature,
}

/// A single tracked aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Total mass across nodes and reservoirs
    TotalMass,
    /// Mass of one species across nodes and reservoirs
    SpeciesMass(Species),
    /// Enthalpy or temperature total, depending on the test
    Energy,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::TotalMass => write!(f, "total mass"),
            Quantity::SpeciesMass(species) => write!(f, "{} mass", species),
            Quantity::Energy => write!(f, "energy"),
        }
    }
}

/// Mass of one species at a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesMass {
    /// Species
    pub species: Species,
    /// kg
    #[serde(with = "nonfinite")]
    pub mass: f64,
}

/// Energy total at a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyTotal {
    /// What `value` sums
    pub kind: EnergyKind,
    /// J for enthalpy, K for temperature
    #[serde(with = "nonfinite")]
    pub value: f64,
}

/// What to aggregate and from where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Network whose nodes are summed
    pub network: String,
    /// External reservoirs whose inventory is added, in order
    #[serde(default)]
    pub reservoirs: Vec<String>,
    /// Species tracked individually, in order
    #[serde(default)]
    pub species: Vec<Species>,
    /// Energy variant, if any
    #[serde(default)]
    pub energy: Option<EnergyKind>,
}

impl AggregationSpec {
    /// Track `network` with no species, reservoirs or energy
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            reservoirs: Vec::new(),
            species: Vec::new(),
            energy: None,
        }
    }
}

/// Immutable record of aggregate state at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulated time of capture (seconds)
    #[serde(with = "nonfinite")]
    pub sim_time: f64,
    /// Live nodes visited
    pub node_count: usize,
    /// kg, including reservoir inventory
    #[serde(with = "nonfinite")]
    pub total_mass: f64,
    /// Per-species mass in configured order
    pub species: Vec<SpeciesMass>,
    /// Energy total, if tracked
    pub energy: Option<EnergyTotal>,
}

impl Snapshot {
    /// Value of `quantity`, or `None` when it was not captured
    pub fn value(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::TotalMass => Some(self.total_mass),
            Quantity::SpeciesMass(species) => self
                .species
                .iter()
                .find(|s| s.species == species)
                .map(|s| s.mass),
            Quantity::Energy => self.energy.map(|e| e.value),
        }
    }

    /// Sum of the tracked species masses
    pub fn species_sum(&self) -> f64 {
        self.species.iter().map(|s| s.mass).sum()
    }
}

/// Sum plant state as described by `spec`
///
/// Nodes are visited by index, species and reservoirs in configured order,
/// so the same state always yields bit-identical totals.
pub fn aggregate(plant: &dyn Plant, spec: &AggregationSpec, sim_time: f64) -> HarnessResult<Snapshot> {
    let network = plant.network(&spec.network)?;
    let node_count = network.node_count();

    let mut total_mass = 0.0;
    let mut energy = 0.0;
    let mut species_mass = vec![0.0; spec.species.len()];

    for index in 0..node_count {
        let node = network.node(index)?;
        let mass = node.mass();
        total_mass += mass;

        for (sum, species) in species_mass.iter_mut().zip(&spec.species) {
            *sum += mass * node.mass_fraction(*species);
        }

        match spec.energy {
            Some(EnergyKind::Enthalpy) => energy += mass * node.specific_enthalpy(),
            Some(EnergyKind::Temperature) => energy += node.temperature(),
            None => {}
        }
    }

    for name in &spec.reservoirs {
        let reservoir = plant.reservoir(name)?;
        log::trace!("Adding inventory of reservoir '{}'", reservoir.name());
        total_mass += reservoir.total_adsorbed_mass();
        for (sum, species) in species_mass.iter_mut().zip(&spec.species) {
            *sum += reservoir.adsorbed_mass(*species);
        }
    }

    let snapshot = Snapshot {
        sim_time,
        node_count,
        total_mass,
        species: spec
            .species
            .iter()
            .zip(species_mass)
            .map(|(species, mass)| SpeciesMass {
                species: *species,
                mass,
            })
            .collect(),
        energy: spec.energy.map(|kind| EnergyTotal {
            kind,
            value: energy,
        }),
    };

    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "Snapshot of '{}' at t={}s: {} nodes, total mass {:e} kg, species {:?}",
            network.name(),
            sim_time,
            node_count,
            snapshot.total_mass,
            snapshot.species
        );
    }

    Ok(snapshot)
}
