//! In-memory plant used in place of the external simulation
//!
//! State moves only through scripted [`Flow`]s and direct setters. Flows are
//! bookkeeping, not physics: a `Transfer` shifts mass (with its composition
//! and enthalpy) from one node to another, an `Adsorb` shifts one species
//! between a node and a reservoir, and a `Leak` destroys mass so negative
//! tests have something to catch.

use super::{AdsorbedReservoir, FluidNetwork, NodeView, Plant};
use crate::error::{HarnessError, HarnessResult};
use crate::orchestrator::TestRng;
use crate::species::Species;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One control volume
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    mass: f64,
    specific_enthalpy: f64,
    temperature: f64,
    fractions: BTreeMap<Species, f64>,
}

impl MemoryNode {
    /// Node with no species content
    pub fn new(mass: f64, specific_enthalpy: f64, temperature: f64) -> Self {
        Self {
            mass,
            specific_enthalpy,
            temperature,
            fractions: BTreeMap::new(),
        }
    }

    /// Set the mass fraction of `species`
    pub fn with_fraction(mut self, species: Species, fraction: f64) -> Self {
        self.fractions.insert(species, fraction);
        self
    }

    /// Overwrite the node mass, keeping composition
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
    }

    /// Overwrite the specific enthalpy
    pub fn set_specific_enthalpy(&mut self, specific_enthalpy: f64) {
        self.specific_enthalpy = specific_enthalpy;
    }

    /// Overwrite the temperature
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Overwrite one mass fraction
    pub fn set_fraction(&mut self, species: Species, fraction: f64) {
        self.fractions.insert(species, fraction);
    }

    fn species_masses(&self) -> BTreeMap<Species, f64> {
        self.fractions
            .iter()
            .map(|(s, x)| (*s, x * self.mass))
            .collect()
    }

    /// Rebuild fractions for a new total mass from per-species masses
    fn rebalance(&mut self, masses: BTreeMap<Species, f64>, new_mass: f64) {
        self.mass = new_mass;
        self.fractions = masses
            .into_iter()
            .map(|(s, m)| (s, if new_mass > 0.0 { m / new_mass } else { 0.0 }))
            .collect();
    }

    /// Add (or with negative `delta`, remove) mass of a single species
    fn add_species_mass(&mut self, species: Species, delta: f64) {
        let mut masses = self.species_masses();
        *masses.entry(species).or_insert(0.0) += delta;
        let new_mass = self.mass + delta;
        self.rebalance(masses, new_mass);
    }

    /// Remove up to `dm` kg at the node's own composition
    fn remove_mass(&mut self, dm: f64) -> f64 {
        let dm = dm.max(0.0).min(self.mass.max(0.0));
        self.mass -= dm;
        dm
    }

    /// Mix `dm` kg of `source` contents into this node
    fn mix_in(&mut self, source: &MemoryNode, dm: f64) {
        let mut masses = self.species_masses();
        for (species, fraction) in &source.fractions {
            *masses.entry(*species).or_insert(0.0) += fraction * dm;
        }

        let old_mass = self.mass;
        let new_mass = old_mass + dm;
        if new_mass > 0.0 {
            self.specific_enthalpy =
                (old_mass * self.specific_enthalpy + dm * source.specific_enthalpy) / new_mass;
            self.temperature = (old_mass * self.temperature + dm * source.temperature) / new_mass;
        }
        self.rebalance(masses, new_mass);
    }
}

impl NodeView for MemoryNode {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn specific_enthalpy(&self) -> f64 {
        self.specific_enthalpy
    }

    fn temperature(&self) -> f64 {
        self.temperature
    }

    fn mass_fraction(&self, species: Species) -> f64 {
        self.fractions.get(&species).copied().unwrap_or(0.0)
    }
}

/// A named network with a ground node after the live nodes
#[derive(Debug, Clone)]
pub struct MemoryNetwork {
    name: String,
    nodes: Vec<MemoryNode>,
    ground: MemoryNode,
}

impl MemoryNetwork {
    /// Empty network (ground node only)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            ground: MemoryNode::new(0.0, 0.0, 0.0),
        }
    }

    /// Append a live node
    pub fn with_node(mut self, node: MemoryNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Node count including the ground node
    pub fn total_node_count(&self) -> usize {
        self.nodes.len() + 1
    }

    /// The ground/reference node; never part of the live node set
    pub fn ground(&self) -> &MemoryNode {
        &self.ground
    }

    /// Mutable access to a live node
    pub fn node_mut(&mut self, index: usize) -> HarnessResult<&mut MemoryNode> {
        let count = self.nodes.len();
        let name = &self.name;
        self.nodes
            .get_mut(index)
            .ok_or_else(|| HarnessError::NodeOutOfRange {
                network: name.clone(),
                index,
                count,
            })
    }

    fn check_index(&self, index: usize) -> HarnessResult<()> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(HarnessError::NodeOutOfRange {
                network: self.name.clone(),
                index,
                count: self.nodes.len(),
            })
        }
    }

    fn transfer(&mut self, from: usize, to: usize, dm: f64) -> HarnessResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let moved = self.nodes[from].remove_mass(dm);
        let source = self.nodes[from].clone();
        self.nodes[to].mix_in(&source, moved);
        Ok(())
    }
}

impl FluidNetwork for MemoryNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn node_count(&self) -> usize {
        self.total_node_count() - 1
    }

    fn node(&self, index: usize) -> HarnessResult<&dyn NodeView> {
        self.check_index(index)?;
        Ok(&self.nodes[index])
    }
}

/// Per-species inventory outside the node graph
#[derive(Debug, Clone)]
pub struct MemoryReservoir {
    name: String,
    adsorbed: BTreeMap<Species, f64>,
}

impl MemoryReservoir {
    /// Empty reservoir
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            adsorbed: BTreeMap::new(),
        }
    }

    /// Preload adsorbed mass of `species`
    pub fn with_adsorbed(mut self, species: Species, mass: f64) -> Self {
        self.adsorbed.insert(species, mass);
        self
    }

    /// Overwrite adsorbed mass of `species`
    pub fn set_adsorbed(&mut self, species: Species, mass: f64) {
        self.adsorbed.insert(species, mass);
    }
}

impl AdsorbedReservoir for MemoryReservoir {
    fn name(&self) -> &str {
        &self.name
    }

    fn adsorbed_mass(&self, species: Species) -> f64 {
        self.adsorbed.get(&species).copied().unwrap_or(0.0)
    }

    fn total_adsorbed_mass(&self) -> f64 {
        self.adsorbed.values().sum()
    }
}

/// Scripted state change applied while the plant advances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Flow {
    /// Move mass between two nodes at `rate` kg/s, source composition
    Transfer {
        /// Network name
        network: String,
        /// Source node
        from: usize,
        /// Destination node
        to: usize,
        /// kg/s
        rate: f64,
    },
    /// Move one species from a node into a reservoir; negative desorbs
    Adsorb {
        /// Network name
        network: String,
        /// Node the species is taken from
        node: usize,
        /// Reservoir name
        reservoir: String,
        /// Species moved
        species: Species,
        /// kg/s
        rate: f64,
    },
    /// Destroy mass at `rate` kg/s (non-conserving)
    Leak {
        /// Network name
        network: String,
        /// Leaking node
        node: usize,
        /// kg/s
        rate: f64,
    },
}

/// In-memory stand-in for the simulated plant
#[derive(Debug, Default)]
pub struct MemoryPlant {
    networks: BTreeMap<String, MemoryNetwork>,
    reservoirs: BTreeMap<String, MemoryReservoir>,
    flows: Vec<Flow>,
    noise: Option<(TestRng, f64)>,
    time: f64,
}

impl MemoryPlant {
    /// Plant at t = 0 with no networks
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a network under its own name
    pub fn with_network(mut self, network: MemoryNetwork) -> Self {
        self.networks.insert(network.name.clone(), network);
        self
    }

    /// Register a reservoir under its own name
    pub fn with_reservoir(mut self, reservoir: MemoryReservoir) -> Self {
        self.reservoirs.insert(reservoir.name.clone(), reservoir);
        self
    }

    /// Add a scripted flow
    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flows.push(flow);
        self
    }

    /// Perturb every node mass by up to `magnitude` kg per advance
    ///
    /// Models round-off drift of a real solver; draws come from `rng` so a
    /// run can be replayed from its seed. The range `-magnitude..=magnitude`
    /// must be finite, so anything above `f64::MAX / 2` is rejected.
    pub fn with_truncation_noise(mut self, rng: TestRng, magnitude: f64) -> HarnessResult<Self> {
        check_noise_magnitude(magnitude)?;
        self.noise = Some((rng, magnitude.abs()));
        Ok(self)
    }

    /// Current plant time (seconds)
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Noise RNG, if noise is enabled
    pub fn noise_rng(&self) -> Option<&TestRng> {
        self.noise.as_ref().map(|(rng, _)| rng)
    }

    /// Seed of the noise RNG, if noise is enabled
    pub fn noise_seed(&self) -> Option<u64> {
        self.noise_rng().map(TestRng::seed)
    }

    /// Mutable access to a network for scripted edits
    pub fn network_mut(&mut self, name: &str) -> HarnessResult<&mut MemoryNetwork> {
        self.networks
            .get_mut(name)
            .ok_or_else(|| HarnessError::UnknownNetwork(name.to_string()))
    }

    /// Mutable access to a reservoir for scripted edits
    pub fn reservoir_mut(&mut self, name: &str) -> HarnessResult<&mut MemoryReservoir> {
        self.reservoirs
            .get_mut(name)
            .ok_or_else(|| HarnessError::UnknownReservoir(name.to_string()))
    }

    fn apply_flow(&mut self, index: usize, dt: f64) -> HarnessResult<()> {
        match self.flows[index].clone() {
            Flow::Transfer {
                network,
                from,
                to,
                rate,
            } => {
                let net = self.network_mut(&network)?;
                if rate >= 0.0 {
                    net.transfer(from, to, rate * dt)
                } else {
                    net.transfer(to, from, -rate * dt)
                }
            }
            Flow::Adsorb {
                network,
                node,
                reservoir,
                species,
                rate,
            } => {
                let held = self
                    .reservoirs
                    .get(&reservoir)
                    .ok_or_else(|| HarnessError::UnknownReservoir(reservoir.clone()))?
                    .adsorbed_mass(species);
                let net = self
                    .networks
                    .get_mut(&network)
                    .ok_or_else(|| HarnessError::UnknownNetwork(network.clone()))?;
                let target = net.node_mut(node)?;

                let available = target.mass() * target.mass_fraction(species);
                let dm = (rate * dt).max(-held).min(available);
                target.add_species_mass(species, -dm);

                if let Some(res) = self.reservoirs.get_mut(&reservoir) {
                    res.set_adsorbed(species, held + dm);
                }
                Ok(())
            }
            Flow::Leak {
                network,
                node,
                rate,
            } => {
                self.network_mut(&network)?.node_mut(node)?.remove_mass(rate * dt);
                Ok(())
            }
        }
    }

    fn apply_noise(&mut self) {
        let Some((rng, magnitude)) = &self.noise else {
            return;
        };
        if *magnitude == 0.0 {
            return;
        }
        for network in self.networks.values_mut() {
            for node in &mut network.nodes {
                let drift: f64 = rng.gen_range(-*magnitude..=*magnitude);
                node.mass = (node.mass + drift).max(0.0);
            }
        }
    }
}

/// Reject magnitudes `gen_range` cannot sample from
pub fn check_noise_magnitude(magnitude: f64) -> HarnessResult<()> {
    if !(0.0..=f64::MAX / 2.0).contains(&magnitude) {
        return Err(HarnessError::InvalidNoise { magnitude });
    }
    Ok(())
}

impl Plant for MemoryPlant {
    fn network(&self, name: &str) -> HarnessResult<&dyn FluidNetwork> {
        self.networks
            .get(name)
            .map(|n| n as &dyn FluidNetwork)
            .ok_or_else(|| HarnessError::UnknownNetwork(name.to_string()))
    }

    fn reservoir(&self, name: &str) -> HarnessResult<&dyn AdsorbedReservoir> {
        self.reservoirs
            .get(name)
            .map(|r| r as &dyn AdsorbedReservoir)
            .ok_or_else(|| HarnessError::UnknownReservoir(name.to_string()))
    }

    fn advance_to(&mut self, time: f64) -> HarnessResult<()> {
        if time < self.time {
            return Err(HarnessError::TimeWentBackwards {
                now: self.time,
                requested: time,
            });
        }
        let dt = time - self.time;
        if dt > 0.0 {
            for index in 0..self.flows.len() {
                self.apply_flow(index, dt)?;
            }
            self.apply_noise();
        }
        self.time = time;
        Ok(())
    }
}
