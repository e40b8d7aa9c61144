// File: testing-framework/src/datalog/variable.rs
//
// Plant values that can be sampled into the data log

use crate::error::HarnessResult;
use crate::network::Plant;
use crate::species::Species;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One plant value recorded at every event time
///
/// The [`Display`](fmt::Display) form is the column name in the
/// [`DataLog`](super::DataLog), e.g. `fluid1.node[0].mass` or `msorb13.H2O`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoggedVariable {
    /// Node mass (kg)
    NodeMass {
        /// Network name
        network: String,
        /// Node index
        node: usize,
    },
    /// Node temperature (K)
    NodeTemperature {
        /// Network name
        network: String,
        /// Node index
        node: usize,
    },
    /// Node specific enthalpy (J/kg)
    NodeSpecificEnthalpy {
        /// Network name
        network: String,
        /// Node index
        node: usize,
    },
    /// Mass fraction of one species in a node
    NodeMassFraction {
        /// Network name
        network: String,
        /// Node index
        node: usize,
        /// Species
        species: Species,
    },
    /// Mass summed over every live node of a network (kg)
    NetworkMass {
        /// Network name
        network: String,
    },
    /// Mass of one species held by a reservoir (kg)
    AdsorbedMass {
        /// Reservoir name
        reservoir: String,
        /// Species
        species: Species,
    },
}

impl LoggedVariable {
    /// Read the current value from `plant`
    pub fn sample(&self, plant: &dyn Plant) -> HarnessResult<f64> {
        match self {
            LoggedVariable::NodeMass { network, node } => {
                Ok(plant.network(network)?.node(*node)?.mass())
            }
            LoggedVariable::NodeTemperature { network, node } => {
                Ok(plant.network(network)?.node(*node)?.temperature())
            }
            LoggedVariable::NodeSpecificEnthalpy { network, node } => {
                Ok(plant.network(network)?.node(*node)?.specific_enthalpy())
            }
            LoggedVariable::NodeMassFraction {
                network,
                node,
                species,
            } => Ok(plant
                .network(network)?
                .node(*node)?
                .mass_fraction(*species)),
            LoggedVariable::NetworkMass { network } => {
                let network = plant.network(network)?;
                let mut total = 0.0;
                for index in 0..network.node_count() {
                    total += network.node(index)?.mass();
                }
                Ok(total)
            }
            LoggedVariable::AdsorbedMass { reservoir, species } => {
                Ok(plant.reservoir(reservoir)?.adsorbed_mass(*species))
            }
        }
    }
}

impl fmt::Display for LoggedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggedVariable::NodeMass { network, node } => write!(f, "{}.node[{}].mass", network, node),
            LoggedVariable::NodeTemperature { network, node } => {
                write!(f, "{}.node[{}].temperature", network, node)
            }
            LoggedVariable::NodeSpecificEnthalpy { network, node } => {
                write!(f, "{}.node[{}].specific_enthalpy", network, node)
            }
            LoggedVariable::NodeMassFraction {
                network,
                node,
                species,
            } => write!(f, "{}.node[{}].{}", network, node, species),
            LoggedVariable::NetworkMass { network } => write!(f, "{}.mass", network),
            LoggedVariable::AdsorbedMass { reservoir, species } => {
                write!(f, "{}.{}", reservoir, species)
            }
        }
    }
}
