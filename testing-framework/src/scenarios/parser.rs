// File: testing-framework/src/scenarios/parser.rs
//
// YAML scenario format
//
// A scenario describes a suite of conservation tests and, optionally, the
// in-memory plant to run them against. Parsing is a one-time conversion:
// species and quantity names become enums here and nothing downstream sees
// strings again.

use crate::case::TestInfo;
use crate::conservation::{Bound, ConservationTest, EnergyKind, Quantity};
use crate::datalog::{DataLog, LogCheck, LoggedVariable};
use crate::invariants::Invariant;
use crate::error::HarnessError;
use crate::network::memory::{
    check_noise_magnitude, Flow, MemoryNetwork, MemoryNode, MemoryPlant, MemoryReservoir,
};
use crate::orchestrator::TestRng;
use crate::species::Species;
use crate::suite::TestSuite;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;

fn default_tear_down_time() -> f64 {
    crate::case::TEAR_DOWN_DELAY
}

/// A suite of conservation tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteScenario {
    /// Suite name
    pub name: String,
    /// Delay after the last event before the run stops (seconds)
    #[serde(default = "default_tear_down_time")]
    pub tear_down_time: f64,
    /// Fixed stop time, overriding `tear_down_time`
    #[serde(default)]
    pub terminate_time: Option<f64>,
    /// Default completion watchdog for every test
    #[serde(default)]
    pub require_completion: bool,
    /// In-memory plant to run against
    #[serde(default)]
    pub plant: Option<PlantSpec>,
    /// Tests in run order
    pub tests: Vec<TestSpec>,
}

/// One conservation test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSpec {
    /// Test name, unique within the suite
    pub name: String,
    /// Logged at setup
    #[serde(default)]
    pub start_message: String,
    /// Logged at tear-down
    #[serde(default)]
    pub finish_message: String,
    /// Network whose nodes are aggregated
    pub network: String,
    /// External reservoirs counted as conserved mass
    #[serde(default)]
    pub reservoirs: Vec<String>,
    /// Species tracked individually
    #[serde(default)]
    pub species: Vec<Species>,
    /// Energy variant
    #[serde(default)]
    pub energy: EnergySetting,
    /// Initial checkpoint time (seconds)
    #[serde(default)]
    pub initial_time: f64,
    /// Final checkpoint time (seconds)
    pub final_time: f64,
    /// Comparisons made at the final checkpoint
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
    /// Invariants checked on both snapshots
    #[serde(default)]
    pub invariants: Vec<Invariant>,
    /// Overrides the suite-level watchdog setting
    #[serde(default)]
    pub require_completion: Option<bool>,
    /// Plant values sampled at every event time
    #[serde(default)]
    pub log_variables: Vec<LoggedVariable>,
    /// Checks on logged values, run at tear-down
    #[serde(default)]
    pub log_checks: Vec<LogCheck>,
}

/// `energy:` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergySetting {
    /// Sum of mass times specific enthalpy
    Enthalpy,
    /// Sum of node temperatures
    Temperature,
    /// Energy not tracked
    #[default]
    None,
}

impl EnergySetting {
    fn kind(self) -> Option<EnergyKind> {
        match self {
            EnergySetting::Enthalpy => Some(EnergyKind::Enthalpy),
            EnergySetting::Temperature => Some(EnergyKind::Temperature),
            EnergySetting::None => None,
        }
    }
}

/// One `checks:` entry; exactly one of `compare` and `within` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    /// `total_mass`, `energy`, `all_species` or a species name
    pub quantity: String,
    /// One- or two-sided limits on the delta
    #[serde(default)]
    pub compare: Option<CompareSpec>,
    /// Symmetric limit scaled by the initial value
    #[serde(default)]
    pub within: Option<WithinSpec>,
}

/// `compare: { lt, gt }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareSpec {
    /// Exclusive upper limit on the delta
    #[serde(default)]
    pub lt: Option<f64>,
    /// Exclusive lower limit on the delta
    #[serde(default)]
    pub gt: Option<f64>,
}

/// `within: { floor, relative }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WithinSpec {
    /// Absolute allowance
    #[serde(default)]
    pub floor: f64,
    /// Allowance per unit of initial magnitude
    #[serde(default)]
    pub relative: f64,
}

/// Which quantity a check targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantitySelector {
    /// One aggregate
    Single(Quantity),
    /// Every tracked species
    AllSpecies,
}

impl FromStr for QuantitySelector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "total_mass" => Ok(QuantitySelector::Single(Quantity::TotalMass)),
            "energy" => Ok(QuantitySelector::Single(Quantity::Energy)),
            "all_species" => Ok(QuantitySelector::AllSpecies),
            other => Species::from_str(other)
                .map(|s| QuantitySelector::Single(Quantity::SpeciesMass(s)))
                .map_err(|_| anyhow::anyhow!("Unknown quantity '{}'", other)),
        }
    }
}

impl CheckSpec {
    /// Resolve the quantity string
    pub fn selector(&self) -> Result<QuantitySelector> {
        self.quantity.parse()
    }

    /// Build the bound this entry describes
    pub fn bound(&self) -> Result<Bound> {
        let bound = match (&self.compare, &self.within) {
            (Some(_), Some(_)) => anyhow::bail!(
                "Check on '{}' has both 'compare' and 'within'",
                self.quantity
            ),
            (None, None) => anyhow::bail!(
                "Check on '{}' needs 'compare' or 'within'",
                self.quantity
            ),
            (Some(compare), None) => match (compare.gt, compare.lt) {
                (Some(lower), Some(upper)) => Bound::Between { lower, upper },
                (None, Some(upper)) => Bound::Below { upper },
                (Some(lower), None) => Bound::Above { lower },
                (None, None) => anyhow::bail!(
                    "Check on '{}' has an empty 'compare'",
                    self.quantity
                ),
            },
            (None, Some(within)) => Bound::Near {
                floor: within.floor,
                relative: within.relative,
            },
        };
        bound.validate(&self.quantity)?;
        Ok(bound)
    }
}

/// In-memory plant description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantSpec {
    /// Networks by name
    #[serde(default)]
    pub networks: Vec<NetworkSpec>,
    /// Reservoirs by name
    #[serde(default)]
    pub reservoirs: Vec<ReservoirSpec>,
    /// Scripted flows
    #[serde(default)]
    pub flows: Vec<Flow>,
    /// Seeded truncation noise
    #[serde(default)]
    pub noise: Option<NoiseSpec>,
}

/// One network and its live nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSpec {
    /// Network name
    pub name: String,
    /// Live nodes; the ground node is implicit
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// Initial state of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    /// kg
    pub mass: f64,
    /// J/kg
    #[serde(default)]
    pub specific_enthalpy: f64,
    /// K
    #[serde(default)]
    pub temperature: f64,
    /// Mass fractions by species
    #[serde(default)]
    pub fractions: BTreeMap<Species, f64>,
}

/// Initial inventory of one reservoir
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservoirSpec {
    /// Reservoir name
    pub name: String,
    /// kg held per species
    #[serde(default)]
    pub adsorbed: BTreeMap<Species, f64>,
}

/// Truncation noise settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseSpec {
    /// Fixed seed; drawn from the environment or at random when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Maximum per-advance mass perturbation (kg)
    pub magnitude: f64,
}

impl PlantSpec {
    /// Build the plant
    pub fn build(&self) -> Result<MemoryPlant> {
        let mut plant = MemoryPlant::new();

        for net in &self.networks {
            let mut network = MemoryNetwork::new(net.name.clone());
            for node in &net.nodes {
                let mut built = MemoryNode::new(node.mass, node.specific_enthalpy, node.temperature);
                for (species, fraction) in &node.fractions {
                    built = built.with_fraction(*species, *fraction);
                }
                network = network.with_node(built);
            }
            plant = plant.with_network(network);
        }

        for res in &self.reservoirs {
            let mut reservoir = MemoryReservoir::new(res.name.clone());
            for (species, mass) in &res.adsorbed {
                reservoir = reservoir.with_adsorbed(*species, *mass);
            }
            plant = plant.with_reservoir(reservoir);
        }

        for flow in &self.flows {
            plant = plant.with_flow(flow.clone());
        }

        if let Some(noise) = &self.noise {
            let rng = match noise.seed {
                Some(seed) => TestRng::with_seed(seed),
                None => TestRng::new_from_env_or_random(),
            };
            plant = plant
                .with_truncation_noise(rng, noise.magnitude)
                .context("Invalid plant noise")?;
        }

        Ok(plant)
    }

    /// Check names, noise and every flow reference
    pub fn validate(&self) -> Result<()> {
        let mut networks = BTreeMap::new();
        for net in &self.networks {
            if networks.insert(net.name.as_str(), net.nodes.len()).is_some() {
                anyhow::bail!("Duplicate network name '{}'", net.name);
            }
        }
        let mut reservoirs = HashSet::new();
        for res in &self.reservoirs {
            if !reservoirs.insert(res.name.as_str()) {
                anyhow::bail!("Duplicate reservoir name '{}'", res.name);
            }
        }

        if let Some(noise) = &self.noise {
            check_noise_magnitude(noise.magnitude).context("Invalid plant noise")?;
        }

        let node_in = |network: &str, node: usize| -> Result<()> {
            let count = networks
                .get(network)
                .copied()
                .ok_or_else(|| HarnessError::UnknownNetwork(network.to_string()))?;
            if node >= count {
                return Err(HarnessError::NodeOutOfRange {
                    network: network.to_string(),
                    index: node,
                    count,
                }
                .into());
            }
            Ok(())
        };

        for (index, flow) in self.flows.iter().enumerate() {
            let checked = match flow {
                Flow::Transfer {
                    network,
                    from,
                    to,
                    rate,
                } => node_in(network, *from)
                    .and_then(|_| node_in(network, *to))
                    .and_then(|_| finite_rate(*rate)),
                Flow::Adsorb {
                    network,
                    node,
                    reservoir,
                    rate,
                    ..
                } => node_in(network, *node)
                    .and_then(|_| {
                        if reservoirs.contains(reservoir.as_str()) {
                            Ok(())
                        } else {
                            Err(HarnessError::UnknownReservoir(reservoir.clone()).into())
                        }
                    })
                    .and_then(|_| finite_rate(*rate)),
                Flow::Leak {
                    network,
                    node,
                    rate,
                } => node_in(network, *node).and_then(|_| finite_rate(*rate)),
            };
            checked.with_context(|| format!("Invalid flow #{} in plant", index))?;
        }

        Ok(())
    }
}

fn finite_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() {
        anyhow::bail!("Flow rate {} is not finite", rate);
    }
    Ok(())
}

impl SuiteScenario {
    /// Check everything that can be checked without a plant
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Scenario name must not be empty");
        }
        if self.tests.is_empty() {
            anyhow::bail!("Scenario '{}' has no tests", self.name);
        }
        if !self.tear_down_time.is_finite() || self.tear_down_time < 0.0 {
            anyhow::bail!("Invalid tear_down_time {}", self.tear_down_time);
        }
        if let Some(time) = self.terminate_time {
            if !time.is_finite() || time < 0.0 {
                anyhow::bail!("Invalid terminate_time {}", time);
            }
        }

        // Every test can read every column the suite logs
        let logged = DataLog::new(
            self.tests
                .iter()
                .flat_map(|t| t.log_variables.iter().map(ToString::to_string))
                .collect(),
        );

        let mut names = HashSet::new();
        for test in &self.tests {
            if !names.insert(test.name.as_str()) {
                anyhow::bail!("Duplicate test name '{}'", test.name);
            }
            for check in &test.checks {
                check
                    .selector()
                    .and_then(|_| check.bound())
                    .with_context(|| format!("Invalid check in test '{}'", test.name))?;
            }
            for check in &test.log_checks {
                check
                    .validate()
                    .with_context(|| format!("Invalid log check in test '{}'", test.name))?;
                if logged.column(&check.variable).is_none() {
                    anyhow::bail!(
                        "Log check in test '{}' reads '{}', which no test logs",
                        test.name,
                        check.variable
                    );
                }
            }
        }

        if let Some(plant) = &self.plant {
            plant.validate()?;
        }

        Ok(())
    }

    /// Build the test suite
    pub fn to_suite(&self) -> Result<TestSuite> {
        let mut suite = TestSuite::new(self.tear_down_time).with_name(self.name.clone());
        if let Some(time) = self.terminate_time {
            suite = suite.with_terminate_time(time);
        }

        for spec in &self.tests {
            let test = self
                .build_test(spec)
                .with_context(|| format!("Failed to build test '{}'", spec.name))?;
            suite.register_test(Box::new(test));
        }
        Ok(suite)
    }

    fn build_test(&self, spec: &TestSpec) -> Result<ConservationTest> {
        let mut test = ConservationTest::new(
            TestInfo::new(
                spec.name.clone(),
                spec.start_message.clone(),
                spec.finish_message.clone(),
            ),
            spec.network.clone(),
        )
        .with_species(spec.species.iter().copied())
        .with_checkpoints(spec.initial_time, spec.final_time)
        .require_completion(spec.require_completion.unwrap_or(self.require_completion));

        if let Some(kind) = spec.energy.kind() {
            test = test.with_energy(kind);
        }
        for reservoir in &spec.reservoirs {
            test = test.with_reservoir(reservoir.clone());
        }
        for invariant in &spec.invariants {
            test = test.with_invariant(*invariant);
        }
        for variable in &spec.log_variables {
            test = test.with_log_variable(variable.clone());
        }
        for check in &spec.log_checks {
            test = test.with_log_check(check.clone());
        }
        for check in &spec.checks {
            let bound = check.bound()?;
            test = match check.selector()? {
                QuantitySelector::Single(quantity) => test.check(quantity, bound),
                QuantitySelector::AllSpecies => test.check_all_species(bound),
            };
        }
        Ok(test)
    }
}

/// Parse and validate a scenario from YAML text
pub fn parse_suite(yaml: &str) -> Result<SuiteScenario> {
    let scenario: SuiteScenario =
        serde_yaml::from_str(yaml).context("Failed to parse scenario YAML")?;
    scenario.validate()?;
    Ok(scenario)
}

/// Read, parse and validate a scenario file
pub fn parse_suite_file(path: impl AsRef<Path>) -> Result<SuiteScenario> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    parse_suite(&yaml).with_context(|| format!("Invalid scenario file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: "SIM_mass_overflow"
tests:
  - name: "Test1"
    network: "fluid1"
    species: ["N2", "O2"]
    energy: "enthalpy"
    final_time: 10.0
    checks:
      - quantity: "total_mass"
        compare: { lt: 1.2e-15, gt: -1.0e-15 }
      - quantity: "all_species"
        within: { floor: 1.0e-16, relative: 1.0e-8 }
"#;

    #[test]
    fn test_parse_minimal_scenario() {
        let scenario = parse_suite(MINIMAL).unwrap();
        assert_eq!(scenario.name, "SIM_mass_overflow");
        assert_eq!(scenario.tear_down_time, 0.1);
        assert!(scenario.plant.is_none());

        let test = &scenario.tests[0];
        assert_eq!(test.species, vec![Species::N2, Species::O2]);
        assert_eq!(test.energy, EnergySetting::Enthalpy);
        assert_eq!(test.initial_time, 0.0);
        assert_eq!(
            test.checks[0].bound().unwrap(),
            Bound::Between {
                lower: -1.0e-15,
                upper: 1.2e-15
            }
        );
        assert_eq!(test.checks[1].selector().unwrap(), QuantitySelector::AllSpecies);
    }

    #[test]
    fn test_quantity_selector() {
        assert_eq!(
            "H2O".parse::<QuantitySelector>().unwrap(),
            QuantitySelector::Single(Quantity::SpeciesMass(Species::H2o))
        );
        assert_eq!(
            "energy".parse::<QuantitySelector>().unwrap(),
            QuantitySelector::Single(Quantity::Energy)
        );
        assert!("pressure".parse::<QuantitySelector>().is_err());
    }

    #[test]
    fn test_check_needs_exactly_one_limit() {
        let both = CheckSpec {
            quantity: "total_mass".to_string(),
            compare: Some(CompareSpec {
                lt: Some(1.0),
                gt: None,
            }),
            within: Some(WithinSpec {
                floor: 1.0,
                relative: 0.0,
            }),
        };
        assert!(both.bound().is_err());

        let neither = CheckSpec {
            compare: None,
            within: None,
            ..both.clone()
        };
        assert!(neither.bound().is_err());

        let empty = CheckSpec {
            compare: Some(CompareSpec { lt: None, gt: None }),
            within: None,
            ..both
        };
        assert!(empty.bound().is_err());
    }

    #[test]
    fn test_validation_errors() {
        let duplicate = r#"
name: "Bad"
tests:
  - { name: "T", network: "n", final_time: 1.0 }
  - { name: "T", network: "n", final_time: 2.0 }
"#;
        assert!(parse_suite(duplicate).is_err());

        let no_tests = "name: \"Bad\"\ntests: []\n";
        assert!(parse_suite(no_tests).is_err());

        let bad_bound = r#"
name: "Bad"
tests:
  - name: "T"
    network: "n"
    final_time: 1.0
    checks:
      - quantity: "total_mass"
        within: { floor: -1.0 }
"#;
        let err = parse_suite(bad_bound).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid check in test 'T'"));

        let unknown_field = r#"
name: "Bad"
tests:
  - { name: "T", network: "n", final_time: 1.0, colour: "red" }
"#;
        assert!(parse_suite(unknown_field).is_err());
    }

    #[test]
    fn test_plant_section_builds_memory_plant() {
        use crate::network::Plant;

        let yaml = r#"
name: "With plant"
plant:
  networks:
    - name: "fluid35"
      nodes:
        - { mass: 1.0, temperature: 295.0, fractions: { N2: 0.9, H2O: 0.1 } }
  reservoirs:
    - { name: "msorb13", adsorbed: { H2O: 0.05 } }
  flows:
    - { kind: "adsorb", network: "fluid35", node: 0, reservoir: "msorb13", species: "H2O", rate: 0.001 }
  noise: { seed: 42, magnitude: 0.0 }
tests:
  - name: "T"
    network: "fluid35"
    reservoirs: ["msorb13"]
    final_time: 1.0
"#;
        let scenario = parse_suite(yaml).unwrap();
        let plant_spec = scenario.plant.clone().unwrap();
        assert_eq!(plant_spec.flows.len(), 1);

        let plant = plant_spec.build().unwrap();
        assert_eq!(plant.noise_seed(), Some(42));
        let node = plant.network("fluid35").unwrap().node(0).unwrap();
        assert_eq!(node.mass_fraction(Species::H2o), 0.1);
        assert_eq!(
            plant.reservoir("msorb13").unwrap().adsorbed_mass(Species::H2o),
            0.05
        );

        let suite = scenario.to_suite().unwrap();
        assert_eq!(suite.test_names(), vec!["T".to_string()]);
    }

    fn plant_scenario(plant: &str) -> String {
        format!(
            "name: \"Plant\"\nplant:\n{}\ntests:\n  - {{ name: \"T\", network: \"fluid1\", final_time: 1.0 }}\n",
            plant
        )
    }

    const TWO_NODES: &str = r#"  networks:
    - name: "fluid1"
      nodes: [{ mass: 1.0 }, { mass: 2.0 }]
  reservoirs:
    - { name: "msorb1" }"#;

    #[test]
    fn test_noise_magnitude_must_be_sampleable() {
        for magnitude in [".nan", ".inf", "-.inf", "1.0e308", "-1.0e-15"] {
            let yaml = plant_scenario(&format!(
                "{}\n  noise: {{ seed: 7, magnitude: {} }}",
                TWO_NODES, magnitude
            ));
            let err = parse_suite(&yaml).unwrap_err();
            assert!(
                format!("{:#}", err).contains("Invalid noise magnitude"),
                "magnitude {} accepted: {:#}",
                magnitude,
                err
            );
        }

        let ok = plant_scenario(&format!("{}\n  noise: {{ seed: 7, magnitude: 1.0e-15 }}", TWO_NODES));
        let scenario = parse_suite(&ok).unwrap();
        assert!(scenario.plant.unwrap().build().is_ok());
    }

    #[test]
    fn test_flow_references_are_checked() {
        let bad_flows = [
            (r#"{ kind: "transfer", network: "fluid2", from: 0, to: 1, rate: 0.1 }"#, "Unknown network 'fluid2'"),
            (r#"{ kind: "transfer", network: "fluid1", from: 0, to: 2, rate: 0.1 }"#, "Node index 2 out of range"),
            (r#"{ kind: "leak", network: "fluid1", node: 5, rate: 0.1 }"#, "Node index 5 out of range"),
            (
                r#"{ kind: "adsorb", network: "fluid1", node: 0, reservoir: "msorb9", species: "H2O", rate: 0.1 }"#,
                "Unknown reservoir 'msorb9'",
            ),
            (r#"{ kind: "leak", network: "fluid1", node: 0, rate: .nan }"#, "not finite"),
        ];

        for (flow, expected) in bad_flows {
            let yaml = plant_scenario(&format!("{}\n  flows:\n    - {}", TWO_NODES, flow));
            let err = parse_suite(&yaml).unwrap_err();
            let msg = format!("{:#}", err);
            assert!(msg.contains("Invalid flow #0"), "{}", msg);
            assert!(msg.contains(expected), "{}", msg);
        }

        let good = plant_scenario(&format!(
            "{}\n  flows:\n    - {{ kind: \"transfer\", network: \"fluid1\", from: 1, to: 0, rate: 0.1 }}",
            TWO_NODES
        ));
        assert!(parse_suite(&good).is_ok());
    }

    #[test]
    fn test_species_names_ignore_case() {
        let yaml = r#"
name: "Case"
tests:
  - name: "T"
    network: "fluid1"
    species: ["h2o", "Co2", "N2"]
    final_time: 1.0
    checks:
      - quantity: "h2o"
        within: { floor: 1.0e-16 }
"#;
        let scenario = parse_suite(yaml).unwrap();
        assert_eq!(
            scenario.tests[0].species,
            vec![Species::H2o, Species::Co2, Species::N2]
        );
        assert_eq!(
            scenario.tests[0].checks[0].selector().unwrap(),
            QuantitySelector::Single(Quantity::SpeciesMass(Species::H2o))
        );
    }

    #[test]
    fn test_log_sections() {
        let yaml = r#"
name: "Logged"
tests:
  - name: "Adsorber"
    network: "fluid13"
    final_time: 10.0
    log_variables:
      - { kind: "adsorbed_mass", reservoir: "msorb13", species: "H2O" }
      - { kind: "node_mass", network: "fluid13", node: 0 }
  - name: "Reader"
    network: "fluid13"
    final_time: 5.0
    log_checks:
      - { variable: "msorb13.H2O", time: 5.0, expect: { kind: "greater", value: 0.0 } }
"#;
        let scenario = parse_suite(yaml).unwrap();
        assert_eq!(scenario.tests[0].log_variables.len(), 2);
        assert_eq!(scenario.tests[1].log_checks[0].time, 5.0);

        let unlogged = yaml.replace("msorb13.H2O\", time", "msorb13.CO2\", time");
        let err = parse_suite(&unlogged).unwrap_err();
        assert!(err.to_string().contains("which no test logs"), "{:#}", err);

        let negative = yaml.replace("time: 5.0, expect", "time: -5.0, expect");
        let err = parse_suite(&negative).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid log check in test 'Reader'"));
    }
}
