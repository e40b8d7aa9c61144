#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//! Standalone tests for the scenario parser and executor

use fluid_testing_framework::conservation::Bound;
use fluid_testing_framework::invariants::Invariant;
use fluid_testing_framework::scenarios::parser::{EnergySetting, QuantitySelector};
use fluid_testing_framework::scenarios::{parse_suite, ScenarioExecutor};
use fluid_testing_framework::species::Species;

const MASS_OVERFLOW: &str = include_str!("../scenarios/mass_overflow.yaml");
const ADSORBER: &str = include_str!("../scenarios/adsorber.yaml");

#[test]
fn test_parse_mass_overflow_fixture() {
    let scenario = parse_suite(MASS_OVERFLOW).expect("Failed to parse");
    assert_eq!(scenario.name, "SIM_mass_overflow");
    assert!(scenario.require_completion);

    let plant = scenario.plant.as_ref().unwrap();
    assert_eq!(plant.networks[0].nodes.len(), 3);
    assert_eq!(plant.flows.len(), 2);
    assert_eq!(plant.noise.unwrap().seed, Some(3054));

    let test = &scenario.tests[0];
    assert_eq!(test.energy, EnergySetting::Enthalpy);
    assert_eq!(test.species, vec![Species::N2, Species::O2, Species::Co2]);
    assert_eq!(test.invariants, vec![Invariant::NonNegativeMass]);
    assert_eq!(
        test.checks[1].selector().unwrap(),
        QuantitySelector::AllSpecies
    );
}

#[test]
fn test_parse_adsorber_fixture() {
    let scenario = parse_suite(ADSORBER).unwrap();
    assert_eq!(scenario.tests.len(), 2);

    let uptake = &scenario.tests[1];
    assert!(uptake.reservoirs.is_empty());
    assert_eq!(
        uptake.checks[0].bound().unwrap(),
        Bound::Between {
            lower: -0.01,
            upper: 0.0
        }
    );
    assert_eq!(
        uptake.checks[1].bound().unwrap(),
        Bound::Below { upper: 0.0 }
    );
    assert_eq!(uptake.log_variables.len(), 2);
    assert_eq!(uptake.log_checks[0].variable, "msorb13.H2O");
    assert!(scenario.tests[0].log_checks.is_empty());
}

#[test]
fn test_mass_overflow_fixture_passes() {
    let scenario = parse_suite(MASS_OVERFLOW).unwrap();
    let report = ScenarioExecutor::new().execute(&scenario).unwrap();

    assert!(report.passed(), "{:?}", report.failures());
    assert_eq!(report.rng_seed, Some(3054));
    // Five drift checks, the invariant at both checkpoints, the watchdog
    let verdict = report.verdict("Mass Overflow Test 35").unwrap();
    assert_eq!(verdict.outcomes.len(), 5 + 2 + 1);
}

#[test]
fn test_adsorber_fixture_separates_network_and_reservoir() {
    let scenario = parse_suite(ADSORBER).unwrap();
    let report = ScenarioExecutor::new().execute(&scenario).unwrap();

    assert!(report.passed(), "{:?}", report.failures());
    assert!(report.verdict("Adsorber Closed Balance").unwrap().passed);
    assert!(report.verdict("Adsorber Network Uptake").unwrap().passed);
}

#[test]
fn test_adsorber_fixture_logs_uptake_trend() {
    let scenario = parse_suite(ADSORBER).unwrap();
    let report = ScenarioExecutor::new().execute(&scenario).unwrap();

    // Two drift checks plus two tear-down checks on the log
    let uptake = report.verdict("Adsorber Network Uptake").unwrap();
    assert_eq!(uptake.outcomes.len(), 4);
    assert!(uptake.passed, "{:?}", uptake.outcomes);

    let log = &report.data_log;
    assert_eq!(
        log.columns(),
        &["msorb13.H2O".to_string(), "fluid13.node[0].H2O".to_string()]
    );
    let held = log.series("msorb13.H2O").unwrap();
    assert_eq!(held.first().map(|p| p.0), Some(1.0));
    assert!(held.windows(2).all(|w| w[1].1 >= w[0].1));
}

#[test]
fn test_rejects_unknown_species() {
    let yaml = r#"
name: "Bad"
tests:
  - name: "T"
    network: "fluid1"
    species: ["Unobtainium"]
    final_time: 1.0
"#;
    assert!(parse_suite(yaml).is_err());
}

#[test]
fn test_rejects_check_on_unknown_quantity() {
    let yaml = r#"
name: "Bad"
tests:
  - name: "T"
    network: "fluid1"
    final_time: 1.0
    checks:
      - { quantity: "pressure", compare: { lt: 1.0 } }
"#;
    let err = parse_suite(yaml).unwrap_err();
    assert!(format!("{:#}", err).contains("Unknown quantity 'pressure'"));
}

#[test]
fn test_uncaptured_check_fails_setup_not_parse() {
    // H2O is not in the species list; the parser accepts it and the
    // suite reports a failed setup for that test
    let yaml = r#"
name: "Uncaptured"
plant:
  networks:
    - name: "fluid1"
      nodes:
        - { mass: 1.0, fractions: { N2: 1.0 } }
tests:
  - name: "T"
    network: "fluid1"
    species: ["N2"]
    final_time: 1.0
    checks:
      - { quantity: "H2O", within: { floor: 1.0e-12 } }
"#;
    let scenario = parse_suite(yaml).unwrap();
    let report = ScenarioExecutor::new().execute(&scenario).unwrap();
    let verdict = report.verdict("T").unwrap();
    assert!(!verdict.passed);
    assert!(verdict.outcomes.iter().any(|o| o.label == "setup"));
}
