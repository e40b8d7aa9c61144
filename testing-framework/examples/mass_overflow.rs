// Example: Mass Overflow Conservation Demo
//
// Runs a scenario file against its own in-memory plant, prints the suite
// report and writes artifacts for any failing test.
//
// Usage: cargo run --example mass_overflow [scenario.yaml]
// Set RUST_LOG=debug to see every snapshot.

use anyhow::Result;
use fluid_testing_framework::scenarios::{parse_suite_file, ScenarioExecutor};
use fluid_testing_framework::utilities::{load_artifact, print_artifact_summary};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scenarios/mass_overflow.yaml".to_string());

    println!("1. Parsing scenario {}...", path);
    let scenario = parse_suite_file(&path)?;
    println!("   {} test(s) in suite '{}'", scenario.tests.len(), scenario.name);

    println!("2. Running suite...");
    let report = ScenarioExecutor::new().execute(&scenario)?;
    report.print();

    if report.passed() {
        println!("3. All conservation checks passed.");
        return Ok(());
    }

    println!("3. Saving failure artifacts...");
    let paths = report.save_artifacts("./artifacts").await?;
    for path in &paths {
        let artifact = load_artifact(path).await?;
        print_artifact_summary(&artifact);
    }

    let failed = report.verdicts.iter().filter(|v| !v.passed).count();
    anyhow::bail!("{} test(s) failed", failed)
}
