// File: testing-framework/src/utilities/replay.rs
//
// Artifact Replay Utilities
//
// Loading, summarizing and sanity-checking saved failure artifacts.

use super::artifacts::{ArtifactCollector, TestArtifact};
use crate::orchestrator::rng::SEED_ENV_VAR;
use crate::report::Comparison;
use anyhow::Result;
use std::path::Path;

/// Load artifact from disk
pub async fn load_artifact(filepath: impl AsRef<Path>) -> Result<TestArtifact> {
    ArtifactCollector::load(filepath).await
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print artifact summary to stdout
///
/// # Examples
///
/// ```rust,ignore
/// use fluid_testing_framework::utilities::replay::{load_artifact, print_artifact_summary};
///
/// let artifact = load_artifact("./artifacts/Mass_Overflow_Test_35_20261019_120000.json").await?;
/// print_artifact_summary(&artifact);
/// ```
pub fn print_artifact_summary(artifact: &TestArtifact) {
    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║              CONSERVATION FAILURE ARTIFACT                     ║");
    println!("╠════════════════════════════════════════════════════════════════╣");
    println!("║ Test Name:     {:47} ║", clip(&artifact.metadata.test_name, 47));
    println!("║ Timestamp:     {:47} ║", clip(&artifact.metadata.timestamp, 47));
    println!(
        "║ Sim Time:      {:47} ║",
        format!("{} s", artifact.metadata.sim_time)
    );

    if let Some(seed) = artifact.metadata.rng_seed {
        println!("║ RNG Seed:      {:47} ║", format!("0x{:016x}", seed));
    } else {
        println!("║ RNG Seed:      {:47} ║", "N/A");
    }

    if let Some(ref reason) = artifact.metadata.failure_reason {
        println!("╠════════════════════════════════════════════════════════════════╣");
        println!("║ FAILURE REASON:                                                ║");
        for line in textwrap::wrap(reason, 62) {
            println!("║ {:62} ║", line);
        }
    }

    println!("╠════════════════════════════════════════════════════════════════╣");
    println!("║ SNAPSHOTS:                                                     ║");
    for snap in &artifact.snapshots {
        let line = format!(
            "t={}s nodes={} total={:e} kg",
            snap.sim_time, snap.node_count, snap.total_mass
        );
        println!("║   {:60} ║", clip(&line, 60));
    }

    let failed: Vec<_> = artifact.failed_outcomes().collect();
    println!("╠════════════════════════════════════════════════════════════════╣");
    println!(
        "║ Outcomes:      {:47} ║",
        format!("{} recorded, {} failed", artifact.outcomes.len(), failed.len())
    );
    for outcome in failed {
        println!("║   {:60} ║", clip(&outcome.label, 60));
        for line in textwrap::wrap(&outcome.comparison.to_string(), 58) {
            println!("║     {:58} ║", line);
        }
    }

    if !artifact.data_log.columns().is_empty() {
        println!("╠════════════════════════════════════════════════════════════════╣");
        println!(
            "║ Data Log:      {:47} ║",
            format!(
                "{} column(s), {} row(s)",
                artifact.data_log.columns().len(),
                artifact.data_log.len()
            )
        );
        for column in artifact.data_log.columns() {
            println!("║   {:60} ║", clip(column, 60));
        }
    }

    if !artifact.logs.is_empty() {
        println!("╠════════════════════════════════════════════════════════════════╣");
        println!("║ RECENT LOGS (last 5):                                          ║");
        for log in artifact.logs.iter().rev().take(5).rev() {
            println!("║ [{:5}] {:54} ║", log.level, clip(&log.message, 54));
        }
    }

    println!("╠════════════════════════════════════════════════════════════════╣");
    println!("║ REPLAY COMMAND:                                                ║");
    for line in textwrap::wrap(&get_replay_command(artifact), 62) {
        println!("║ {:62} ║", line);
    }
    println!("╚════════════════════════════════════════════════════════════════╝");
}

/// Shell command that reruns the suite with the same plant noise seed
pub fn get_replay_command(artifact: &TestArtifact) -> String {
    if let Some(seed) = artifact.metadata.rng_seed {
        format!(
            "{}=0x{:016x} cargo test -- \"{}\"",
            SEED_ENV_VAR, seed, artifact.metadata.test_name
        )
    } else {
        format!("cargo test -- \"{}\"", artifact.metadata.test_name)
    }
}

/// Validate artifact integrity
///
/// Snapshots must be in time order and every drift outcome's delta must
/// match its endpoints.
pub fn validate_artifact(artifact: &TestArtifact) -> Result<()> {
    if artifact.metadata.test_name.is_empty() {
        anyhow::bail!("Artifact has empty test name");
    }

    if artifact.metadata.timestamp.is_empty() {
        anyhow::bail!("Artifact has empty timestamp");
    }

    for pair in artifact.snapshots.windows(2) {
        if pair[1].sim_time < pair[0].sim_time {
            anyhow::bail!(
                "Snapshots out of order: t={}s captured after t={}s",
                pair[1].sim_time,
                pair[0].sim_time
            );
        }
    }

    let width = artifact.data_log.columns().len();
    for row in artifact.data_log.rows() {
        if row.values.len() != width {
            anyhow::bail!(
                "Data log row at t={}s has {} value(s) for {} column(s)",
                row.time,
                row.values.len(),
                width
            );
        }
    }
    for pair in artifact.data_log.rows().windows(2) {
        if pair[1].time < pair[0].time {
            anyhow::bail!(
                "Data log rows out of order: t={}s after t={}s",
                pair[1].time,
                pair[0].time
            );
        }
    }

    for outcome in &artifact.outcomes {
        if outcome.test_name != artifact.metadata.test_name {
            anyhow::bail!(
                "Outcome '{}' belongs to test '{}', not '{}'",
                outcome.label,
                outcome.test_name,
                artifact.metadata.test_name
            );
        }

        if let Comparison::Drift {
            initial,
            final_value,
            delta,
            ..
        } = outcome.comparison
        {
            let expected = final_value - initial;
            // Exact comparison unless both sides are NaN
            if expected != delta && !(expected.is_nan() && delta.is_nan()) {
                anyhow::bail!(
                    "Outcome '{}' delta mismatch: recorded {:e}, endpoints give {:e}",
                    outcome.label,
                    delta,
                    expected
                );
            }
        }
    }

    Ok(())
}
