// File: testing-framework/src/utilities/artifacts.rs
//
// Conservation failure artifacts
//
// A failing conservation test leaves behind a JSON file with both snapshots,
// every outcome it recorded and the log lines around it, so the drift can be
// inspected without re-running the simulation.

use crate::conservation::Snapshot;
use crate::datalog::DataLog;
use crate::report::{nonfinite, CheckOutcome};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

// Collisions past this many suffixes are reported instead of retried
const MAX_NAME_SUFFIX: u32 = 1000;

/// Everything saved for one failing test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestArtifact {
    /// Identification and replay data
    pub metadata: TestMetadata,
    /// Snapshots in capture order
    pub snapshots: Vec<Snapshot>,
    /// Every outcome the test recorded
    pub outcomes: Vec<CheckOutcome>,
    /// Captured log lines
    pub logs: Vec<LogEntry>,
    /// Variables sampled during the run
    #[serde(default)]
    pub data_log: DataLog,
}

impl TestArtifact {
    /// Outcomes that failed
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

/// Identification and replay data of an artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMetadata {
    /// Test name
    pub test_name: String,
    /// Seed of the plant noise RNG, when noise was on
    pub rng_seed: Option<u64>,
    /// RFC 3339 wall-clock time the collector was created
    pub timestamp: String,
    /// Simulated time the run stopped at (seconds)
    #[serde(with = "nonfinite")]
    pub sim_time: f64,
    /// Wall-clock time between collector creation and save
    pub duration_ms: u64,
    /// Joined descriptions of the failed outcomes
    pub failure_reason: Option<String>,
}

/// One captured log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// `INFO`, `WARN`, ...
    pub level: String,
    /// Log message
    pub message: String,
    /// RFC 3339 capture time
    pub timestamp: String,
}

/// Accumulates an artifact and writes it out
///
/// # Examples
///
/// ```rust,ignore
/// use fluid_testing_framework::utilities::artifacts::ArtifactCollector;
///
/// let mut collector = ArtifactCollector::new("Mass Overflow Test 35");
/// collector.set_rng_seed(plant_seed);
/// collector.add_snapshot(initial);
/// collector.add_snapshot(last);
/// collector.set_failure_reason("fluid35 H2O mass out of bound".to_string());
/// let path = collector.save("./artifacts/").await?;
/// ```
pub struct ArtifactCollector {
    artifact: TestArtifact,
    started: Instant,
}

impl ArtifactCollector {
    /// Empty artifact for `test_name`
    ///
    /// ```rust
    /// use fluid_testing_framework::utilities::artifacts::ArtifactCollector;
    ///
    /// let collector = ArtifactCollector::new("Mass Overflow Test 1");
    /// ```
    pub fn new(test_name: impl Into<String>) -> Self {
        let metadata = TestMetadata {
            test_name: test_name.into(),
            rng_seed: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            sim_time: 0.0,
            duration_ms: 0,
            failure_reason: None,
        };
        Self {
            artifact: TestArtifact {
                metadata,
                snapshots: Vec::new(),
                outcomes: Vec::new(),
                logs: Vec::new(),
                data_log: DataLog::default(),
            },
            started: Instant::now(),
        }
    }

    /// Metadata collected so far
    pub fn metadata(&self) -> &TestMetadata {
        &self.artifact.metadata
    }

    /// Record the plant noise seed
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.artifact.metadata.rng_seed = Some(seed);
    }

    /// Record why the test failed
    pub fn set_failure_reason(&mut self, reason: String) {
        self.artifact.metadata.failure_reason = Some(reason);
    }

    /// Record the simulated time the run stopped at
    pub fn set_sim_time(&mut self, sim_time: f64) {
        self.artifact.metadata.sim_time = sim_time;
    }

    /// Attach the run's sampled-variable log
    pub fn set_data_log(&mut self, data_log: DataLog) {
        self.artifact.data_log = data_log;
    }

    /// Append a checkpoint snapshot
    pub fn add_snapshot(&mut self, snapshot: Snapshot) {
        self.artifact.snapshots.push(snapshot);
    }

    /// Append a recorded outcome
    pub fn add_outcome(&mut self, outcome: CheckOutcome) {
        self.artifact.outcomes.push(outcome);
    }

    /// Append a log line stamped with the current time
    ///
    /// ```rust
    /// use fluid_testing_framework::utilities::artifacts::ArtifactCollector;
    ///
    /// let mut collector = ArtifactCollector::new("test_name");
    /// collector.capture_log("WARN", "fluid1 total mass out of bound");
    /// ```
    pub fn capture_log(&mut self, level: impl Into<String>, message: impl Into<String>) {
        self.artifact.logs.push(LogEntry {
            level: level.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    /// Write `{test}_{YYYYmmdd_HHMMSS_micros}.json` into `output_dir`
    ///
    /// The directory is created if needed. An existing file is never
    /// replaced: test names that map to the same stem get a numeric suffix.
    /// Returns the file path.
    pub async fn save(&mut self, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.artifact.metadata.duration_ms = self.started.elapsed().as_millis() as u64;

        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir).await.with_context(|| {
            format!("Failed to create artifact directory {}", output_dir.display())
        })?;

        let json = serde_json::to_string_pretty(&self.artifact)
            .context("Failed to serialize artifact")?;

        let stem = format!(
            "{}_{}",
            file_stem(&self.artifact.metadata.test_name),
            chrono::Utc::now().format("%Y%m%d_%H%M%S_%6f")
        );
        let mut suffix = 0u32;
        let (filepath, mut file) = loop {
            let candidate = if suffix == 0 {
                output_dir.join(format!("{}.json", stem))
            } else {
                output_dir.join(format!("{}_{}.json", stem, suffix))
            };
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(file) => break (candidate, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && suffix < MAX_NAME_SUFFIX => {
                    suffix += 1;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to create artifact file {}", candidate.display())
                    })
                }
            }
        };

        file.write_all(json.as_bytes())
            .await
            .with_context(|| format!("Failed to write artifact file {}", filepath.display()))?;
        file.flush()
            .await
            .with_context(|| format!("Failed to flush artifact file {}", filepath.display()))?;

        log::info!("Saved failure artifact to {}", filepath.display());
        Ok(filepath)
    }

    /// Read an artifact written by [`ArtifactCollector::save`]
    pub async fn load(filepath: impl AsRef<Path>) -> Result<TestArtifact> {
        let filepath = filepath.as_ref();
        let content = fs::read_to_string(filepath)
            .await
            .with_context(|| format!("Failed to read artifact file {}", filepath.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact JSON {}", filepath.display()))
    }
}

// Test names carry spaces; keep file names shell friendly
fn file_stem(test_name: &str) -> String {
    test_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conservation::{Bound, SpeciesMass};
    use crate::report::Comparison;
    use crate::species::Species;

    fn snapshot(sim_time: f64, mass: f64) -> Snapshot {
        Snapshot {
            sim_time,
            node_count: 2,
            total_mass: mass,
            species: vec![SpeciesMass {
                species: Species::H2o,
                mass: mass / 10.0,
            }],
            energy: None,
        }
    }

    fn failed_outcome() -> CheckOutcome {
        CheckOutcome {
            test_name: "Mass Overflow Test 35".to_string(),
            label: "fluid35 total mass".to_string(),
            passed: false,
            comparison: Comparison::Drift {
                initial: 3.0,
                final_value: 2.99,
                delta: -0.01,
                bound: Bound::Below { upper: 1e-15 },
            },
        }
    }

    #[test]
    fn test_file_stem_replaces_spaces() {
        assert_eq!(file_stem("Mass Overflow Test 35"), "Mass_Overflow_Test_35");
        assert_eq!(file_stem("a/b"), "a_b");
    }

    #[test]
    fn test_collector_creation() {
        let collector = ArtifactCollector::new("test_example");
        assert_eq!(collector.metadata().test_name, "test_example");
        assert!(collector.metadata().rng_seed.is_none());
        assert!(collector.metadata().failure_reason.is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_artifact() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut collector = ArtifactCollector::new("Mass Overflow Test 35");
        collector.set_rng_seed(0xdeadbeef);
        collector.set_sim_time(10.5);
        collector.set_failure_reason("fluid35 total mass out of bound".to_string());
        collector.add_snapshot(snapshot(0.0, 3.0));
        collector.add_snapshot(snapshot(10.0, 2.5));
        collector.add_outcome(failed_outcome());
        collector.capture_log("WARN", "fluid35 total mass out of bound");

        let filepath = collector.save(temp_dir.path()).await?;
        assert!(filepath.exists());
        let file_name = filepath
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        assert!(file_name.starts_with("Mass_Overflow_Test_35_"));

        let loaded = ArtifactCollector::load(&filepath).await?;
        assert_eq!(loaded.metadata.test_name, "Mass Overflow Test 35");
        assert_eq!(loaded.metadata.rng_seed, Some(0xdeadbeef));
        assert_eq!(loaded.metadata.sim_time, 10.5);
        assert_eq!(loaded.snapshots.len(), 2);
        assert_eq!(loaded.snapshots[1].total_mass, 2.5);
        assert_eq!(loaded.failed_outcomes().count(), 1);
        assert_eq!(loaded.logs.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_names_sharing_a_stem_get_separate_files() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;

        let mut first = ArtifactCollector::new("Test 1");
        let mut second = ArtifactCollector::new("Test_1");
        let mut again = ArtifactCollector::new("Test 1");
        let paths = vec![
            first.save(temp_dir.path()).await?,
            second.save(temp_dir.path()).await?,
            again.save(temp_dir.path()).await?,
        ];

        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[0], paths[2]);
        assert_ne!(paths[1], paths[2]);
        assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 3);

        assert_eq!(ArtifactCollector::load(&paths[0]).await?.metadata.test_name, "Test 1");
        assert_eq!(ArtifactCollector::load(&paths[1]).await?.metadata.test_name, "Test_1");
        assert_eq!(ArtifactCollector::load(&paths[2]).await?.metadata.test_name, "Test 1");

        Ok(())
    }

    #[tokio::test]
    async fn test_nan_snapshot_round_trips() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut collector = ArtifactCollector::new("NaN Test");
        collector.add_snapshot(snapshot(0.0, 3.0));
        collector.add_snapshot(snapshot(10.0, f64::NAN));
        collector.add_outcome(CheckOutcome {
            test_name: "NaN Test".to_string(),
            label: "fluid1 total mass".to_string(),
            passed: false,
            comparison: Comparison::Drift {
                initial: 3.0,
                final_value: f64::NAN,
                delta: f64::NAN,
                bound: Bound::Below { upper: 1e-15 },
            },
        });

        let filepath = collector.save(temp_dir.path()).await?;
        let text = std::fs::read_to_string(&filepath)?;
        assert!(text.contains("\"total_mass\": \"NaN\""));

        let loaded = ArtifactCollector::load(&filepath).await?;
        assert!(loaded.snapshots[1].total_mass.is_nan());
        assert!(loaded.snapshots[1].species[0].mass.is_nan());
        match &loaded.outcomes[0].comparison {
            Comparison::Drift { delta, .. } => assert!(delta.is_nan()),
            other => panic!("unexpected comparison {:?}", other),
        }
        crate::utilities::validate_artifact(&loaded)?;

        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_file_has_context() {
        let err = ArtifactCollector::load("/nonexistent/artifact.json")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read artifact file"));
    }
}
