// File: testing-framework/src/utilities/mod.rs
//
// Testing Utilities
//
// Failure artifacts for failed conservation tests and the tools to replay them.

/// Failure artifact collection for test debugging and reproduction
pub mod artifacts;

/// Artifact replay utilities for reproducing test failures
pub mod replay;

pub use artifacts::{ArtifactCollector, LogEntry, TestArtifact, TestMetadata};
pub use replay::{get_replay_command, load_artifact, print_artifact_summary, validate_artifact};
