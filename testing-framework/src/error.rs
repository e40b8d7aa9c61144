//! Error types for the conservation harness
//!
//! Library code returns [`HarnessError`] for configuration and orchestration
//! problems. Conservation verdicts are not errors in the control-flow sense:
//! a failed comparison is recorded as a [`ConservationViolation`] and the run
//! continues.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typed errors raised by the harness itself (never by a failed comparison)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    /// Two events were registered under the same name
    #[error("Event '{name}' is already scheduled")]
    DuplicateEvent {
        /// Offending event name
        name: String,
    },

    /// Event time is negative, NaN or infinite
    #[error("Event '{name}' has invalid time {time}")]
    InvalidEventTime {
        /// Event name
        name: String,
        /// Requested time (seconds)
        time: f64,
    },

    /// Simulation clock was asked to move backwards
    #[error("Clock cannot move backwards from {now}s to {requested}s")]
    TimeWentBackwards {
        /// Current simulated time
        now: f64,
        /// Requested simulated time
        requested: f64,
    },

    /// A tolerance bound failed validation
    #[error("Invalid bound for '{label}': {reason}")]
    InvalidBound {
        /// Quantity label the bound belongs to
        label: String,
        /// Why the bound was rejected
        reason: String,
    },

    /// Noise magnitude cannot be sampled from
    #[error("Invalid noise magnitude {magnitude}: must be in 0..=f64::MAX / 2")]
    InvalidNoise {
        /// Rejected magnitude (kg)
        magnitude: f64,
    },

    /// Plant has no network with this name
    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),

    /// Plant has no reservoir with this name
    #[error("Unknown reservoir '{0}'")]
    UnknownReservoir(String),

    /// Suite has no test with this name
    #[error("Unknown test '{0}'")]
    UnknownTest(String),

    /// Node index outside `0..node_count`
    #[error("Node index {index} out of range for network '{network}' ({count} nodes)")]
    NodeOutOfRange {
        /// Network name
        network: String,
        /// Requested index
        index: usize,
        /// Number of non-ground nodes
        count: usize,
    },

    /// A data log row does not match the column count
    #[error("Data log row has {actual} value(s) for {expected} column(s)")]
    LogRowWidth {
        /// Number of columns
        expected: usize,
        /// Number of values offered
        actual: usize,
    },

    /// A logged-value check cannot be evaluated as written
    #[error("Invalid log check on '{variable}': {reason}")]
    InvalidLogCheck {
        /// Column name the check looks up
        variable: String,
        /// Why the check was rejected
        reason: String,
    },

    /// A checkpoint callback fired in the wrong checker state
    #[error("Checkpoint '{checkpoint}' fired while checker was {state}")]
    CheckpointOrder {
        /// Which callback fired
        checkpoint: &'static str,
        /// State the checker was in
        state: &'static str,
    },
}

/// Convenience alias for harness results
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// A tracked quantity drifted outside its configured bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error(
    "{test_name}: {label} out of bound (initial={initial:e}, final={final_value:e}, delta={delta:e}, bound: {bound})"
)]
pub struct ConservationViolation {
    /// Test that owns the comparison
    pub test_name: String,
    /// Quantity label, e.g. `fluid35 H2O mass`
    pub label: String,
    /// Value at the initial checkpoint
    #[serde(with = "crate::report::nonfinite")]
    pub initial: f64,
    /// Value at the final checkpoint
    #[serde(with = "crate::report::nonfinite")]
    pub final_value: f64,
    /// `final_value - initial`
    #[serde(with = "crate::report::nonfinite")]
    pub delta: f64,
    /// Human readable bound description
    pub bound: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_message_names_quantity_and_endpoints() {
        let violation = ConservationViolation {
            test_name: "Overflow 35".to_string(),
            label: "fluid35 H2O mass".to_string(),
            initial: 100.0,
            final_value: 100.000002,
            delta: 2.0e-6,
            bound: "|delta| <= 1e-6".to_string(),
        };

        let msg = violation.to_string();
        assert!(msg.contains("fluid35 H2O mass"));
        assert!(msg.contains("initial=1e2"));
        assert!(msg.contains("|delta| <= 1e-6"));
    }

    #[test]
    fn test_duplicate_event_message() {
        let err = HarnessError::DuplicateEvent {
            name: "Test1MassSetup".to_string(),
        };
        assert_eq!(err.to_string(), "Event 'Test1MassSetup' is already scheduled");
    }
}
