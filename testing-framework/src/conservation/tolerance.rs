// File: testing-framework/src/conservation/tolerance.rs
//
// Drift bounds for conserved quantities

use crate::error::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permitted drift of one quantity between two checkpoints
///
/// Bounds apply to `delta = final - initial`. Asymmetric limits are kept as
/// written: a `Below` bound says nothing about how far `delta` may fall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// `delta < upper`
    Below {
        /// Exclusive upper limit
        upper: f64,
    },
    /// `delta > lower`
    Above {
        /// Exclusive lower limit
        lower: f64,
    },
    /// `lower < delta < upper`
    Between {
        /// Exclusive lower limit
        lower: f64,
        /// Exclusive upper limit
        upper: f64,
    },
    /// `|delta| <= floor + relative * |initial|`
    Near {
        /// Absolute allowance
        floor: f64,
        /// Allowance proportional to the initial magnitude
        relative: f64,
    },
}

impl Bound {
    /// Check the bound's own parameters
    pub fn validate(&self, label: &str) -> HarnessResult<()> {
        let invalid = |reason: String| HarnessError::InvalidBound {
            label: label.to_string(),
            reason,
        };

        match *self {
            Bound::Below { upper: value } | Bound::Above { lower: value } => {
                if !value.is_finite() {
                    return Err(invalid(format!("limit {} is not finite", value)));
                }
            }
            Bound::Between { lower, upper } => {
                if !lower.is_finite() || !upper.is_finite() {
                    return Err(invalid(format!(
                        "limits ({}, {}) are not finite",
                        lower, upper
                    )));
                }
                if lower >= upper {
                    return Err(invalid(format!(
                        "lower limit {} is not below upper limit {}",
                        lower, upper
                    )));
                }
            }
            Bound::Near { floor, relative } => {
                if !floor.is_finite() || !relative.is_finite() {
                    return Err(invalid(format!(
                        "floor {} / relative {} are not finite",
                        floor, relative
                    )));
                }
                if floor < 0.0 || relative < 0.0 {
                    return Err(invalid(format!(
                        "floor {} / relative {} must be non-negative",
                        floor, relative
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether the move from `initial` to `final_value` stays in bounds
    ///
    /// A NaN anywhere fails every variant.
    pub fn passes(&self, initial: f64, final_value: f64) -> bool {
        let delta = final_value - initial;
        match *self {
            Bound::Below { upper } => delta < upper,
            Bound::Above { lower } => delta > lower,
            Bound::Between { lower, upper } => delta > lower && delta < upper,
            Bound::Near { floor, relative } => delta.abs() <= floor + relative * initial.abs(),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Below { upper } => write!(f, "delta < {:e}", upper),
            Bound::Above { lower } => write!(f, "delta > {:e}", lower),
            Bound::Between { lower, upper } => write!(f, "{:e} < delta < {:e}", lower, upper),
            Bound::Near { floor, relative } => {
                write!(f, "|delta| <= {:e} + {:e} * |initial|", floor, relative)
            }
        }
    }
}
