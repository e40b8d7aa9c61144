// File: testing-framework/src/datalog/check.rs
//
// Checks on logged values, evaluated at tear-down

use super::DataLog;
use crate::error::{HarnessError, HarnessResult};
use crate::report::{CheckOutcome, Reporter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a logged value must satisfy
///
/// In YAML: `{ kind: "less", value: 2.0 }`, `{ kind: "is_true" }` or
/// `{ kind: "near", expected: 1.0, tolerance: 0.01 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogCondition {
    /// Value is non-zero
    IsTrue,
    /// Value is zero
    IsFalse,
    /// Value equals `value` exactly
    Equal {
        /// Limit
        value: f64,
    },
    /// Value differs from `value`
    NotEqual {
        /// Limit
        value: f64,
    },
    /// Value is below `value`
    Less {
        /// Limit
        value: f64,
    },
    /// Value is at most `value`
    LessEqual {
        /// Limit
        value: f64,
    },
    /// Value is above `value`
    Greater {
        /// Limit
        value: f64,
    },
    /// Value is at least `value`
    GreaterEqual {
        /// Limit
        value: f64,
    },
    /// `|value - expected| <= tolerance`
    Near {
        /// Expected value
        expected: f64,
        /// Absolute tolerance
        tolerance: f64,
    },
}

impl fmt::Display for LogCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogCondition::IsTrue => write!(f, "!= 0"),
            LogCondition::IsFalse => write!(f, "== 0"),
            LogCondition::Equal { value: v } => write!(f, "== {:e}", v),
            LogCondition::NotEqual { value: v } => write!(f, "!= {:e}", v),
            LogCondition::Less { value: v } => write!(f, "< {:e}", v),
            LogCondition::LessEqual { value: v } => write!(f, "<= {:e}", v),
            LogCondition::Greater { value: v } => write!(f, "> {:e}", v),
            LogCondition::GreaterEqual { value: v } => write!(f, ">= {:e}", v),
            LogCondition::Near {
                expected,
                tolerance,
            } => write!(f, "within {:e} of {:e}", tolerance, expected),
        }
    }
}

/// Assertion on the value a column held at a given time
///
/// The value used is the one in the first row at or after `time`. A column
/// or row that cannot be found is recorded as a failure.
///
/// ```rust
/// use fluid_testing_framework::datalog::{DataLog, LogCheck, LogCondition};
/// use fluid_testing_framework::report::{Reporter, TestReporter};
///
/// let mut log = DataLog::new(vec!["msorb13.H2O".to_string()]);
/// log.push(10.0, vec![0.02]).unwrap();
///
/// let check = LogCheck::new("msorb13.H2O", 10.0, LogCondition::Greater { value: 0.0 });
/// let mut reporter = TestReporter::new();
/// assert!(check.evaluate("Adsorber", &log, &mut reporter));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogCheck {
    /// Column name, exact or a unique substring
    pub variable: String,
    /// Simulated time to look up (seconds)
    pub time: f64,
    /// Condition on the value
    pub expect: LogCondition,
    /// Outcome label; derived from the variable and time when absent
    #[serde(default)]
    pub label: Option<String>,
}

impl LogCheck {
    /// Check `variable` at `time` against `expect`
    pub fn new(variable: impl Into<String>, time: f64, expect: LogCondition) -> Self {
        Self {
            variable: variable.into(),
            time,
            expect,
            label: None,
        }
    }

    /// Replace the derived outcome label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label the outcome is recorded under
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{} at t={}s {}", self.variable, self.time, self.expect),
        }
    }

    /// Reject lookups and limits that can never be evaluated
    pub fn validate(&self) -> HarnessResult<()> {
        let invalid = |reason: String| HarnessError::InvalidLogCheck {
            variable: self.variable.clone(),
            reason,
        };
        if self.variable.is_empty() {
            return Err(invalid("variable name is empty".to_string()));
        }
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(invalid(format!("time {} is not a valid simulated time", self.time)));
        }
        let limit = match self.expect {
            LogCondition::IsTrue | LogCondition::IsFalse => None,
            LogCondition::Equal { value: v }
            | LogCondition::NotEqual { value: v }
            | LogCondition::Less { value: v }
            | LogCondition::LessEqual { value: v }
            | LogCondition::Greater { value: v }
            | LogCondition::GreaterEqual { value: v } => Some(v),
            LogCondition::Near {
                expected,
                tolerance,
            } => {
                if !tolerance.is_finite() || tolerance < 0.0 {
                    return Err(invalid(format!(
                        "tolerance {} must be finite and >= 0",
                        tolerance
                    )));
                }
                Some(expected)
            }
        };
        if let Some(limit) = limit {
            if limit.is_nan() {
                return Err(invalid("limit is NaN".to_string()));
            }
        }
        Ok(())
    }

    /// Look the value up in `log` and record the verdict
    pub fn evaluate(&self, test_name: &str, log: &DataLog, reporter: &mut dyn Reporter) -> bool {
        let label = self.label();
        let Some(value) = log.lookup(&self.variable, self.time) else {
            reporter.record(CheckOutcome::failure(
                test_name,
                &label,
                format!(
                    "no logged value of '{}' at or after t={}s",
                    self.variable, self.time
                ),
            ));
            return false;
        };

        match self.expect {
            LogCondition::IsTrue => reporter.assert_true(test_name, value != 0.0, &label),
            LogCondition::IsFalse => reporter.assert_false(test_name, value != 0.0, &label),
            LogCondition::Equal { value: v } => reporter.assert_equal(test_name, value, v, &label),
            LogCondition::NotEqual { value: v } => {
                reporter.assert_not_equal(test_name, value, v, &label)
            }
            LogCondition::Less { value: v } => reporter.assert_less(test_name, value, v, &label),
            LogCondition::LessEqual { value: v } => {
                reporter.assert_less_equal(test_name, value, v, &label)
            }
            LogCondition::Greater { value: v } => {
                reporter.assert_greater(test_name, value, v, &label)
            }
            LogCondition::GreaterEqual { value: v } => {
                reporter.assert_greater_equal(test_name, value, v, &label)
            }
            LogCondition::Near {
                expected,
                tolerance,
            } => reporter.assert_near(test_name, value, expected, tolerance, &label),
        }
    }
}
