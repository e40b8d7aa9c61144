//! Assertion outcomes and the reporter capability
//!
//! Every comparison a test makes ends up here as a [`CheckOutcome`], passing
//! or not. Nothing in this module aborts a run: a failed outcome is recorded
//! and the caller moves on to its next comparison.

pub mod nonfinite;

use crate::conservation::Bound;
use crate::error::ConservationViolation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What was compared, with the values involved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparison {
    /// Boolean condition (also used for harness errors surfaced as failures)
    Condition {
        /// Extra context for a failed condition
        detail: Option<String>,
    },
    /// `actual < bound`
    Less {
        /// Observed value
        #[serde(with = "nonfinite")]
        actual: f64,
        /// Exclusive upper limit
        #[serde(with = "nonfinite")]
        bound: f64,
    },
    /// `actual > bound`
    Greater {
        /// Observed value
        #[serde(with = "nonfinite")]
        actual: f64,
        /// Exclusive lower limit
        #[serde(with = "nonfinite")]
        bound: f64,
    },
    /// `actual <= bound`
    LessEqual {
        /// Observed value
        #[serde(with = "nonfinite")]
        actual: f64,
        /// Inclusive upper limit
        #[serde(with = "nonfinite")]
        bound: f64,
    },
    /// `actual >= bound`
    GreaterEqual {
        /// Observed value
        #[serde(with = "nonfinite")]
        actual: f64,
        /// Inclusive lower limit
        #[serde(with = "nonfinite")]
        bound: f64,
    },
    /// `actual == expected`
    Equal {
        /// Observed value
        #[serde(with = "nonfinite")]
        actual: f64,
        /// Expected value
        #[serde(with = "nonfinite")]
        expected: f64,
    },
    /// `actual != unexpected`
    NotEqual {
        /// Observed value
        #[serde(with = "nonfinite")]
        actual: f64,
        /// Value `actual` must differ from
        #[serde(with = "nonfinite")]
        unexpected: f64,
    },
    /// `|actual - expected| <= tolerance`
    Near {
        /// Observed value
        #[serde(with = "nonfinite")]
        actual: f64,
        /// Expected value
        #[serde(with = "nonfinite")]
        expected: f64,
        /// Absolute tolerance
        #[serde(with = "nonfinite")]
        tolerance: f64,
    },
    /// Drift of a conserved quantity between two checkpoints
    Drift {
        /// Value at the initial checkpoint
        #[serde(with = "nonfinite")]
        initial: f64,
        /// Value at the final checkpoint
        #[serde(with = "nonfinite")]
        final_value: f64,
        /// `final_value - initial`
        #[serde(with = "nonfinite")]
        delta: f64,
        /// Bound the delta was held to
        bound: Bound,
    },
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Condition { detail: Some(detail) } => write!(f, "{}", detail),
            Comparison::Condition { detail: None } => write!(f, "condition"),
            Comparison::Less { actual, bound } => write!(f, "{:e} < {:e}", actual, bound),
            Comparison::Greater { actual, bound } => write!(f, "{:e} > {:e}", actual, bound),
            Comparison::LessEqual { actual, bound } => write!(f, "{:e} <= {:e}", actual, bound),
            Comparison::GreaterEqual { actual, bound } => write!(f, "{:e} >= {:e}", actual, bound),
            Comparison::Equal { actual, expected } => write!(f, "{:e} == {:e}", actual, expected),
            Comparison::NotEqual { actual, unexpected } => {
                write!(f, "{:e} != {:e}", actual, unexpected)
            }
            Comparison::Near {
                actual,
                expected,
                tolerance,
            } => write!(f, "|{:e} - {:e}| <= {:e}", actual, expected, tolerance),
            Comparison::Drift {
                initial,
                final_value,
                delta,
                bound,
            } => write!(
                f,
                "initial={:e} final={:e} delta={:e} ({})",
                initial, final_value, delta, bound
            ),
        }
    }
}

/// A single recorded assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Owning test
    pub test_name: String,
    /// What was checked
    pub label: String,
    /// Verdict
    pub passed: bool,
    /// Values behind the verdict
    pub comparison: Comparison,
}

impl CheckOutcome {
    /// Failed boolean outcome carrying an explanation
    pub fn failure(test_name: &str, label: &str, detail: impl Into<String>) -> Self {
        Self {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed: false,
            comparison: Comparison::Condition {
                detail: Some(detail.into()),
            },
        }
    }

    /// Failed drift comparisons as violations; `None` for anything else
    pub fn to_violation(&self) -> Option<ConservationViolation> {
        match &self.comparison {
            Comparison::Drift {
                initial,
                final_value,
                delta,
                bound,
            } if !self.passed => Some(ConservationViolation {
                test_name: self.test_name.clone(),
                label: self.label.clone(),
                initial: *initial,
                final_value: *final_value,
                delta: *delta,
                bound: bound.to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed { "PASS" } else { "FAIL" };
        write!(
            f,
            "[{}] {}: {} ({})",
            verdict, self.test_name, self.label, self.comparison
        )
    }
}

/// Sink for assertion outcomes
///
/// Implementors only need [`record`](Reporter::record); the assertion helpers
/// build the outcome, record it and hand back the verdict.
pub trait Reporter {
    /// Store one outcome
    fn record(&mut self, outcome: CheckOutcome);

    /// Record `condition` as-is
    fn assert_true(&mut self, test_name: &str, condition: bool, label: &str) -> bool {
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed: condition,
            comparison: Comparison::Condition { detail: None },
        });
        condition
    }

    /// Pass iff `condition` is false
    fn assert_false(&mut self, test_name: &str, condition: bool, label: &str) -> bool {
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed: !condition,
            comparison: Comparison::Condition {
                detail: condition.then(|| "expected false".to_string()),
            },
        });
        !condition
    }

    /// Pass iff `actual == expected` exactly
    fn assert_equal(&mut self, test_name: &str, actual: f64, expected: f64, label: &str) -> bool {
        let passed = actual == expected;
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed,
            comparison: Comparison::Equal { actual, expected },
        });
        passed
    }

    /// Pass iff `actual != unexpected`
    fn assert_not_equal(
        &mut self,
        test_name: &str,
        actual: f64,
        unexpected: f64,
        label: &str,
    ) -> bool {
        let passed = actual != unexpected;
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed,
            comparison: Comparison::NotEqual { actual, unexpected },
        });
        passed
    }

    /// Pass iff `actual < bound`
    fn assert_less(&mut self, test_name: &str, actual: f64, bound: f64, label: &str) -> bool {
        let passed = actual < bound;
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed,
            comparison: Comparison::Less { actual, bound },
        });
        passed
    }

    /// Pass iff `actual > bound`
    fn assert_greater(&mut self, test_name: &str, actual: f64, bound: f64, label: &str) -> bool {
        let passed = actual > bound;
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed,
            comparison: Comparison::Greater { actual, bound },
        });
        passed
    }

    /// Pass iff `actual <= bound`
    fn assert_less_equal(&mut self, test_name: &str, actual: f64, bound: f64, label: &str) -> bool {
        let passed = actual <= bound;
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed,
            comparison: Comparison::LessEqual { actual, bound },
        });
        passed
    }

    /// Pass iff `actual >= bound`
    fn assert_greater_equal(
        &mut self,
        test_name: &str,
        actual: f64,
        bound: f64,
        label: &str,
    ) -> bool {
        let passed = actual >= bound;
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed,
            comparison: Comparison::GreaterEqual { actual, bound },
        });
        passed
    }

    /// Pass iff `|actual - expected| <= tolerance`
    fn assert_near(
        &mut self,
        test_name: &str,
        actual: f64,
        expected: f64,
        tolerance: f64,
        label: &str,
    ) -> bool {
        let passed = (actual - expected).abs() <= tolerance;
        self.record(CheckOutcome {
            test_name: test_name.to_string(),
            label: label.to_string(),
            passed,
            comparison: Comparison::Near {
                actual,
                expected,
                tolerance,
            },
        });
        passed
    }
}

/// In-memory reporter used by the suite
#[derive(Debug, Default, Clone)]
pub struct TestReporter {
    outcomes: Vec<CheckOutcome>,
}

impl TestReporter {
    /// Empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Every outcome in recording order
    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    /// Outcomes recorded by one test
    pub fn outcomes_for(&self, test_name: &str) -> Vec<CheckOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.test_name == test_name)
            .cloned()
            .collect()
    }

    /// Failed outcomes across all tests
    pub fn failures(&self) -> Vec<&CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }

    /// True when `test_name` recorded no failure
    pub fn passed(&self, test_name: &str) -> bool {
        self.outcomes
            .iter()
            .filter(|o| o.test_name == test_name)
            .all(|o| o.passed)
    }

    /// Drop everything recorded so far
    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}

impl Reporter for TestReporter {
    fn record(&mut self, outcome: CheckOutcome) {
        if outcome.passed {
            log::debug!("{}", outcome);
        } else {
            log::warn!("{}", outcome);
        }
        self.outcomes.push(outcome);
    }
}
