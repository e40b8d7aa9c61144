//! Sampled-variable data log
//!
//! Tests can ask for plant values to be recorded over the whole run, not only
//! at their two checkpoints. The executive samples every requested
//! [`LoggedVariable`] once per distinct event time, after the plant has been
//! advanced and before any callback at that time fires. Tear-down checks then
//! look values up by column and time with [`LogCheck`].
//!
//! ```rust
//! use fluid_testing_framework::datalog::DataLog;
//!
//! let mut log = DataLog::new(vec!["fluid1.node[0].mass".to_string()]);
//! log.push(0.0, vec![1.0]).unwrap();
//! log.push(2.5, vec![0.75]).unwrap();
//!
//! // First row at or after the requested time
//! assert_eq!(log.lookup("node[0].mass", 1.0), Some(0.75));
//! assert_eq!(log.lookup("node[0].mass", 3.0), None);
//! ```

pub mod check;
pub mod variable;

pub use check::{LogCheck, LogCondition};
pub use variable::LoggedVariable;

use crate::error::{HarnessError, HarnessResult};
use crate::network::Plant;
use crate::report::nonfinite;
use serde::{Deserialize, Serialize};

/// Values of every column at one simulated time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    /// Simulated time of the sample (seconds)
    #[serde(with = "nonfinite")]
    pub time: f64,
    /// One value per column, NaN where sampling failed
    #[serde(with = "nonfinite::vec")]
    pub values: Vec<f64>,
}

/// Time-ordered table of sampled values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataLog {
    columns: Vec<String>,
    rows: Vec<LogRow>,
}

impl DataLog {
    /// Empty log with these column headers
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column headers in recording order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in time order
    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Time of the latest row
    pub fn last_time(&self) -> Option<f64> {
        self.rows.last().map(|r| r.time)
    }

    /// Append a row; times must not decrease
    pub fn push(&mut self, time: f64, values: Vec<f64>) -> HarnessResult<()> {
        if values.len() != self.columns.len() {
            return Err(HarnessError::LogRowWidth {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        if let Some(last) = self.last_time() {
            if time < last {
                return Err(HarnessError::TimeWentBackwards {
                    now: last,
                    requested: time,
                });
            }
        }
        self.rows.push(LogRow { time, values });
        Ok(())
    }

    /// Index of the column named `name`
    ///
    /// An exact header match wins; otherwise the first header containing
    /// `name` is used.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| self.columns.iter().position(|c| c.contains(name)))
    }

    /// Index of the first row at or after `time`
    pub fn row_at(&self, time: f64) -> Option<usize> {
        if time.is_nan() {
            return None;
        }
        let index = self.rows.partition_point(|r| r.time < time);
        (index < self.rows.len()).then_some(index)
    }

    /// Value in `column` of row `row`
    pub fn value(&self, column: usize, row: usize) -> Option<f64> {
        self.rows.get(row)?.values.get(column).copied()
    }

    /// Value of `name` at the first row at or after `time`
    pub fn lookup(&self, name: &str, time: f64) -> Option<f64> {
        self.value(self.column(name)?, self.row_at(time)?)
    }

    /// Every `(time, value)` pair of one column
    pub fn series(&self, name: &str) -> Option<Vec<(f64, f64)>> {
        let column = self.column(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| (r.time, r.values[column]))
                .collect(),
        )
    }
}

/// Samples a fixed set of variables into a [`DataLog`]
#[derive(Debug, Clone, Default)]
pub struct DataRecorder {
    variables: Vec<LoggedVariable>,
    log: DataLog,
}

impl DataRecorder {
    /// Recorder for `variables`; repeats are logged once
    pub fn new(variables: impl IntoIterator<Item = LoggedVariable>) -> Self {
        let mut unique: Vec<LoggedVariable> = Vec::new();
        for variable in variables {
            if !unique.contains(&variable) {
                unique.push(variable);
            }
        }
        let columns = unique.iter().map(ToString::to_string).collect();
        Self {
            variables: unique,
            log: DataLog::new(columns),
        }
    }

    /// Variables being recorded, in column order
    pub fn variables(&self) -> &[LoggedVariable] {
        &self.variables
    }

    /// True when there is nothing to record
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Record one row at `time` unless a row for `time` already exists
    ///
    /// A variable that cannot be read is logged as NaN with a warning, so one
    /// bad name does not stop the rest of the table.
    pub fn sample(&mut self, plant: &dyn Plant, time: f64) -> HarnessResult<()> {
        if self.variables.is_empty() || self.log.last_time() == Some(time) {
            return Ok(());
        }
        let values = self
            .variables
            .iter()
            .map(|variable| {
                variable.sample(plant).unwrap_or_else(|err| {
                    log::warn!("Cannot sample '{}' at t={}s: {}", variable, time, err);
                    f64::NAN
                })
            })
            .collect();
        self.log.push(time, values)
    }

    /// Everything recorded so far
    pub fn log(&self) -> &DataLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::memory::{Flow, MemoryNetwork, MemoryNode, MemoryPlant};

    fn log() -> DataLog {
        let mut log = DataLog::new(vec![
            "fluid1.node[0].mass".to_string(),
            "fluid1.node[0].temperature".to_string(),
            "fluid1.mass".to_string(),
        ]);
        log.push(0.0, vec![1.0, 300.0, 3.0]).unwrap();
        log.push(1.0, vec![0.5, 301.0, 2.5]).unwrap();
        log.push(4.0, vec![0.25, 302.0, 2.25]).unwrap();
        log
    }

    #[test]
    fn test_row_lookup_takes_first_row_at_or_after_time() {
        let log = log();
        assert_eq!(log.row_at(0.0), Some(0));
        assert_eq!(log.row_at(0.5), Some(1));
        assert_eq!(log.row_at(1.0), Some(1));
        assert_eq!(log.row_at(4.0), Some(2));
        assert_eq!(log.row_at(4.5), None);
        assert_eq!(log.row_at(f64::NAN), None);
    }

    #[test]
    fn test_column_lookup_prefers_exact_match() {
        let log = log();
        assert_eq!(log.column("fluid1.mass"), Some(2));
        // Substring falls back to the first containing header
        assert_eq!(log.column("mass"), Some(0));
        assert_eq!(log.column("temperature"), Some(1));
        assert_eq!(log.column("pressure"), None);

        assert_eq!(log.lookup("fluid1.mass", 2.0), Some(2.25));
        assert_eq!(log.lookup("pressure", 0.0), None);
    }

    #[test]
    fn test_series_returns_whole_column() {
        let series = log().series("temperature").unwrap();
        assert_eq!(series, vec![(0.0, 300.0), (1.0, 301.0), (4.0, 302.0)]);
    }

    #[test]
    fn test_push_rejects_bad_rows() {
        let mut log = log();
        assert_eq!(
            log.push(5.0, vec![1.0]),
            Err(HarnessError::LogRowWidth {
                expected: 3,
                actual: 1
            })
        );
        assert!(matches!(
            log.push(2.0, vec![0.0, 0.0, 0.0]),
            Err(HarnessError::TimeWentBackwards { .. })
        ));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_recorder_samples_once_per_time_and_marks_bad_reads() {
        let mut plant = MemoryPlant::new()
            .with_network(MemoryNetwork::new("fluid1").with_node(MemoryNode::new(1.0, 0.0, 300.0)))
            .with_flow(Flow::Leak {
                network: "fluid1".to_string(),
                node: 0,
                rate: 0.25,
            });
        let mass = LoggedVariable::NodeMass {
            network: "fluid1".to_string(),
            node: 0,
        };
        let missing = LoggedVariable::NodeMass {
            network: "fluid1".to_string(),
            node: 3,
        };
        let mut recorder = DataRecorder::new([mass.clone(), missing, mass]);
        assert_eq!(recorder.variables().len(), 2);

        recorder.sample(&plant, 0.0).unwrap();
        recorder.sample(&plant, 0.0).unwrap();
        plant.advance_to(2.0).unwrap();
        recorder.sample(&plant, 2.0).unwrap();

        let log = recorder.log();
        assert_eq!(log.len(), 2);
        assert_eq!(log.lookup("fluid1.node[0].mass", 1.0), Some(0.5));
        assert!(log.lookup("fluid1.node[3].mass", 0.0).unwrap().is_nan());
    }

    #[test]
    fn test_empty_recorder_records_nothing() {
        let mut recorder = DataRecorder::default();
        recorder.sample(&MemoryPlant::new(), 1.0).unwrap();
        assert!(recorder.is_empty());
        assert!(recorder.log().is_empty());
    }

    #[test]
    fn test_log_with_nan_survives_json() {
        let mut log = DataLog::new(vec!["a".to_string()]);
        log.push(0.0, vec![f64::NAN]).unwrap();
        let json = serde_json::to_string(&log).unwrap();
        let back: DataLog = serde_json::from_str(&json).unwrap();
        assert!(back.lookup("a", 0.0).unwrap().is_nan());
    }
}
