// File: testing-framework/src/orchestrator/clock.rs
//
// Simulated-time clock
//
// The harness only ever sees simulated seconds. Time moves when the event
// queue advances to the next scheduled event, never on its own.

use crate::error::{HarnessError, HarnessResult};
use std::cell::Cell;

/// Read-only access to simulated time
///
/// Anything that stamps or compares times (reports, artifacts) depends on
/// this trait rather than on the executive that owns the clock.
pub trait Clock {
    /// Current simulated time in seconds
    fn now(&self) -> f64;
}

/// Manually advanced, monotonic simulation clock
///
/// # Examples
///
/// ```rust
/// use fluid_testing_framework::orchestrator::clock::{Clock, SimClock};
///
/// let clock = SimClock::new();
/// clock.advance_to(2.5).unwrap();
/// assert_eq!(clock.now(), 2.5);
/// assert!(clock.advance_to(1.0).is_err());
/// ```
#[derive(Debug, Default)]
pub struct SimClock {
    now: Cell<f64>,
}

impl SimClock {
    /// Clock at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to absolute time `time`; moving backwards is an error
    pub fn advance_to(&self, time: f64) -> HarnessResult<()> {
        let now = self.now.get();
        if time < now {
            return Err(HarnessError::TimeWentBackwards {
                now,
                requested: time,
            });
        }
        self.now.set(time);
        Ok(())
    }
}

impl Clock for SimClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
