// File: testing-framework/src/orchestrator/scheduler.rs
//
// Named, time-stamped events
//
// Test cases register callbacks through the EventScheduler capability. The
// EventQueue is the in-process host: it keeps events ordered by time, then by
// registration order, and refuses duplicate names.

use crate::datalog::DataLog;
use crate::error::{HarnessError, HarnessResult};
use crate::network::Plant;
use crate::report::Reporter;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// What a callback sees when its event fires
pub struct EventContext<'a> {
    /// Simulated time of the event (seconds)
    pub sim_time: f64,
    /// Name the event was registered under
    pub event_name: &'a str,
    /// Plant state at `sim_time`
    pub plant: &'a dyn Plant,
    /// Where assertion outcomes go
    pub reporter: &'a mut dyn Reporter,
    /// Values sampled so far, including a row for `sim_time`
    pub data_log: &'a DataLog,
}

/// Callback fired at a scheduled instant
pub type EventAction = Box<dyn FnMut(&mut EventContext<'_>)>;

/// Registration capability offered by the host to test cases
pub trait EventScheduler {
    /// Register `action` to fire at simulated time `time`
    fn schedule(&mut self, name: String, time: f64, action: EventAction) -> HarnessResult<()>;
}

/// An event waiting in the queue
pub struct ScheduledEvent {
    /// Event name
    pub name: String,
    /// Fire time (seconds)
    pub time: f64,
    seq: u64,
    action: EventAction,
}

impl ScheduledEvent {
    /// Run the callback
    pub fn fire(&mut self, ctx: &mut EventContext<'_>) {
        (self.action)(ctx)
    }
}

impl std::fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("name", &self.name)
            .field("time", &self.time)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

// BinaryHeap is a max-heap; order is reversed so the earliest event (then the
// earliest registration) pops first.
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

/// Time-ordered queue of named events
#[derive(Default)]
pub struct EventQueue {
    events: BinaryHeap<ScheduledEvent>,
    names: HashSet<String>,
    next_seq: u64,
}

impl EventQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events not yet fired
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the next event to fire
    pub fn next_time(&self) -> Option<f64> {
        self.events.peek().map(|e| e.time)
    }

    /// Latest scheduled time among waiting events
    pub fn last_time(&self) -> Option<f64> {
        self.events.iter().map(|e| e.time).max_by(|a, b| a.total_cmp(b))
    }

    /// Pop the next event if it is due at or before `limit`
    pub fn pop_due(&mut self, limit: f64) -> Option<ScheduledEvent> {
        if self.next_time()? <= limit {
            self.events.pop()
        } else {
            None
        }
    }

    /// Names of events still waiting, in firing order
    pub fn pending_names(&self) -> Vec<String> {
        let mut pending: Vec<&ScheduledEvent> = self.events.iter().collect();
        pending.sort_by(|a, b| b.cmp(a));
        pending.into_iter().map(|e| e.name.clone()).collect()
    }
}

impl EventScheduler for EventQueue {
    fn schedule(&mut self, name: String, time: f64, action: EventAction) -> HarnessResult<()> {
        if !time.is_finite() || time < 0.0 {
            return Err(HarnessError::InvalidEventTime { name, time });
        }
        if !self.names.insert(name.clone()) {
            return Err(HarnessError::DuplicateEvent { name });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(ScheduledEvent {
            name,
            time,
            seq,
            action,
        });
        Ok(())
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.events.len())
            .field("next_seq", &self.next_seq)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> EventAction {
        Box::new(|_ctx| {})
    }

    #[test]
    fn test_pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule("late".to_string(), 10.0, noop()).unwrap();
        queue.schedule("early".to_string(), 1.0, noop()).unwrap();
        queue.schedule("middle".to_string(), 5.0, noop()).unwrap();

        let order: Vec<String> = std::iter::from_fn(|| queue.pop_due(f64::INFINITY))
            .map(|e| e.name)
            .collect();
        assert_eq!(order, vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_ties_fire_in_registration_order() {
        let mut queue = EventQueue::new();
        for name in ["a", "b", "c"] {
            queue.schedule(name.to_string(), 2.0, noop()).unwrap();
        }
        assert_eq!(queue.pending_names(), vec!["a", "b", "c"]);

        let first = queue.pop_due(2.0).unwrap();
        assert_eq!(first.name, "a");
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut queue = EventQueue::new();
        queue.schedule("Test1MassSetup".to_string(), 0.0, noop()).unwrap();
        let err = queue
            .schedule("Test1MassSetup".to_string(), 3.0, noop())
            .unwrap_err();
        assert!(matches!(err, HarnessError::DuplicateEvent { .. }));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_invalid_times_are_rejected() {
        let mut queue = EventQueue::new();
        for time in [-1.0, f64::NAN, f64::INFINITY] {
            let err = queue.schedule("bad".to_string(), time, noop()).unwrap_err();
            assert!(matches!(err, HarnessError::InvalidEventTime { .. }));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_due_respects_limit() {
        let mut queue = EventQueue::new();
        queue.schedule("a".to_string(), 1.0, noop()).unwrap();
        queue.schedule("b".to_string(), 4.0, noop()).unwrap();

        assert_eq!(queue.pop_due(2.0).unwrap().name, "a");
        assert!(queue.pop_due(2.0).is_none());
        assert_eq!(queue.next_time(), Some(4.0));
        assert_eq!(queue.last_time(), Some(4.0));
    }
}
