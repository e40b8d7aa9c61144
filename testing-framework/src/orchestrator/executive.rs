// File: testing-framework/src/orchestrator/executive.rs
//
// Minimal event loop standing in for the host executive
//
// Fires queued events in time order, moving the plant and the clock to each
// event's time first. It has no notion of frames or job classes.

use super::clock::{Clock, SimClock};
use super::scheduler::{EventAction, EventContext, EventQueue, EventScheduler};
use crate::datalog::{DataLog, DataRecorder};
use crate::error::HarnessResult;
use crate::network::Plant;
use crate::report::Reporter;

/// Summary of one executive run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Events whose callbacks ran
    pub events_fired: usize,
    /// Events still queued when the run stopped
    pub pending_events: Vec<String>,
    /// Simulated time when the run stopped
    pub final_time: f64,
}

/// Owns the event queue and the simulation clock
///
/// # Examples
///
/// ```rust
/// use fluid_testing_framework::network::memory::MemoryPlant;
/// use fluid_testing_framework::orchestrator::{EventScheduler, Executive};
/// use fluid_testing_framework::report::TestReporter;
///
/// let mut exec = Executive::new();
/// exec.schedule("hello".to_string(), 1.0, Box::new(|ctx| {
///     assert_eq!(ctx.sim_time, 1.0);
/// })).unwrap();
///
/// let mut plant = MemoryPlant::new();
/// let mut reporter = TestReporter::new();
/// let summary = exec.run(&mut plant, &mut reporter).unwrap();
/// assert_eq!(summary.events_fired, 1);
/// ```
#[derive(Debug, Default)]
pub struct Executive {
    queue: EventQueue,
    clock: SimClock,
    terminate_time: Option<f64>,
    recorder: DataRecorder,
}

impl Executive {
    /// Executive with no terminate time (runs until the queue is empty)
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop at `time`; events scheduled later never fire
    pub fn with_terminate_time(mut self, time: f64) -> Self {
        self.terminate_time = Some(time);
        self
    }

    /// Set or replace the terminate time
    pub fn set_terminate_time(&mut self, time: f64) {
        self.terminate_time = Some(time);
    }

    /// Configured terminate time
    pub fn terminate_time(&self) -> Option<f64> {
        self.terminate_time
    }

    /// Sample `recorder`'s variables at every event time
    pub fn set_recorder(&mut self, recorder: DataRecorder) {
        self.recorder = recorder;
    }

    /// Values sampled so far
    pub fn data_log(&self) -> &DataLog {
        self.recorder.log()
    }

    /// Latest time currently scheduled
    pub fn last_event_time(&self) -> Option<f64> {
        self.queue.last_time()
    }

    /// Fire every due event, then move to the terminate time if one is set
    pub fn run(
        &mut self,
        plant: &mut dyn Plant,
        reporter: &mut dyn Reporter,
    ) -> HarnessResult<RunSummary> {
        let limit = self.terminate_time.unwrap_or(f64::INFINITY);
        let mut events_fired = 0;

        while let Some(mut event) = self.queue.pop_due(limit) {
            plant.advance_to(event.time)?;
            self.clock.advance_to(event.time)?;
            self.recorder.sample(&*plant, event.time)?;

            log::debug!("t={:.4}s firing event '{}'", event.time, event.name);
            let name = event.name.clone();
            let mut ctx = EventContext {
                sim_time: event.time,
                event_name: &name,
                plant: &*plant,
                reporter: &mut *reporter,
                data_log: self.recorder.log(),
            };
            event.fire(&mut ctx);
            events_fired += 1;
        }

        if let Some(end) = self.terminate_time {
            if end > self.clock.now() {
                plant.advance_to(end)?;
                self.clock.advance_to(end)?;
                self.recorder.sample(&*plant, end)?;
            }
        }

        let pending_events = self.queue.pending_names();
        if !pending_events.is_empty() {
            log::warn!(
                "Simulation terminated at t={}s with {} event(s) never fired: {:?}",
                self.clock.now(),
                pending_events.len(),
                pending_events
            );
        }

        Ok(RunSummary {
            events_fired,
            pending_events,
            final_time: self.clock.now(),
        })
    }
}

impl EventScheduler for Executive {
    fn schedule(&mut self, name: String, time: f64, action: EventAction) -> HarnessResult<()> {
        log::debug!("Registering event '{}' at t={}s", name, time);
        self.queue.schedule(name, time, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::memory::{MemoryNetwork, MemoryNode, MemoryPlant};
    use crate::report::TestReporter;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_events_fire_in_order_with_plant_advanced() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut exec = Executive::new();

        for (name, time) in [("b", 2.0), ("a", 1.0), ("c", 3.0)] {
            let seen = seen.clone();
            exec.schedule(
                name.to_string(),
                time,
                Box::new(move |ctx| seen.borrow_mut().push((ctx.event_name.to_string(), ctx.sim_time))),
            )
            .unwrap();
        }

        let mut plant = MemoryPlant::new();
        let mut reporter = TestReporter::new();
        let summary = exec.run(&mut plant, &mut reporter).unwrap();

        assert_eq!(summary.events_fired, 3);
        assert_eq!(summary.final_time, 3.0);
        assert!(summary.pending_events.is_empty());
        assert_eq!(
            *seen.borrow(),
            vec![
                ("a".to_string(), 1.0),
                ("b".to_string(), 2.0),
                ("c".to_string(), 3.0)
            ]
        );
        assert_eq!(plant.time(), 3.0);
    }

    #[test]
    fn test_terminate_time_leaves_late_events_pending() {
        let mut exec = Executive::new().with_terminate_time(5.0);
        exec.schedule("early".to_string(), 1.0, Box::new(|_| {})).unwrap();
        exec.schedule("late".to_string(), 9.0, Box::new(|_| {})).unwrap();

        let mut plant = MemoryPlant::new();
        let mut reporter = TestReporter::new();
        let summary = exec.run(&mut plant, &mut reporter).unwrap();

        assert_eq!(summary.events_fired, 1);
        assert_eq!(summary.pending_events, vec!["late".to_string()]);
        assert_eq!(summary.final_time, 5.0);
        assert_eq!(plant.time(), 5.0);
    }

    #[test]
    fn test_recorder_samples_before_callbacks_fire() {
        use crate::datalog::LoggedVariable;
        use crate::network::memory::Flow;

        let network = MemoryNetwork::new("fluid1").with_node(MemoryNode::new(1.0, 0.0, 300.0));
        let mut plant = MemoryPlant::new().with_network(network).with_flow(Flow::Leak {
            network: "fluid1".to_string(),
            node: 0,
            rate: 0.125,
        });

        let mut exec = Executive::new().with_terminate_time(6.0);
        exec.set_recorder(DataRecorder::new([LoggedVariable::NodeMass {
            network: "fluid1".to_string(),
            node: 0,
        }]));

        let seen = Rc::new(RefCell::new(Vec::new()));
        for (name, time) in [("a", 2.0), ("b", 2.0), ("c", 4.0)] {
            let seen = seen.clone();
            exec.schedule(
                name.to_string(),
                time,
                Box::new(move |ctx| {
                    let logged = ctx.data_log.lookup("fluid1.node[0].mass", ctx.sim_time);
                    seen.borrow_mut().push(logged);
                }),
            )
            .unwrap();
        }

        let mut reporter = TestReporter::new();
        exec.run(&mut plant, &mut reporter).unwrap();

        assert_eq!(*seen.borrow(), vec![Some(0.75), Some(0.75), Some(0.5)]);
        // One row per distinct time, plus the terminate time
        let times: Vec<f64> = exec.data_log().rows().iter().map(|r| r.time).collect();
        assert_eq!(times, vec![2.0, 4.0, 6.0]);
        assert_eq!(exec.data_log().lookup("mass", 5.0), Some(0.25));
    }

    #[test]
    fn test_callbacks_read_plant_state_at_event_time() {
        let network = MemoryNetwork::new("fluid1").with_node(MemoryNode::new(1.0, 0.0, 300.0));
        let mut plant = MemoryPlant::new().with_network(network);
        plant.network_mut("fluid1").unwrap().node_mut(0).unwrap().set_mass(4.0);

        let observed = Rc::new(RefCell::new(0.0));
        let mut exec = Executive::new();
        let sink = observed.clone();
        exec.schedule(
            "read".to_string(),
            0.5,
            Box::new(move |ctx| {
                let mass = ctx.plant.network("fluid1").unwrap().node(0).unwrap().mass();
                *sink.borrow_mut() = mass;
            }),
        )
        .unwrap();

        let mut reporter = TestReporter::new();
        exec.run(&mut plant, &mut reporter).unwrap();
        assert_eq!(*observed.borrow(), 4.0);
        assert!(plant.network("fluid1").is_ok());
    }
}
