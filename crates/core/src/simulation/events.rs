//! Lifecycle events emitted by the orchestrator

use super::Simulation;

/// Events carry no payload; observers read the current simulation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationEvent {
    Start,
    Stop,
    Restart,
    /// A simulated year boundary was crossed
    YearChange,
    FireEventAdded,
    /// An empty fire event was cancelled
    FireEventRemoved,
    /// The fire started by the latest fire event stopped
    FireEventEnded,
    SparkAdded,
}

/// Receives events in emission order, each right after the state change
/// that produced it
pub trait SimulationObserver {
    fn on_event(&mut self, event: SimulationEvent, simulation: &Simulation);
}

/// Records every event it sees
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<SimulationEvent>,
}

impl SimulationObserver for EventLog {
    fn on_event(&mut self, event: SimulationEvent, _simulation: &Simulation) {
        self.events.push(event);
    }
}
