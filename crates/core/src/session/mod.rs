//! One interactive run: a simulation, its timeline and its observers
//!
//! The session forwards user operations to the [`Simulation`] and, after each
//! one, dispatches the recorded events to the [`SnapshotManager`] and then to
//! every registered observer. Ticks are fed one segment at a time so year
//! snapshots see the state at the boundary that produced them.

use crate::config::SimulationConfig;
use crate::core_types::Wind;
use crate::error::Result;
use crate::grid::TerrainInput;
use crate::simulation::{Phase, Simulation, SimulationObserver, SnapshotManager};
use nalgebra::Vector2;

pub struct Session {
    simulation: Simulation,
    snapshots: SnapshotManager,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl Session {
    /// # Errors
    /// Returns [`crate::SimError::InvalidConfig`] when `config` fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let snapshots = SnapshotManager::from_config(&config);
        Ok(Self {
            simulation: Simulation::new(config)?,
            snapshots,
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshots
    }

    pub fn load_terrain(&mut self, terrain: &TerrainInput) {
        self.simulation.load_terrain(terrain);
        self.dispatch();
    }

    pub fn load_terrain_from_config(&mut self) {
        self.simulation.load_terrain_from_config();
        self.dispatch();
    }

    pub fn reload(&mut self, terrain: &TerrainInput) {
        self.simulation.reload(terrain);
        self.dispatch();
    }

    /// Start or resume; after scrubbing back, resumes from the latest snapshot
    pub fn start(&mut self) {
        if matches!(self.simulation.phase(), Phase::FireActive | Phase::Regrowth) {
            self.snapshots.prepare_resume(&mut self.simulation);
        }
        self.simulation.start();
        self.dispatch();
    }

    pub fn stop(&mut self) {
        self.simulation.stop();
        self.dispatch();
    }

    pub fn restart(&mut self) {
        self.simulation.restart();
        self.dispatch();
    }

    pub fn tick(&mut self, step: f64) {
        let mut remaining = step;
        while remaining > 0.0 {
            let rest = self.simulation.tick_segment(remaining);
            self.dispatch();
            if rest >= remaining {
                break;
            }
            remaining = rest;
        }
    }

    pub fn advance_frame(&mut self, real_dt: f64) {
        if let Some(step) = self.simulation.frame_step(real_dt) {
            self.tick(step);
        }
    }

    pub fn add_fire_event(&mut self) -> bool {
        let added = self.simulation.add_fire_event();
        self.dispatch();
        added
    }

    pub fn cancel_fire_event(&mut self) -> bool {
        let cancelled = self.simulation.cancel_fire_event();
        self.dispatch();
        cancelled
    }

    pub fn add_spark(&mut self, x: f64, y: f64) -> bool {
        let added = self.simulation.add_spark(x, y);
        self.dispatch();
        added
    }

    pub fn set_spark(&mut self, idx: usize, x: f64, y: f64) -> bool {
        self.simulation.set_spark(idx, x, y)
    }

    pub fn set_wind(&mut self, wind: Wind) {
        self.simulation.set_wind(wind);
    }

    pub fn add_fire_line(&mut self, start: Vector2<f64>, end: Vector2<f64>) -> usize {
        self.simulation.add_fire_line(start, end)
    }

    pub fn add_helitack_drop(&mut self, center: Vector2<f64>) -> usize {
        self.simulation.add_helitack_drop(center)
    }

    /// Scrub to the snapshot nearest `year`
    pub fn restore_year(&mut self, year: f64) -> bool {
        self.snapshots.restore(&mut self.simulation, year)
    }

    pub fn restore_latest(&mut self) -> bool {
        self.snapshots.restore_latest(&mut self.simulation)
    }

    /// Run with a fixed step until the loop stops, at most `max_ticks` times
    ///
    /// Returns the number of ticks performed.
    pub fn run_until_stopped(&mut self, step: f64, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while self.simulation.is_running() && ticks < max_ticks {
            self.tick(step);
            ticks += 1;
        }
        ticks
    }

    fn dispatch(&mut self) {
        for event in self.simulation.take_events() {
            self.snapshots.on_event(event, &self.simulation);
            for observer in &mut self.observers {
                observer.on_event(event, &self.simulation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::YEAR_IN_MINUTES;
    use crate::simulation::events::SimulationEvent;
    use crate::simulation::SnapshotKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> Session {
        let config = SimulationConfig {
            model_width: 2_000.0,
            model_height: 2_000.0,
            grid_width: 4,
            zone_index: None,
            fill_terrain_edges: false,
            simulation_end_year: 10,
            rng_seed: Some(5),
            ..SimulationConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        session.load_terrain(&TerrainInput::flat());
        session
    }

    struct Shared(Rc<RefCell<Vec<SimulationEvent>>>);

    impl SimulationObserver for Shared {
        fn on_event(&mut self, event: SimulationEvent, _simulation: &Simulation) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn test_observers_see_events_in_order() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        session.add_observer(Box::new(Shared(Rc::clone(&seen))));
        session.start();
        session.tick(2.0 * YEAR_IN_MINUTES);
        session.stop();
        assert_eq!(
            *seen.borrow(),
            vec![
                SimulationEvent::Start,
                SimulationEvent::YearChange,
                SimulationEvent::YearChange,
                SimulationEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_snapshot_every_year() {
        let mut session = session();
        session.start();
        session.tick(3.0 * YEAR_IN_MINUTES);
        let kinds: Vec<SnapshotKind> = session.snapshots().snapshots().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SnapshotKind::Start,
                SnapshotKind::Year,
                SnapshotKind::Year,
                SnapshotKind::Year,
            ]
        );
        assert_eq!(session.snapshots().max_year(), 3.0);
    }

    #[test]
    fn test_restart_clears_timeline() {
        let mut session = session();
        session.start();
        session.tick(2.0 * YEAR_IN_MINUTES);
        session.restart();
        assert!(session.snapshots().is_empty());
        assert_eq!(session.snapshots().buffer_count(), 0);
    }
}
