//! Simulation orchestrator
//!
//! [`Simulation`] owns the grid and the engines, arbitrates which engine
//! runs, queues user inputs and records lifecycle events. It moves through
//! the phases
//!
//! ```text
//! Idle -> FireEventSetup -> FireActive -> Regrowth -> Ended
//! ```
//!
//! Fire and regrowth never run in the same tick segment. Fire is stepped on
//! a fixed lattice of `fire_time_step` minutes and year boundaries are
//! processed one at a time, so splitting a tick into smaller ticks reaches
//! the same state.

pub mod clock;
pub mod events;
pub mod inputs;
pub mod snapshot;
pub mod statistics;

pub use clock::StepSizer;
pub use events::{EventLog, SimulationEvent, SimulationObserver};
pub use inputs::{FireEvent, Spark};
pub use snapshot::{BufferId, CellSnapshot, Snapshot, SnapshotKind, SnapshotManager};
pub use statistics::{total_carbon, VegetationStatistics, YearlyStats};

use crate::config::SimulationConfig;
use crate::core_types::time::{days, years, years_f64};
use crate::core_types::{SimRng, Wind, YEAR_IN_MINUTES};
use crate::engine::{FireEngine, FireEngineConfig, SuccessionEngine};
use crate::error::Result;
use crate::grid::{line_cells, Cell, FireLine, Grid, TerrainInput};
use nalgebra::Vector2;
use tracing::{debug, info, warn};

/// Upper bound (mph) of a random mid-fire wind change when no speed is configured
const NEW_WIND_MAX_SPEED: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Loaded, never started
    #[default]
    Idle,
    /// Sparks being placed; the clock is paused
    FireEventSetup,
    FireActive,
    Regrowth,
    /// The configured end year was reached
    Ended,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    rng: SimRng,
    step_sizer: StepSizer,
    grid: Option<Grid>,

    phase: Phase,
    /// Where a cancelled fire event returns to
    phase_before_setup: Phase,
    running: bool,
    first_frame: bool,

    /// Minutes since the start of the run
    time: f64,
    /// Time of the latest fire engine step
    fire_clock: f64,
    fire_started_at: f64,

    wind: Wind,
    /// Wind to restore once an automatic override ends
    user_wind: Option<Wind>,
    wind_did_change: bool,

    sparks: Vec<Spark>,
    fire_events: Vec<FireEvent>,
    fire_engine: Option<FireEngine>,
    succession: Option<SuccessionEngine>,

    cell_count_by_zone: Vec<usize>,
    burned_cells_in_zone: Vec<usize>,
    yearly_stats: Vec<YearlyStats>,

    cells_state_generation: u64,
    cells_elevation_generation: u64,
    events: Vec<SimulationEvent>,
}

impl Simulation {
    /// Validate `config` and create a simulation with no terrain loaded
    ///
    /// # Errors
    /// Returns [`crate::SimError::InvalidConfig`] when validation fails.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let rng = SimRng::from_seed_option(config.rng_seed);
        let wind = Wind::new(config.wind_speed, config.wind_direction);
        Ok(Self {
            step_sizer: StepSizer::from_config(&config),
            rng,
            grid: None,
            phase: Phase::Idle,
            phase_before_setup: Phase::Idle,
            running: false,
            first_frame: true,
            time: 0.0,
            fire_clock: 0.0,
            fire_started_at: 0.0,
            wind,
            user_wind: None,
            wind_did_change: false,
            sparks: Vec::new(),
            fire_events: Vec::new(),
            fire_engine: None,
            succession: None,
            cell_count_by_zone: Vec::new(),
            burned_cells_in_zone: Vec::new(),
            yearly_stats: Vec::new(),
            cells_state_generation: 0,
            cells_elevation_generation: 0,
            events: Vec::new(),
            config,
        })
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Build zones and cells from `terrain` and queue the configured sparks
    pub fn load_terrain(&mut self, terrain: &TerrainInput) {
        let mut grid = Grid::new(&self.config, terrain);
        if let Some([start, _]) = self.config.climate_change {
            grid.set_drought_level(start);
        }
        self.cell_count_by_zone = grid.cell_count_by_zone();
        self.burned_cells_in_zone = vec![0; grid.zones().len()];
        info!(
            "Loaded terrain: {}x{} cells of {:.0} ft, {} zones",
            grid.width(),
            grid.height(),
            grid.cell_size(),
            grid.zones().len()
        );
        self.grid = Some(grid);
        self.bump_elevation_generation();

        self.sparks.clear();
        for [x, y] in self.config.sparks.clone() {
            self.add_spark(x, y);
        }
    }

    /// Load terrain built from the configuration's matrices
    pub fn load_terrain_from_config(&mut self) {
        let terrain = TerrainInput::from_config(&self.config, &mut self.rng);
        self.load_terrain(&terrain);
    }

    /// Restart, reset wind and sparks from configuration and load `terrain`
    pub fn reload(&mut self, terrain: &TerrainInput) {
        self.restart();
        self.wind = Wind::new(self.config.wind_speed, self.config.wind_direction);
        self.user_wind = None;
        self.load_terrain(terrain);
    }

    // ========================================================================
    // Run control
    // ========================================================================

    /// Begin or resume the tick loop; silently ignored when not ready
    pub fn start(&mut self) {
        if self.grid.is_none() || self.running {
            return;
        }
        match self.phase {
            Phase::Ended => return,
            Phase::Idle | Phase::FireEventSetup => {
                if self.sparks.is_empty() {
                    if self.phase == Phase::FireEventSetup {
                        self.cancel_fire_event();
                    }
                    self.phase = Phase::Regrowth;
                } else {
                    self.begin_fire();
                }
            }
            Phase::FireActive | Phase::Regrowth => {}
        }
        if self.succession.is_none() {
            self.succession = Some(SuccessionEngine::new(self.config.succession.clone()));
        }
        self.running = true;
        self.first_frame = true;
        info!(
            "Simulation started in {:?} at year {:.2}",
            self.phase,
            years_f64(self.time)
        );
        self.emit(SimulationEvent::Start);
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        info!("Simulation stopped at year {:.2}", years_f64(self.time));
        self.emit(SimulationEvent::Stop);
    }

    /// Reset every cell to its zone defaults and return to time 0
    pub fn restart(&mut self) {
        self.running = false;
        self.phase = Phase::Idle;
        self.time = 0.0;
        self.fire_clock = 0.0;
        self.fire_started_at = 0.0;
        self.fire_engine = None;
        self.succession = None;
        if let Some(wind) = self.user_wind.take() {
            self.wind = wind;
        }
        self.wind_did_change = false;
        for spark in &mut self.sparks {
            spark.time = 0.0;
            spark.consumed = false;
        }
        self.fire_events.clear();
        self.yearly_stats.clear();
        self.burned_cells_in_zone.fill(0);
        if let Some(grid) = self.grid.as_mut() {
            grid.reset();
            let levels: Vec<f64> = self.config.zones.iter().map(|z| z.drought_level).collect();
            grid.set_zone_drought_levels(&levels);
            if let Some([start, _]) = self.config.climate_change {
                grid.set_drought_level(start);
            }
        }
        self.bump_elevation_generation();
        info!("Simulation restarted");
        self.emit(SimulationEvent::Restart);
    }

    /// Model time step for one host frame of `real_dt` seconds
    ///
    /// `None` when the loop is not running or the clock is paused.
    pub fn frame_step(&mut self, real_dt: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        let dt = if self.first_frame {
            self.first_frame = false;
            None
        } else {
            Some(real_dt)
        };
        match self.phase {
            Phase::FireActive => Some(self.step_sizer.fire_step(dt)),
            Phase::Regrowth => Some(self.step_sizer.regrowth_step(dt)),
            Phase::Idle | Phase::FireEventSetup | Phase::Ended => None,
        }
    }

    /// Per-frame callback for hosts driving the simulation directly
    pub fn advance_frame(&mut self, real_dt: f64) {
        if let Some(step) = self.frame_step(real_dt) {
            self.tick(step);
        }
    }

    /// Advance the clock by `step` minutes
    pub fn tick(&mut self, step: f64) {
        let mut remaining = step;
        while remaining > 0.0 {
            let rest = self.tick_segment(remaining);
            if rest >= remaining {
                break;
            }
            remaining = rest;
        }
    }

    /// Advance by at most `step` minutes, stopping early at a year boundary
    /// or when the fire stops
    ///
    /// Returns the part of `step` not yet simulated. Events produced by the
    /// segment describe the state at its end.
    pub fn tick_segment(&mut self, step: f64) -> f64 {
        if step <= 0.0 || self.grid.is_none() {
            return 0.0;
        }
        if !matches!(self.phase, Phase::FireActive | Phase::Regrowth) {
            return 0.0;
        }

        let next_boundary = f64::from(years(self.time) + 1) * YEAR_IN_MINUTES;
        let (end, rest) = if self.time + step >= next_boundary {
            (next_boundary, self.time + step - next_boundary)
        } else {
            (self.time + step, 0.0)
        };

        let leftover = if self.phase == Phase::FireActive {
            self.advance_fire(end)
        } else {
            self.time = end;
            if let Some(grid) = self.grid.as_mut() {
                if complete_fire_lines(grid, end) {
                    self.cells_elevation_generation += 1;
                }
            }
            0.0
        };

        if self.time >= next_boundary {
            self.on_year_boundary();
        }
        self.cells_state_generation += 1;
        self.check_end();
        leftover + rest
    }

    // ========================================================================
    // Fire events and sparks
    // ========================================================================

    /// Open ignition mode; valid from Idle or Regrowth
    ///
    /// The current wind is saved and replaced by a random one.
    pub fn add_fire_event(&mut self) -> bool {
        if self.grid.is_none() || !matches!(self.phase, Phase::Idle | Phase::Regrowth) {
            return false;
        }
        self.phase_before_setup = self.phase;
        self.phase = Phase::FireEventSetup;
        self.sparks.clear();
        self.fire_events.push(FireEvent::new(self.time));

        if self.user_wind.is_none() {
            self.user_wind = Some(self.wind);
        }
        let [low, high] = self.config.fire_event_wind_speed;
        let speed = self.rng.range(low, high);
        let direction = self.rng.range(0.0, 360.0);
        self.wind = Wind::new(speed, direction);

        info!(
            "Fire event added at year {:.2}, wind {:.1} mph from {:.0} deg",
            years_f64(self.time),
            speed,
            direction
        );
        self.emit(SimulationEvent::FireEventAdded);
        true
    }

    /// Leave ignition mode; only possible before any spark was placed
    pub fn cancel_fire_event(&mut self) -> bool {
        if self.phase != Phase::FireEventSetup || !self.sparks.is_empty() {
            return false;
        }
        self.phase = self.phase_before_setup;
        self.fire_events.pop();
        if let Some(wind) = self.user_wind.take() {
            self.wind = wind;
        }
        info!("Fire event cancelled");
        self.emit(SimulationEvent::FireEventRemoved);
        true
    }

    /// Queue a spark at `(x, y)` model feet
    ///
    /// Accepted in `Idle` and `FireEventSetup`, up to `max_sparks`, on the grid.
    pub fn add_spark(&mut self, x: f64, y: f64) -> bool {
        if !matches!(self.phase, Phase::Idle | Phase::FireEventSetup) || !self.can_add_spark() {
            return false;
        }
        let Some(grid) = self.grid.as_ref() else {
            return false;
        };
        if grid.cell_at(Vector2::new(x, y)).is_none() {
            warn!("Rejected spark at ({:.0}, {:.0}): outside the grid", x, y);
            return false;
        }
        let spark = Spark::new(x, y, self.time);
        self.sparks.push(spark);
        if self.phase == Phase::FireEventSetup {
            if let Some(event) = self.fire_events.last_mut() {
                event.sparks.push(spark);
            }
        }
        debug!("Spark {} added at ({:.0}, {:.0})", self.sparks.len(), x, y);
        self.emit(SimulationEvent::SparkAdded);
        true
    }

    /// Move a queued spark that has not ignited yet
    pub fn set_spark(&mut self, idx: usize, x: f64, y: f64) -> bool {
        if !matches!(self.phase, Phase::Idle | Phase::FireEventSetup) {
            return false;
        }
        let on_grid = self
            .grid
            .as_ref()
            .is_some_and(|g| g.cell_at(Vector2::new(x, y)).is_some());
        match self.sparks.get_mut(idx) {
            Some(spark) if on_grid && !spark.consumed => {
                spark.position = Vector2::new(x, y);
                let moved = *spark;
                if self.phase == Phase::FireEventSetup {
                    if let Some(event_spark) = self
                        .fire_events
                        .last_mut()
                        .and_then(|event| event.sparks.get_mut(idx))
                    {
                        *event_spark = moved;
                    }
                }
                true
            }
            _ => false,
        }
    }

    pub fn can_add_spark(&self) -> bool {
        self.remaining_sparks() > 0
    }

    pub fn remaining_sparks(&self) -> usize {
        self.config.max_sparks.saturating_sub(self.sparks.len())
    }

    pub fn set_wind(&mut self, wind: Wind) {
        self.wind = wind;
        if let Some(engine) = self.fire_engine.as_mut() {
            engine.set_wind(wind);
        }
    }

    // ========================================================================
    // Suppression
    // ========================================================================

    /// Mark a fire line along the cells between two points (model feet)
    ///
    /// Lines are built at once outside an active fire. During a fire they
    /// take `fire_line_build_minutes` to complete. Returns the number of
    /// cells marked.
    pub fn add_fire_line(&mut self, start: Vector2<f64>, end: Vector2<f64>) -> usize {
        let build_minutes = self.config.fire_line_build_minutes;
        let state = if self.phase == Phase::FireActive && build_minutes > 0.0 {
            FireLine::UnderConstruction {
                ready_at: self.time + build_minutes,
            }
        } else {
            FireLine::Built
        };
        let Some(grid) = self.grid.as_mut() else {
            return 0;
        };
        let (Some(a), Some(b)) = (grid.cell_at(start), grid.cell_at(end)) else {
            warn!("Rejected fire line with an endpoint outside the grid");
            return 0;
        };
        let (x0, y0) = grid.coords(a);
        let (x1, y1) = grid.coords(b);
        let mut marked = 0;
        for (x, y) in line_cells(x0, y0, x1, y1) {
            let idx = grid.index(x, y);
            let cell = grid.cell_mut(idx);
            if cell.is_river || cell.fire_line == FireLine::Built {
                continue;
            }
            cell.fire_line = state;
            marked += 1;
        }
        info!("Fire line over {} cells ({:?})", marked, state);
        self.bump_elevation_generation();
        marked
    }

    /// Suppression drop centred on `center` (model feet)
    ///
    /// Every cell whose centre lies within `helitack_drop_radius` gets one
    /// more drop, lowering its effective drought level. Returns the number of
    /// cells hit.
    pub fn add_helitack_drop(&mut self, center: Vector2<f64>) -> usize {
        let radius = self.config.helitack_drop_radius;
        let Some(grid) = self.grid.as_mut() else {
            return 0;
        };
        let mut hit = 0;
        for idx in 0..grid.len() {
            if (grid.cell_center(idx) - center).norm() <= radius {
                grid.cell_mut(idx).helitack_drop_count += 1;
                hit += 1;
            }
        }
        debug!("Helitack drop at ({:.0}, {:.0}) hit {} cells", center.x, center.y, hit);
        self.cells_state_generation += 1;
        hit
    }

    // ========================================================================
    // Snapshot restore
    // ========================================================================

    /// Replace the live state with `snapshot`; the loop is left stopped
    ///
    /// A snapshot holding a fire in progress comes back in `FireActive`.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot, cells: &[CellSnapshot]) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        grid.set_zone_drought_levels(&snapshot.drought_levels);
        for (cell, saved) in grid.cells_mut().iter_mut().zip(cells) {
            saved.apply(cell);
        }
        self.running = false;
        self.fire_engine = None;
        self.time = snapshot.time;
        self.fire_clock = snapshot.fire_clock;
        self.wind = snapshot.wind;
        self.user_wind = None;
        self.sparks.clone_from(&snapshot.sparks);
        self.burned_cells_in_zone.fill(0);
        let year = years(self.time);
        self.yearly_stats.retain(|s| s.year <= year);

        if grid.cells().iter().any(Cell::is_burning_or_will_burn) {
            // Taken mid-fire: carry on burning from the saved cells.
            let engine = FireEngine::resume(
                grid,
                self.wind,
                FireEngineConfig::from(&self.config),
                self.fire_clock,
            );
            self.fire_started_at = engine
                .fires()
                .iter()
                .map(|f| f.start_time)
                .fold(self.fire_clock, f64::min);
            self.wind_did_change = self
                .config
                .change_wind_on_day
                .is_some_and(|day| days(self.fire_clock - self.fire_started_at) >= day);
            self.burned_cells_in_zone = engine.burned_cells_in_zone().to_vec();
            self.fire_engine = Some(engine);
            self.phase = Phase::FireActive;
        } else if year >= self.config.simulation_end_year {
            self.phase = Phase::Ended;
        } else {
            self.phase = Phase::Regrowth;
        }
        if self.succession.is_none() {
            self.succession = Some(SuccessionEngine::new(self.config.succession.clone()));
        }
        self.bump_elevation_generation();
    }

    // ========================================================================
    // Read-outs
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Terrain is loaded
    pub fn is_data_ready(&self) -> bool {
        self.grid.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Minutes since the start of the run
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Fractional simulated years
    pub fn year(&self) -> f64 {
        years_f64(self.time)
    }

    /// Time of the latest fire engine step
    pub fn fire_clock(&self) -> f64 {
        self.fire_clock
    }

    pub fn wind(&self) -> Wind {
        self.wind
    }

    /// The mid-fire wind change already happened for the current fire
    pub fn wind_did_change(&self) -> bool {
        self.wind_did_change
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn fire_events(&self) -> &[FireEvent] {
        &self.fire_events
    }

    pub fn fire_engine(&self) -> Option<&FireEngine> {
        self.fire_engine.as_ref()
    }

    pub fn yearly_stats(&self) -> &[YearlyStats] {
        &self.yearly_stats
    }

    /// Drought level of every zone
    pub fn drought_levels(&self) -> Vec<f64> {
        match &self.grid {
            Some(grid) => grid.zones().iter().map(|z| z.drought_level).collect(),
            None => self.config.zones.iter().map(|z| z.drought_level).collect(),
        }
    }

    /// Fraction of a zone's cells burnt by the latest fire
    pub fn zone_burn_percentage(&self, zone: usize) -> f64 {
        let total = self.cell_count_by_zone.get(zone).copied().unwrap_or(0);
        if total == 0 {
            return 0.0;
        }
        let burned = self.burned_cells_in_zone.get(zone).copied().unwrap_or(0);
        burned as f64 / total as f64
    }

    /// Bumped on every mutation that affects cell state
    pub fn cells_state_generation(&self) -> u64 {
        self.cells_state_generation
    }

    /// Bumped on every mutation that affects elevation
    pub fn cells_elevation_generation(&self) -> u64 {
        self.cells_elevation_generation
    }

    /// Drain the events recorded since the last call, in emission order
    pub fn take_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn emit(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    fn bump_elevation_generation(&mut self) {
        self.cells_elevation_generation += 1;
        self.cells_state_generation += 1;
    }

    fn begin_fire(&mut self) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        let engine = FireEngine::new(grid, self.wind, FireEngineConfig::from(&self.config), self.time);
        self.fire_engine = Some(engine);
        self.fire_clock = self.time;
        self.fire_started_at = self.time;
        self.wind_did_change = false;
        self.burned_cells_in_zone.fill(0);
        if !self.fire_events.last().is_some_and(FireEvent::is_open) {
            let mut event = FireEvent::new(self.time);
            event.sparks.clone_from(&self.sparks);
            self.fire_events.push(event);
        }
        self.phase = Phase::FireActive;
        info!("Fire started with {} sparks", self.sparks.len());
    }

    /// Step the fire engine up to `end`; returns unsimulated time if the
    /// fire stopped first
    fn advance_fire(&mut self, end: f64) -> f64 {
        self.time = end;
        let fire_time_step = self.config.fire_time_step;
        let (Some(grid), Some(engine)) = (self.grid.as_mut(), self.fire_engine.as_mut()) else {
            return 0.0;
        };

        let pending: Vec<Vector2<f64>> = self
            .sparks
            .iter()
            .filter(|s| !s.consumed)
            .map(|s| s.position)
            .collect();
        if !pending.is_empty() {
            let placed = engine.set_sparks(grid, &pending);
            debug!("Fed {} of {} sparks to the fire engine", placed, pending.len());
            for spark in &mut self.sparks {
                spark.consumed = true;
            }
        }

        let mut stopped = engine.fire_did_stop();
        while !stopped && self.fire_clock + fire_time_step <= end {
            self.fire_clock += fire_time_step;
            if complete_fire_lines(grid, self.fire_clock) {
                self.cells_elevation_generation += 1;
            }
            engine.update_fire(grid, self.fire_clock, &mut self.rng);
            stopped = engine.fire_did_stop();

            if let Some(day) = self.config.change_wind_on_day {
                if !self.wind_did_change && days(self.fire_clock - self.fire_started_at) >= day {
                    let direction = match self.config.new_wind_direction {
                        Some(direction) => direction,
                        None => self.rng.range(0.0, 360.0),
                    };
                    let speed = match self.config.new_wind_speed {
                        Some(speed) => speed,
                        None => self.rng.range(0.0, NEW_WIND_MAX_SPEED),
                    } * self.config.wind_scale_factor;
                    if self.user_wind.is_none() {
                        self.user_wind = Some(self.wind);
                    }
                    self.wind = Wind::new(speed, direction);
                    engine.set_wind(self.wind);
                    self.wind_did_change = true;
                    info!(
                        "Wind changed on day {}: {:.1} mph from {:.0} deg",
                        day, speed, direction
                    );
                }
            }
        }
        self.burned_cells_in_zone = engine.burned_cells_in_zone().to_vec();

        if stopped {
            self.time = self.fire_clock;
            self.end_fire();
            return end - self.time;
        }
        0.0
    }

    fn end_fire(&mut self) {
        self.fire_engine = None;
        if let Some(wind) = self.user_wind.take() {
            self.wind = wind;
        }
        self.sparks.clear();
        if let Some(event) = self.fire_events.last_mut() {
            event.end_time = Some(self.time);
        }
        self.phase = Phase::Regrowth;
        self.cells_state_generation += 1;
        info!(
            "Fire ended after {:.1} days",
            (self.time - self.fire_started_at) / crate::core_types::DAY_IN_MINUTES
        );
        self.emit(SimulationEvent::FireEventEnded);
    }

    fn on_year_boundary(&mut self) {
        let year = years(self.time);
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        if self.phase == Phase::Regrowth {
            let succession = self
                .succession
                .get_or_insert_with(|| SuccessionEngine::new(self.config.succession.clone()));
            succession.update_vegetation(grid, self.time, &mut self.rng);
        }
        if let Some([start, end]) = self.config.climate_change {
            let progress = (f64::from(year) / f64::from(self.config.simulation_end_year)).min(1.0);
            grid.set_drought_level(start + (end - start) * progress);
        }
        let stats = YearlyStats::collect(grid, year);
        debug!(
            "Year {}: burned {:.3}, carbon {:.1} t",
            year, stats.vegetation.burned, stats.total_carbon
        );
        self.yearly_stats.push(stats);
        self.emit(SimulationEvent::YearChange);
    }

    fn check_end(&mut self) {
        if self.phase != Phase::Regrowth || years(self.time) < self.config.simulation_end_year {
            return;
        }
        self.phase = Phase::Ended;
        info!("Reached end year {}", self.config.simulation_end_year);
        if self.running {
            self.running = false;
            self.emit(SimulationEvent::Stop);
        }
    }
}

/// Finish fire lines whose construction is done by `time`
fn complete_fire_lines(grid: &mut Grid, time: f64) -> bool {
    let mut completed = false;
    for cell in grid.cells_mut() {
        if let FireLine::UnderConstruction { ready_at } = cell.fire_line {
            if ready_at <= time {
                cell.fire_line = FireLine::Built;
                completed = true;
            }
        }
    }
    completed
}
