//! Cellular-automaton fire spread
//!
//! The engine owns only per-fire bookkeeping; cell state lives in the
//! [`Grid`] passed to every call. One call to [`FireEngine::update_fire`]
//! is a single sweep over all cells in which every read observes the
//! pre-sweep state. Writes are collected and applied once the sweep ends.

use crate::config::SimulationConfig;
use crate::core_types::time::days;
use crate::core_types::{BurnIndex, FireState, SimRng, Wind};
use crate::grid::topology::DIRECT_NEIGHBOURS;
use crate::grid::{grid_cell_neighbours, BurnRecord, Cell, Grid};
use crate::physics::fire_spread_rate;
use nalgebra::Vector2;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Chance, by elapsed day, that a fire stops spreading through low intensity cells
const END_OF_LOW_INTENSITY_FIRE_PROBABILITY: [f64; 6] = [0.0, 0.6, 0.6, 0.7, 0.8, 1.0];

/// One ignition cluster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fire {
    pub start_time: f64,
    /// Whole days elapsed at the last update
    pub day: u32,
    /// Low intensity cells reached by this fire no longer spread it
    pub end_of_low_intensity_fire: bool,
}

/// Subset of [`SimulationConfig`] the fire engine reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireEngineConfig {
    pub min_cell_burn_time: f64,
    pub neighbors_dist: f64,
    pub fire_survival_probability: f64,
}

impl From<&SimulationConfig> for FireEngineConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            min_cell_burn_time: config.min_cell_burn_time,
            neighbors_dist: config.neighbors_dist,
            fire_survival_probability: config.fire_survival_probability,
        }
    }
}

/// Ignition data accumulated for an unburnt neighbour during one sweep
#[derive(Debug, Clone, Copy)]
struct PendingIgnition {
    ignition_time: f64,
    burn_time: f64,
    spread_rate: f64,
    fire_idx: Option<usize>,
}

impl PendingIgnition {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            ignition_time: cell.ignition_time,
            burn_time: cell.burn_time,
            spread_rate: cell.spread_rate,
            fire_idx: cell.fire_idx,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    Ignite,
    Survive,
    BurnOut(BurnIndex),
}

#[derive(Debug, Clone)]
pub struct FireEngine {
    fires: Vec<Fire>,
    wind: Wind,
    config: FireEngineConfig,
    time: f64,
    fire_did_stop: bool,
    burned_cells_in_zone: Vec<usize>,
}

impl FireEngine {
    /// Prepare `grid` for a new fire event starting at `start_time`
    pub fn new(grid: &mut Grid, wind: Wind, config: FireEngineConfig, start_time: f64) -> Self {
        let max_burn_time = grid.max_cell_burn_time();
        for cell in grid.cells_mut() {
            cell.pre_fire_event_reset(max_burn_time);
        }
        Self {
            fires: Vec::new(),
            wind,
            config,
            time: start_time,
            fire_did_stop: false,
            burned_cells_in_zone: vec![0; grid.zones().len()],
        }
    }

    /// Pick up a fire already in progress on `grid` at `time`
    ///
    /// Cell state is kept. One [`Fire`] is rebuilt per fire index found on
    /// the grid, starting at the earliest ignition it owns. The low
    /// intensity cut-off is drawn again on the next day boundary.
    pub fn resume(grid: &Grid, wind: Wind, config: FireEngineConfig, time: f64) -> Self {
        let fire_count = grid
            .cells()
            .iter()
            .filter_map(|c| c.fire_idx)
            .max()
            .map_or(0, |max| max + 1);
        let mut start_times = vec![time; fire_count];
        let mut burned_cells_in_zone = vec![0; grid.zones().len()];
        for cell in grid.cells() {
            let Some(fire) = cell.fire_idx else {
                continue;
            };
            if cell.ignition_time.is_finite() {
                start_times[fire] = start_times[fire].min(cell.ignition_time);
            }
            if cell.fire_state == FireState::Burnt {
                burned_cells_in_zone[cell.zone_idx] += 1;
            }
        }
        let fires = start_times
            .into_iter()
            .map(|start_time| Fire {
                start_time,
                day: days(time - start_time),
                end_of_low_intensity_fire: false,
            })
            .collect();
        debug!("Resumed {} fires at {:.1} min", fire_count, time);
        Self {
            fires,
            wind,
            config,
            time,
            fire_did_stop: !grid.cells().iter().any(Cell::is_burning_or_will_burn),
            burned_cells_in_zone,
        }
    }

    pub fn fires(&self) -> &[Fire] {
        &self.fires
    }

    pub fn wind(&self) -> Wind {
        self.wind
    }

    pub fn set_wind(&mut self, wind: Wind) {
        self.wind = wind;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Nothing is burning or scheduled to ignite
    pub fn fire_did_stop(&self) -> bool {
        self.fire_did_stop
    }

    /// Cells burnt by this engine, per zone
    pub fn burned_cells_in_zone(&self) -> &[usize] {
        &self.burned_cells_in_zone
    }

    /// Ignite the cells under `sparks` at the current engine time
    ///
    /// Returns the number of sparks that landed on the grid. A spark inside an
    /// unburnt island removes the whole island first.
    pub fn set_sparks(&mut self, grid: &mut Grid, sparks: &[Vector2<f64>]) -> usize {
        let mut placed = 0;
        for spark in sparks {
            let Some(idx) = grid.cell_at(*spark) else {
                warn!("Spark at ({:.0}, {:.0}) is outside the grid", spark.x, spark.y);
                continue;
            };
            let target = grid.cell(idx);
            if target.is_river || target.is_edge {
                warn!("Spark at ({:.0}, {:.0}) landed on a nonburnable cell", spark.x, spark.y);
                continue;
            }
            self.fires.push(Fire {
                start_time: self.time,
                day: 0,
                end_of_low_intensity_fire: false,
            });
            let cell = grid.cell_mut(idx);
            cell.ignition_time = self.time;
            cell.fire_idx = Some(self.fires.len() - 1);
            if cell.is_unburnt_island {
                remove_unburnt_island(grid, idx);
            }
            placed += 1;
        }
        self.fire_did_stop = !grid.cells().iter().any(Cell::is_burning_or_will_burn);
        placed
    }

    /// Advance fire state to `time` (minutes)
    pub fn update_fire(&mut self, grid: &mut Grid, time: f64, rng: &mut SimRng) {
        self.time = time;

        for fire in &mut self.fires {
            let new_day = days(time - fire.start_time);
            if new_day != fire.day {
                fire.day = new_day;
                let probability = END_OF_LOW_INTENSITY_FIRE_PROBABILITY
                    .get(new_day as usize)
                    .copied()
                    .unwrap_or(1.0);
                if rng.next_f64() <= probability {
                    fire.end_of_low_intensity_fire = true;
                }
            }
        }

        let cell_size = grid.cell_size();
        let mut transitions: Vec<(usize, Transition)> = Vec::new();
        let mut pending: Vec<Option<PendingIgnition>> = vec![None; grid.len()];

        for i in 0..grid.len() {
            let cell = grid.cell(i);
            match cell.fire_state {
                FireState::Burning if time - cell.ignition_time > cell.burn_time => {
                    let burn_index = grid.burn_index(i);
                    if burn_index == BurnIndex::Low
                        && rng.next_f64() < self.config.fire_survival_probability
                    {
                        transitions.push((i, Transition::Survive));
                    } else {
                        transitions.push((i, Transition::BurnOut(burn_index)));
                    }
                }
                FireState::Unburnt if time > cell.ignition_time => {
                    transitions.push((i, Transition::Ignite));
                    let burn_index = grid.burn_index(i);
                    let end_of_low_intensity = cell
                        .fire_idx
                        .is_some_and(|f| self.fires[f].end_of_low_intensity_fire);
                    if end_of_low_intensity && burn_index == BurnIndex::Low {
                        continue;
                    }

                    let source = grid.fuel_site(i);
                    let ignition_time = cell.ignition_time;
                    for n in grid_cell_neighbours(grid, i, self.config.neighbors_dist, burn_index) {
                        let neighbour = grid.cell(n);
                        if neighbour.fire_state != FireState::Unburnt {
                            continue;
                        }
                        let target = grid.fuel_site(n);
                        let spread_rate = fire_spread_rate(&source, &target, &self.wind, cell_size);
                        if spread_rate <= 0.0 {
                            continue;
                        }
                        let distance_ft =
                            (target.x - source.x).hypot(target.y - source.y) * cell_size;
                        let new_ignition_time = ignition_time + distance_ft / spread_rate;

                        let entry =
                            pending[n].get_or_insert_with(|| PendingIgnition::from_cell(neighbour));
                        if new_ignition_time < entry.ignition_time {
                            entry.ignition_time = new_ignition_time;
                            entry.fire_idx = cell.fire_idx;
                        }
                        // Faster fronts burn through a cell sooner.
                        let new_burn_time =
                            (entry.ignition_time - ignition_time) + self.config.min_cell_burn_time;
                        if new_burn_time < entry.burn_time {
                            entry.burn_time = new_burn_time;
                        }
                        if spread_rate > entry.spread_rate {
                            entry.spread_rate = spread_rate;
                        }
                    }
                }
                _ => {}
            }
        }

        let changed = transitions.len();
        for (i, transition) in transitions {
            let cell = grid.cell_mut(i);
            match transition {
                Transition::Ignite => cell.fire_state = FireState::Burning,
                Transition::Survive => cell.fire_state = FireState::Survived,
                Transition::BurnOut(burn_index) => {
                    cell.fire_state = FireState::Burnt;
                    cell.fire_history.push(BurnRecord { time, burn_index });
                    let zone = cell.zone_idx;
                    self.burned_cells_in_zone[zone] += 1;
                }
            }
        }
        for (i, update) in pending.into_iter().enumerate() {
            if let Some(update) = update {
                let cell = grid.cell_mut(i);
                cell.ignition_time = update.ignition_time;
                cell.burn_time = update.burn_time;
                cell.spread_rate = update.spread_rate;
                cell.fire_idx = update.fire_idx;
            }
        }

        self.fire_did_stop = !grid.cells().iter().any(Cell::is_burning_or_will_burn);
        debug!(
            "Fire step at {:.1} min: {} transitions, stopped = {}",
            time, changed, self.fire_did_stop
        );
    }
}

/// Flood-fill the island containing `start` (direct neighbours) and clear it
fn remove_unburnt_island(grid: &mut Grid, start: usize) {
    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let mut queue = VecDeque::new();
    grid.cell_mut(start).is_unburnt_island = false;
    queue.push_back(start);
    while let Some(idx) = queue.pop_front() {
        let (x, y) = grid.coords(idx);
        for (dx, dy) in DIRECT_NEIGHBOURS {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || nx >= width || ny < 0 || ny >= height {
                continue;
            }
            let n = grid.index(nx as usize, ny as usize);
            let cell = grid.cell_mut(n);
            if cell.is_unburnt_island {
                cell.is_unburnt_island = false;
                queue.push_back(n);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{DroughtLevel, TerrainType, Vegetation, DAY_IN_MINUTES};
    use crate::grid::{TerrainInput, Zone};

    fn scenario_config(vegetation: Vegetation) -> SimulationConfig {
        SimulationConfig {
            model_width: 100_000.0,
            model_height: 100_000.0,
            grid_width: 5,
            min_cell_burn_time: 200.0,
            neighbors_dist: 2.5,
            fire_survival_probability: 1.0,
            fill_terrain_edges: false,
            zones: vec![Zone::new(
                vegetation,
                TerrainType::Foothills,
                DroughtLevel::MildDrought,
            )],
            zone_index: None,
            ..SimulationConfig::default()
        }
    }

    fn scenario(vegetation: Vegetation, terrain: &TerrainInput) -> (Grid, FireEngine) {
        let config = scenario_config(vegetation);
        let mut grid = Grid::new(&config, terrain);
        let engine = FireEngine::new(&mut grid, Wind::calm(), (&config).into(), 0.0);
        (grid, engine)
    }

    fn center_spark() -> [Vector2<f64>; 1] {
        [Vector2::new(50_000.0, 50_000.0)]
    }

    fn burning_or_pending(grid: &Grid) -> usize {
        grid.cells()
            .iter()
            .filter(|c| c.is_burning_or_will_burn())
            .count()
    }

    #[test]
    fn test_low_intensity_fire_ends_by_day_five() {
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &TerrainInput::flat());
        let mut rng = SimRng::seeded(3);
        engine.set_sparks(&mut grid, &center_spark());
        assert!(engine.fires().iter().all(|f| !f.end_of_low_intensity_fire));
        engine.update_fire(&mut grid, DAY_IN_MINUTES * 5.0, &mut rng);
        assert!(engine.fires().iter().all(|f| f.end_of_low_intensity_fire));
    }

    #[test]
    fn test_detects_when_nothing_burns() {
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &TerrainInput::flat());
        let mut rng = SimRng::seeded(3);
        engine.set_sparks(&mut grid, &center_spark());
        engine.update_fire(&mut grid, DAY_IN_MINUTES * 5.0, &mut rng);
        assert!(!engine.fire_did_stop());
        assert!(burning_or_pending(&grid) > 0);
        engine.update_fire(&mut grid, DAY_IN_MINUTES * 6.0, &mut rng);
        engine.update_fire(&mut grid, DAY_IN_MINUTES * 7.0, &mut rng);
        assert_eq!(burning_or_pending(&grid), 0);
        assert!(engine.fire_did_stop());
        // Every reached cell was low intensity and survival is certain.
        assert!(grid.cells().iter().all(|c| c.fire_state != FireState::Burnt));
        assert!(grid
            .cells()
            .iter()
            .any(|c| c.fire_state == FireState::Survived));
    }

    #[test]
    fn test_spark_clears_unburnt_island() {
        let terrain = TerrainInput {
            unburnt_island: Some(vec![true; 25]),
            ..TerrainInput::flat()
        };
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &terrain);
        assert!(grid.cells().iter().all(|c| c.is_unburnt_island));
        engine.set_sparks(&mut grid, &center_spark());
        assert!(grid.cells().iter().all(|c| !c.is_unburnt_island));
        engine.update_fire(&mut grid, DAY_IN_MINUTES, &mut SimRng::seeded(1));
        assert!(burning_or_pending(&grid) > 0);
    }

    #[test]
    fn test_island_elsewhere_is_kept() {
        let mut islands = vec![false; 25];
        islands[0] = true;
        islands[1] = true;
        let terrain = TerrainInput {
            unburnt_island: Some(islands),
            ..TerrainInput::flat()
        };
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &terrain);
        engine.set_sparks(&mut grid, &center_spark());
        assert!(grid.cell(0).is_unburnt_island);
        assert!(grid.cell(1).is_unburnt_island);
    }

    #[test]
    fn test_every_vegetation_produces_survivors() {
        for vegetation in Vegetation::ALL {
            let (mut grid, mut engine) = scenario(vegetation, &TerrainInput::flat());
            let mut rng = SimRng::seeded(11);
            engine.set_sparks(&mut grid, &center_spark());
            let survivors = |g: &Grid| {
                g.cells()
                    .iter()
                    .filter(|c| c.fire_state == FireState::Survived)
                    .count()
            };
            assert_eq!(survivors(&grid), 0);
            for _ in 0..3 {
                engine.update_fire(&mut grid, DAY_IN_MINUTES, &mut rng);
            }
            assert!(survivors(&grid) > 0, "{vegetation:?} produced no survivors");
        }
    }

    #[test]
    fn test_spread_reads_pre_sweep_state() {
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &TerrainInput::flat());
        let mut rng = SimRng::seeded(5);
        engine.set_sparks(&mut grid, &center_spark());
        // A single sweep only ignites the spark cell; neighbours are scheduled.
        engine.update_fire(&mut grid, 1.0, &mut rng);
        let burning = grid
            .cells()
            .iter()
            .filter(|c| c.fire_state == FireState::Burning)
            .count();
        assert_eq!(burning, 1);
        let scheduled = grid
            .cells()
            .iter()
            .filter(|c| c.fire_state == FireState::Unburnt && c.ignition_time.is_finite())
            .count();
        assert_eq!(scheduled, 20);
    }

    #[test]
    fn test_resume_rebuilds_fire_in_progress() {
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &TerrainInput::flat());
        let mut rng = SimRng::seeded(5);
        engine.set_sparks(&mut grid, &center_spark());
        engine.update_fire(&mut grid, 1.0, &mut rng);

        let config = scenario_config(Vegetation::Grass);
        let mut resumed = FireEngine::resume(&grid, Wind::calm(), (&config).into(), 1.0);
        assert_eq!(resumed.fires().len(), 1);
        assert_eq!(resumed.fires()[0].start_time, 0.0);
        assert!(!resumed.fire_did_stop());

        for day in 1..=10 {
            resumed.update_fire(&mut grid, DAY_IN_MINUTES * f64::from(day), &mut rng);
        }
        assert!(resumed.fire_did_stop());
        assert_eq!(burning_or_pending(&grid), 0);
    }

    #[test]
    fn test_burn_time_never_exceeds_max() {
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &TerrainInput::flat());
        engine.set_sparks(&mut grid, &center_spark());
        engine.update_fire(&mut grid, 1.0, &mut SimRng::seeded(5));
        assert!(grid.cells().iter().all(|c| c.burn_time <= 500.0));
    }

    #[test]
    fn test_off_grid_spark_is_ignored() {
        let (mut grid, mut engine) = scenario(Vegetation::Grass, &TerrainInput::flat());
        let placed = engine.set_sparks(&mut grid, &[Vector2::new(-10.0, 5.0)]);
        assert_eq!(placed, 0);
        assert!(engine.fires().is_empty());
        assert!(engine.fire_did_stop());
    }

    #[test]
    fn test_high_intensity_burns_record_history() {
        let config = SimulationConfig {
            fire_survival_probability: 1.0,
            ..scenario_config(Vegetation::Grass)
        };
        let mut grid = Grid::new(&config, &TerrainInput::flat());
        let mut engine = FireEngine::new(&mut grid, Wind::new(20.0, 0.0), (&config).into(), 0.0);
        let mut rng = SimRng::seeded(9);
        engine.set_sparks(&mut grid, &center_spark());
        for day in 1..=10 {
            engine.update_fire(&mut grid, DAY_IN_MINUTES * f64::from(day), &mut rng);
        }
        let burnt: Vec<_> = grid
            .cells()
            .iter()
            .filter(|c| c.fire_state == FireState::Burnt)
            .collect();
        assert!(!burnt.is_empty());
        assert!(burnt
            .iter()
            .all(|c| c.fire_history.len() == 1 && c.fire_history[0].burn_index != BurnIndex::Low));
        assert_eq!(engine.burned_cells_in_zone()[0], burnt.len());
    }
}
