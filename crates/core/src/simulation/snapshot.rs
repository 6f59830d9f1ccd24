//! Sparse simulation snapshots for timeline scrubbing
//!
//! The manager listens to orchestrator events and records full-state
//! snapshots at start, stop, fire-event end and every `snapshot_interval`
//! regrowth years. Per-cell state lives in an append-only arena of immutable
//! `Arc<[CellSnapshot]>` buffers; consecutive regrowth years whose
//! vegetation statistics match share one buffer.

use super::events::{SimulationEvent, SimulationObserver};
use super::inputs::Spark;
use super::statistics::YearlyStats;
use super::{Phase, Simulation};
use crate::config::SimulationConfig;
use crate::core_types::time::{years, years_f64};
use crate::core_types::{FireState, Vegetation, Wind, YEAR_IN_MINUTES};
use crate::grid::{BurnRecord, Cell, FireLine, Grid};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything needed to put one cell back the way it was
#[derive(Debug, Clone, PartialEq)]
pub struct CellSnapshot {
    pub fire_state: FireState,
    pub vegetation: Vegetation,
    pub vegetation_age: u32,
    pub carbon: f64,
    pub fire_history: Vec<BurnRecord>,
    pub ignition_time: f64,
    pub burn_time: f64,
    pub spread_rate: f64,
    pub fire_idx: Option<usize>,
    pub is_unburnt_island: bool,
    pub fire_line: FireLine,
    pub helitack_drop_count: u32,
}

impl CellSnapshot {
    pub fn capture(cell: &Cell) -> Self {
        Self {
            fire_state: cell.fire_state,
            vegetation: cell.vegetation(),
            vegetation_age: cell.vegetation_age,
            carbon: cell.carbon,
            fire_history: cell.fire_history.clone(),
            ignition_time: cell.ignition_time,
            burn_time: cell.burn_time,
            spread_rate: cell.spread_rate,
            fire_idx: cell.fire_idx,
            is_unburnt_island: cell.is_unburnt_island,
            fire_line: cell.fire_line,
            helitack_drop_count: cell.helitack_drop_count,
        }
    }

    pub fn apply(&self, cell: &mut Cell) {
        cell.fire_state = self.fire_state;
        cell.restore_vegetation(self.vegetation, self.vegetation_age);
        cell.carbon = self.carbon;
        cell.fire_history.clone_from(&self.fire_history);
        cell.ignition_time = self.ignition_time;
        cell.burn_time = self.burn_time;
        cell.spread_rate = self.spread_rate;
        cell.fire_idx = self.fire_idx;
        cell.is_unburnt_island = self.is_unburnt_island;
        cell.fire_line = self.fire_line;
        cell.helitack_drop_count = self.helitack_drop_count;
    }
}

/// Capture every cell of `grid`
pub fn capture_cells(grid: &Grid) -> Arc<[CellSnapshot]> {
    grid.cells().iter().map(CellSnapshot::capture).collect()
}

/// What triggered a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Start,
    /// Taken on stop; dropped when the run resumes
    Stop,
    Year,
    FireEventEnded,
}

/// Index of a per-cell buffer in the manager's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub kind: SnapshotKind,
    pub time: f64,
    /// Fire lattice position, behind `time` when a fire was stopped mid-step
    pub fire_clock: f64,
    pub drought_levels: Vec<f64>,
    pub wind: Wind,
    pub sparks: Vec<Spark>,
    pub stats: YearlyStats,
    pub provisional: bool,
    buffer: BufferId,
}

impl Snapshot {
    /// Fractional simulated year
    pub fn year(&self) -> f64 {
        years_f64(self.time)
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    buffers: Vec<Arc<[CellSnapshot]>>,
    interval: u32,
    stats_tolerance: f64,
    /// A restore moved the simulation behind the latest snapshot
    scrubbed: bool,
}

impl SnapshotManager {
    pub fn new(interval: u32, stats_tolerance: f64) -> Self {
        Self {
            snapshots: Vec::new(),
            buffers: Vec::new(),
            interval: interval.max(1),
            stats_tolerance,
            scrubbed: false,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.snapshot_interval, config.snapshot_stats_tolerance)
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of distinct per-cell buffers stored
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn cells(&self, snapshot: &Snapshot) -> &[CellSnapshot] {
        &self.buffers[snapshot.buffer.0]
    }

    /// Furthest simulated year covered by a snapshot
    pub fn max_year(&self) -> f64 {
        self.snapshots.iter().map(Snapshot::year).fold(0.0, f64::max)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.buffers.clear();
        self.scrubbed = false;
    }

    /// Record the current simulation state
    ///
    /// Returns `false` when no terrain is loaded. Regrowth year snapshots
    /// reuse the previous snapshot's buffer when vegetation statistics match.
    /// While cells are burning only [`SnapshotKind::Stop`] is recorded.
    pub fn take_snapshot(&mut self, simulation: &Simulation, kind: SnapshotKind) -> bool {
        let Some(grid) = simulation.grid() else {
            return false;
        };
        let provisional = kind == SnapshotKind::Stop;
        if !provisional && grid.cells().iter().any(Cell::is_burning_or_will_burn) {
            // Only stop snapshots may hold a fire in progress.
            debug!("Skipped {:?} snapshot during an active fire", kind);
            return true;
        }
        let time = simulation.time();
        let stats = YearlyStats::collect(grid, years(time));
        let position = self.snapshots.partition_point(|s| s.time <= time);
        let same_time = position > 0 && self.snapshots[position - 1].time == time;

        if same_time && provisional && !self.snapshots[position - 1].provisional {
            // A real snapshot already covers this moment.
            return true;
        }

        let previous = position.checked_sub(1).map(|p| &self.snapshots[p]);
        let shared = match previous {
            Some(prev) if kind == SnapshotKind::Year && prev.kind == SnapshotKind::Year => stats
                .vegetation
                .approx_eq(&prev.stats.vegetation, self.stats_tolerance)
                .then_some(prev.buffer),
            _ => None,
        };
        let buffer = shared.unwrap_or_else(|| {
            self.buffers.push(capture_cells(grid));
            BufferId(self.buffers.len() - 1)
        });

        let mut sparks = simulation.sparks().to_vec();
        if kind == SnapshotKind::FireEventEnded {
            if let Some(event) = simulation.fire_events().last() {
                for spark in &event.sparks {
                    if !sparks.contains(spark) {
                        sparks.push(*spark);
                    }
                }
            }
        }

        let snapshot = Snapshot {
            kind,
            time,
            fire_clock: simulation.fire_clock(),
            drought_levels: simulation.drought_levels(),
            wind: simulation.wind(),
            sparks,
            stats,
            provisional,
            buffer,
        };
        if same_time {
            let replaced = &mut self.snapshots[position - 1];
            let mut snapshot = snapshot;
            if snapshot.sparks.is_empty() {
                snapshot.sparks = std::mem::take(&mut replaced.sparks);
            }
            *replaced = snapshot;
        } else {
            self.snapshots.insert(position, snapshot);
        }
        debug!(
            "{:?} snapshot at year {:.2} (buffer {}, shared = {})",
            kind,
            years_f64(time),
            buffer.0,
            shared.is_some()
        );
        true
    }

    /// Index of the snapshot nearest to `year`, at or before it when possible
    fn nearest_index(&self, year: f64) -> Option<usize> {
        if self.snapshots.is_empty() {
            return None;
        }
        let target = year * YEAR_IN_MINUTES;
        let at_or_before = self.snapshots.partition_point(|s| s.time <= target);
        Some(at_or_before.saturating_sub(1))
    }

    pub fn nearest(&self, year: f64) -> Option<&Snapshot> {
        self.nearest_index(year).map(|i| &self.snapshots[i])
    }

    /// Restore the snapshot nearest to `year`; `false` when there are none
    pub fn restore(&mut self, simulation: &mut Simulation, year: f64) -> bool {
        let Some(index) = self.nearest_index(year) else {
            return false;
        };
        self.restore_index(simulation, index);
        self.scrubbed = index + 1 < self.snapshots.len();
        true
    }

    pub fn restore_latest(&mut self, simulation: &mut Simulation) -> bool {
        if self.snapshots.is_empty() {
            return false;
        }
        self.restore_index(simulation, self.snapshots.len() - 1);
        self.scrubbed = false;
        true
    }

    fn restore_index(&self, simulation: &mut Simulation, index: usize) {
        let snapshot = &self.snapshots[index];
        info!(
            "Restoring {:?} snapshot at year {:.2}",
            snapshot.kind,
            snapshot.year()
        );
        simulation.restore_snapshot(snapshot, self.cells(snapshot));
    }

    /// Called before the run resumes
    ///
    /// After scrubbing backwards the latest known state is restored so known
    /// history is not recomputed. Provisional snapshots are then dropped.
    pub fn prepare_resume(&mut self, simulation: &mut Simulation) {
        if self.scrubbed {
            self.restore_latest(simulation);
        }
        let before = self.snapshots.len();
        self.snapshots.retain(|s| !s.provisional);
        if self.snapshots.len() != before {
            debug!("Dropped {} provisional snapshots", before - self.snapshots.len());
        }
        self.scrubbed = false;
    }
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl SimulationObserver for SnapshotManager {
    fn on_event(&mut self, event: SimulationEvent, simulation: &Simulation) {
        match event {
            SimulationEvent::Start => {
                self.take_snapshot(simulation, SnapshotKind::Start);
            }
            SimulationEvent::Stop => {
                self.take_snapshot(simulation, SnapshotKind::Stop);
            }
            SimulationEvent::YearChange => {
                let regrowing = matches!(simulation.phase(), Phase::Regrowth | Phase::Ended);
                if regrowing && years(simulation.time()) % self.interval == 0 {
                    self.take_snapshot(simulation, SnapshotKind::Year);
                }
            }
            SimulationEvent::FireEventEnded => {
                self.take_snapshot(simulation, SnapshotKind::FireEventEnded);
            }
            SimulationEvent::FireEventAdded if self.scrubbed => {
                // A new fire after scrubbing back starts a new timeline.
                let time = simulation.time();
                self.snapshots.retain(|s| s.time <= time);
                self.scrubbed = false;
                info!("Timeline truncated at year {:.2}", years_f64(time));
            }
            SimulationEvent::Restart => self.clear(),
            SimulationEvent::FireEventAdded
            | SimulationEvent::FireEventRemoved
            | SimulationEvent::SparkAdded => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{BurnIndex, DAY_IN_MINUTES};
    use crate::grid::TerrainInput;

    fn regrowing() -> Simulation {
        let config = SimulationConfig {
            model_width: 500.0,
            model_height: 500.0,
            grid_width: 5,
            zone_index: None,
            fill_terrain_edges: false,
            rng_seed: Some(2),
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(config).unwrap();
        simulation.load_terrain(&TerrainInput::flat());
        simulation.start();
        simulation
    }

    #[test]
    fn test_empty_timeline() {
        let mut manager = SnapshotManager::default();
        let mut simulation = regrowing();
        assert!(manager.nearest(3.0).is_none());
        assert!(!manager.restore(&mut simulation, 3.0));
        assert!(!manager.restore_latest(&mut simulation));
        assert_eq!(manager.max_year(), 0.0);
    }

    #[test]
    fn test_no_terrain_no_snapshot() {
        let mut manager = SnapshotManager::default();
        let simulation = Simulation::new(SimulationConfig::default()).unwrap();
        assert!(!manager.take_snapshot(&simulation, SnapshotKind::Start));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_same_time_replaces_latest() {
        let mut manager = SnapshotManager::default();
        let simulation = regrowing();
        manager.take_snapshot(&simulation, SnapshotKind::Start);
        manager.take_snapshot(&simulation, SnapshotKind::Year);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.snapshots()[0].kind, SnapshotKind::Year);
    }

    #[test]
    fn test_stop_snapshot_is_provisional() {
        let mut manager = SnapshotManager::default();
        let mut simulation = regrowing();
        manager.take_snapshot(&simulation, SnapshotKind::Year);
        manager.take_snapshot(&simulation, SnapshotKind::Stop);
        assert_eq!(manager.len(), 1);
        assert!(!manager.snapshots()[0].provisional);

        simulation.tick(DAY_IN_MINUTES);
        manager.take_snapshot(&simulation, SnapshotKind::Stop);
        assert_eq!(manager.len(), 2);
        assert!(manager.snapshots()[1].provisional);

        manager.prepare_resume(&mut simulation);
        assert_eq!(manager.len(), 1);
        assert_eq!(simulation.time(), DAY_IN_MINUTES);
    }

    #[test]
    fn test_cell_snapshot_round_trip() {
        let simulation = regrowing();
        let mut cell = simulation.grid().unwrap().cell(3).clone();
        let saved = CellSnapshot::capture(&cell);

        cell.fire_state = FireState::Burnt;
        cell.set_vegetation(Vegetation::Shrub);
        cell.carbon = 0.0;
        cell.fire_history.push(BurnRecord {
            time: 10.0,
            burn_index: BurnIndex::High,
        });
        cell.fire_line = FireLine::Built;
        cell.helitack_drop_count = 2;

        saved.apply(&mut cell);
        assert_eq!(&cell, simulation.grid().unwrap().cell(3));
    }
}
