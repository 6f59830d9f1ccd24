//! Per-cell fire and vegetation state

use crate::core_types::{BurnIndex, FireState, Vegetation, YEAR_IN_MINUTES};
use serde::{Deserialize, Serialize};

/// Depth (ft) a built fire line lowers the terrain, so renderers show the trench
pub const FIRE_LINE_DEPTH: f64 = 2000.0;

/// One entry of a cell's append-only fire history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRecord {
    /// Simulation time (minutes) the cell finished burning
    pub time: f64,
    pub burn_index: BurnIndex,
}

/// Fire break state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FireLine {
    #[default]
    None,
    /// Placed during an active fire; blocks nothing until `ready_at`
    UnderConstruction { ready_at: f64 },
    Built,
}

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)] // Independent terrain flags
pub struct Cell {
    pub x: usize,
    pub y: usize,
    /// Index into the grid's zone table
    pub zone_idx: usize,
    pub base_elevation: f64,
    pub is_river: bool,
    /// Border ring excluded from burning
    pub is_edge: bool,
    pub is_unburnt_island: bool,
    pub(crate) base_unburnt_island: bool,

    vegetation: Vegetation,
    /// Years since the vegetation last changed
    pub vegetation_age: u32,

    pub fire_state: FireState,
    /// Minutes; infinite until the cell is reached by fire
    pub ignition_time: f64,
    /// Minutes the cell keeps burning once ignited
    pub burn_time: f64,
    /// Highest incoming spread rate (ft/min)
    pub spread_rate: f64,
    /// Fire record that reached this cell first
    pub fire_idx: Option<usize>,

    /// Stored carbon (kg/m²)
    pub carbon: f64,
    pub fire_history: Vec<BurnRecord>,
    pub fire_line: FireLine,
    pub helitack_drop_count: u32,
}

impl Cell {
    pub fn new(x: usize, y: usize, zone_idx: usize, vegetation: Vegetation) -> Self {
        Self {
            x,
            y,
            zone_idx,
            base_elevation: 0.0,
            is_river: false,
            is_edge: false,
            is_unburnt_island: false,
            base_unburnt_island: false,
            vegetation,
            vegetation_age: 0,
            fire_state: FireState::Unburnt,
            ignition_time: f64::INFINITY,
            burn_time: 0.0,
            spread_rate: 0.0,
            fire_idx: None,
            carbon: 0.0,
            fire_history: Vec::new(),
            fire_line: FireLine::None,
            helitack_drop_count: 0,
        }
    }

    #[inline]
    pub fn vegetation(&self) -> Vegetation {
        self.vegetation
    }

    /// Change vegetation; the new stage starts at age 0
    pub fn set_vegetation(&mut self, vegetation: Vegetation) {
        self.vegetation = vegetation;
        self.vegetation_age = 0;
    }

    /// Restore vegetation and age together, e.g. from a snapshot
    pub(crate) fn restore_vegetation(&mut self, vegetation: Vegetation, age: u32) {
        self.vegetation = vegetation;
        self.vegetation_age = age;
    }

    /// Elevation including any built fire line trench
    #[inline]
    pub fn elevation(&self) -> f64 {
        if self.fire_line == FireLine::Built {
            self.base_elevation - FIRE_LINE_DEPTH
        } else {
            self.base_elevation
        }
    }

    /// Rivers, edges and active islands never burn
    #[inline]
    pub fn is_nonburnable(&self) -> bool {
        self.is_river || self.is_edge || self.is_unburnt_island
    }

    /// Built fire lines stop everything below high intensity
    #[inline]
    pub fn is_burnable_for(&self, burn_index: BurnIndex) -> bool {
        !self.is_nonburnable() && (self.fire_line != FireLine::Built || burn_index == BurnIndex::High)
    }

    #[inline]
    pub fn is_burning_or_will_burn(&self) -> bool {
        self.fire_state == FireState::Burning
            || (self.fire_state == FireState::Unburnt && self.ignition_time.is_finite())
    }

    /// Clear per-fire bookkeeping before a new fire event
    pub fn pre_fire_event_reset(&mut self, max_burn_time: f64) {
        self.ignition_time = f64::INFINITY;
        self.spread_rate = 0.0;
        self.burn_time = max_burn_time;
        self.fire_idx = None;
    }

    /// Return the cell to its freshly loaded state
    pub fn reset(&mut self, vegetation: Vegetation, carbon: f64, max_burn_time: f64) {
        self.pre_fire_event_reset(max_burn_time);
        self.fire_state = FireState::Unburnt;
        self.is_unburnt_island = self.base_unburnt_island;
        self.set_vegetation(vegetation);
        self.carbon = carbon;
        self.fire_history.clear();
        self.fire_line = FireLine::None;
        self.helitack_drop_count = 0;
    }

    pub fn last_fire(&self) -> Option<&BurnRecord> {
        self.fire_history.last()
    }

    /// Whether `count` fires within `window_years` happened, the latest of them
    /// no more than `lockout_years` before `time`
    pub fn repeated_burn_active(
        &self,
        count: usize,
        window_years: f64,
        lockout_years: f64,
        time: f64,
    ) -> bool {
        if count == 0 || self.fire_history.len() < count {
            return false;
        }
        let window = window_years * YEAR_IN_MINUTES;
        let lockout = lockout_years * YEAR_IN_MINUTES;
        self.fire_history.windows(count).any(|burns| {
            let first = burns[0].time;
            let last = burns[count - 1].time;
            last - first <= window && time - last <= lockout
        })
    }
}
