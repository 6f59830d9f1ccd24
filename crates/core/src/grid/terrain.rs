//! Terrain input arrays
//!
//! The terrain source supplies flat, index-aligned arrays (`y * width + x`).
//! Any array may be missing or short; missing entries fall back to zone 0,
//! elevation 0 and no river or island.
//!
//! Presets describe terrain with small matrices instead. Those are upsampled
//! to the grid here: nearest sampling for categorical data, bilinear
//! interpolation for elevation. The first matrix row is the northern edge.

use crate::config::SimulationConfig;
use crate::core_types::SimRng;
use rustc_hash::FxHashMap;
use tracing::warn;

/// Index-aligned terrain arrays for one grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainInput {
    pub zone_index: Option<Vec<usize>>,
    /// Feet
    pub elevation: Option<Vec<f64>>,
    pub river: Option<Vec<bool>>,
    /// Active unburnt islands
    pub unburnt_island: Option<Vec<bool>>,
}

impl TerrainInput {
    /// Everything defaulted: zone 0, flat, no rivers or islands
    pub fn flat() -> Self {
        Self::default()
    }

    /// Build the arrays from the matrices in `config`
    ///
    /// Each distinct island id is activated once with
    /// `unburnt_island_probability`.
    pub fn from_config(config: &SimulationConfig, rng: &mut SimRng) -> Self {
        let width = config.grid_width;
        let height = config.grid_height();
        let islands = config
            .unburnt_islands
            .as_deref()
            .and_then(|m| upsample_nearest(m, width, height))
            .map(|ids| activate_islands(&ids, config.unburnt_island_probability, rng));

        Self {
            zone_index: config
                .zone_index
                .as_deref()
                .and_then(|m| upsample_nearest(m, width, height)),
            elevation: config
                .elevation
                .as_deref()
                .and_then(|m| upsample_bilinear(m, width, height)),
            river: config
                .river_data
                .as_deref()
                .and_then(|m| upsample_nearest(m, width, height))
                .map(|mask| mask.into_iter().map(|v| v > 0).collect()),
            unburnt_island: islands,
        }
    }

    #[inline]
    pub fn zone_at(&self, idx: usize) -> usize {
        self.zone_index
            .as_ref()
            .and_then(|v| v.get(idx))
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    pub fn elevation_at(&self, idx: usize) -> f64 {
        self.elevation
            .as_ref()
            .and_then(|v| v.get(idx))
            .copied()
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn river_at(&self, idx: usize) -> bool {
        self.river
            .as_ref()
            .and_then(|v| v.get(idx))
            .copied()
            .unwrap_or(false)
    }

    #[inline]
    pub fn island_at(&self, idx: usize) -> bool {
        self.unburnt_island
            .as_ref()
            .and_then(|v| v.get(idx))
            .copied()
            .unwrap_or(false)
    }
}

fn matrix_is_usable<T>(matrix: &[Vec<T>]) -> bool {
    if matrix.is_empty() || matrix.iter().any(Vec::is_empty) {
        warn!("Ignoring empty terrain matrix");
        return false;
    }
    true
}

/// Nearest-neighbour upsampling of a row-major matrix (first row north)
pub fn upsample_nearest<T: Copy>(matrix: &[Vec<T>], width: usize, height: usize) -> Option<Vec<T>> {
    if !matrix_is_usable(matrix) {
        return None;
    }
    let rows = matrix.len();
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &matrix[rows - 1 - (y * rows / height)];
        let cols = row.len();
        for x in 0..width {
            out.push(row[x * cols / width]);
        }
    }
    Some(out)
}

/// Position along an axis of `samples` values: (lower index, upper index, fraction)
fn axis_position(i: usize, cells: usize, samples: usize) -> (usize, usize, f64) {
    if samples < 2 || cells < 2 {
        return (0, 0, 0.0);
    }
    let t = i as f64 / (cells - 1) as f64 * (samples - 1) as f64;
    let lower = (t.floor() as usize).min(samples - 2);
    (lower, lower + 1, t - lower as f64)
}

/// Bilinear upsampling of a rectangular matrix (first row north)
///
/// Corner samples land exactly on corner cells, so a two-column matrix
/// produces a uniform slope across the grid.
pub fn upsample_bilinear(matrix: &[Vec<f64>], width: usize, height: usize) -> Option<Vec<f64>> {
    if !matrix_is_usable(matrix) {
        return None;
    }
    let rows = matrix.len();
    let cols = matrix[0].len();
    if matrix.iter().any(|row| row.len() != cols) {
        warn!("Ignoring ragged elevation matrix");
        return None;
    }
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        // Row 0 is north, grid y grows northwards.
        let (r0, r1, fy) = axis_position(height - 1 - y, height, rows);
        for x in 0..width {
            let (c0, c1, fx) = axis_position(x, width, cols);
            let top = matrix[r0][c0] * (1.0 - fx) + matrix[r0][c1] * fx;
            let bottom = matrix[r1][c0] * (1.0 - fx) + matrix[r1][c1] * fx;
            out.push(top * (1.0 - fy) + bottom * fy);
        }
    }
    Some(out)
}

/// Roll each distinct island id once and expand to per-cell activity
pub fn activate_islands(ids: &[u32], probability: f64, rng: &mut SimRng) -> Vec<bool> {
    let mut active: FxHashMap<u32, bool> = FxHashMap::default();
    ids.iter()
        .map(|&id| {
            if id == 0 {
                return false;
            }
            *active.entry(id).or_insert_with(|| rng.next_f64() < probability)
        })
        .collect()
}
