//! Yearly vegetation and carbon statistics

use crate::core_types::{FireState, Vegetation};
use crate::grid::Grid;
use serde::{Deserialize, Serialize};

const FEET_TO_METRES: f64 = 0.3048;
const KG_PER_TONNE: f64 = 1000.0;

/// Share of landscape cells per vegetation, plus the burnt share
///
/// Rivers and terrain edges are not landscape. Burnt cells count only as
/// burned, so the five fractions sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VegetationStatistics {
    pub grass: f64,
    pub shrub: f64,
    pub deciduous_forest: f64,
    pub coniferous_forest: f64,
    pub burned: f64,
}

impl VegetationStatistics {
    pub fn from_grid(grid: &Grid) -> Self {
        let mut counts = [0usize; 5];
        for cell in grid.cells() {
            if cell.is_river || cell.is_edge {
                continue;
            }
            let slot = if cell.fire_state == FireState::Burnt {
                4
            } else {
                cell.vegetation().index()
            };
            counts[slot] += 1;
        }
        let total: usize = counts.iter().sum();
        if total == 0 {
            return Self::default();
        }
        let share = |n: usize| n as f64 / total as f64;
        Self {
            grass: share(counts[0]),
            shrub: share(counts[1]),
            deciduous_forest: share(counts[2]),
            coniferous_forest: share(counts[3]),
            burned: share(counts[4]),
        }
    }

    pub fn fraction(&self, vegetation: Vegetation) -> f64 {
        match vegetation {
            Vegetation::Grass => self.grass,
            Vegetation::Shrub => self.shrub,
            Vegetation::DeciduousForest => self.deciduous_forest,
            Vegetation::ConiferousForest => self.coniferous_forest,
        }
    }

    /// Every fraction within `tolerance` of `other`
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let pairs = [
            (self.grass, other.grass),
            (self.shrub, other.shrub),
            (self.deciduous_forest, other.deciduous_forest),
            (self.coniferous_forest, other.coniferous_forest),
            (self.burned, other.burned),
        ];
        pairs.iter().all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// Carbon stored over the whole grid (tonnes)
pub fn total_carbon(grid: &Grid) -> f64 {
    let cell_area_m2 = (grid.cell_size() * FEET_TO_METRES).powi(2);
    let kg: f64 = grid.cells().iter().map(|c| c.carbon).sum::<f64>() * cell_area_m2;
    kg / KG_PER_TONNE
}

/// Statistics recorded when a simulated year begins
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YearlyStats {
    pub year: u32,
    pub vegetation: VegetationStatistics,
    /// Tonnes
    pub total_carbon: f64,
}

impl YearlyStats {
    pub fn collect(grid: &Grid, year: u32) -> Self {
        Self {
            year,
            vegetation: VegetationStatistics::from_grid(grid),
            total_carbon: total_carbon(grid),
        }
    }
}
