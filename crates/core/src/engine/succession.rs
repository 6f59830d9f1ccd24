//! Yearly vegetation succession, recovery and carbon
//!
//! Runs once per simulated year. Each cell consumes exactly one random draw
//! per step, which decides whichever of its checks applies that year.
//! Neighbour checks read the vegetation from before the step.

use crate::config::SuccessionConfig;
use crate::core_types::{BurnIndex, FireState, SimRng, Vegetation, YEAR_IN_MINUTES};
use crate::grid::{Cell, Grid};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SuccessionEngine {
    config: SuccessionConfig,
}

/// Counts of what one yearly step changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuccessionReport {
    pub matured: usize,
    pub recovered: usize,
    pub demoted_to_grass: usize,
}

impl SuccessionEngine {
    pub fn new(config: SuccessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuccessionConfig {
        &self.config
    }

    /// Advance every cell by one year ending at `time` (minutes)
    pub fn update_vegetation(&self, grid: &mut Grid, time: f64, rng: &mut SimRng) -> SuccessionReport {
        let width = grid.width();
        let height = grid.height();
        let previous: Vec<Vegetation> = grid.cells().iter().map(Cell::vegetation).collect();
        let mut report = SuccessionReport::default();

        for idx in 0..grid.len() {
            let roll = rng.next_f64();
            let carbon_cap_before = grid.carbon_cap(grid.cell(idx).vegetation());
            let cell = grid.cell_mut(idx);

            match cell.fire_state {
                FireState::Burnt => {
                    cell.carbon = 0.0;
                    if self.try_recover(cell, time, roll, &mut report) {
                        continue;
                    }
                }
                FireState::Survived => {
                    cell.fire_state = FireState::Unburnt;
                    self.grow(cell, carbon_cap_before);
                    let vegetation = cell.vegetation();
                    if self.try_mature(cell, &previous, width, height, time, roll) {
                        debug!("Survivor cell {} matured from {:?}", idx, vegetation);
                        report.matured += 1;
                    }
                }
                FireState::Unburnt => {
                    self.grow(cell, carbon_cap_before);
                    if self.try_mature(cell, &previous, width, height, time, roll) {
                        report.matured += 1;
                    }
                }
                FireState::Burning => {}
            }
        }

        // Carbon caps follow the vegetation the cell ended the year with.
        for idx in 0..grid.len() {
            let cap = grid.carbon_cap(grid.cell(idx).vegetation());
            let cell = grid.cell_mut(idx);
            cell.carbon = cell.carbon.min(cap);
        }

        debug!(
            "Succession at year {:.0}: {} matured, {} recovered, {} demoted",
            time / YEAR_IN_MINUTES,
            report.matured,
            report.recovered,
            report.demoted_to_grass
        );
        report
    }

    /// Age the cell and accumulate carbon toward its cap
    fn grow(&self, cell: &mut Cell, carbon_cap: f64) {
        cell.vegetation_age = cell.vegetation_age.saturating_add(1);
        let rate = *self.config.carbon_accumulation_rate.get(cell.vegetation());
        cell.carbon = (cell.carbon + rate).min(carbon_cap);
    }

    /// Return a burnt cell to the unburnt pool once its wait has passed
    fn try_recover(&self, cell: &mut Cell, time: f64, roll: f64, report: &mut SuccessionReport) -> bool {
        let Some(last_fire) = cell.last_fire().copied() else {
            // Burnt without history only happens through hand-edited state.
            cell.fire_state = FireState::Unburnt;
            report.recovered += 1;
            return true;
        };
        let (wait_years, grass_probability) = match last_fire.burn_index {
            BurnIndex::High => (
                self.config.high_intensity_recovery_years,
                self.config.high_intensity_grass_probability,
            ),
            BurnIndex::Low | BurnIndex::Medium => (
                self.config.low_intensity_recovery_years,
                *self.config.low_intensity_grass_probability.get(cell.vegetation()),
            ),
        };
        if time - last_fire.time < f64::from(wait_years) * YEAR_IN_MINUTES {
            return false;
        }
        cell.fire_state = FireState::Unburnt;
        if roll < grass_probability {
            cell.set_vegetation(Vegetation::Grass);
            report.demoted_to_grass += 1;
        } else {
            // Regrowth starts over in the same vegetation.
            cell.vegetation_age = 0;
        }
        report.recovered += 1;
        true
    }

    /// Advance an unburnt cell to its next stage when old enough and lucky
    fn try_mature(
        &self,
        cell: &mut Cell,
        previous: &[Vegetation],
        width: usize,
        height: usize,
        time: f64,
        roll: f64,
    ) -> bool {
        let vegetation = cell.vegetation();
        let Some(next) = vegetation.next_stage() else {
            return false;
        };
        if cell.vegetation_age <= *self.config.min_age.get(vegetation) {
            return false;
        }
        let config = &self.config;
        let arrested = match vegetation {
            Vegetation::Shrub => cell.repeated_burn_active(
                3,
                config.triple_burn_window,
                config.triple_burn_lockout,
                time,
            ),
            Vegetation::DeciduousForest => cell.repeated_burn_active(
                2,
                config.double_burn_window,
                config.double_burn_lockout,
                time,
            ),
            Vegetation::Grass | Vegetation::ConiferousForest => false,
        };
        if arrested {
            return false;
        }
        let probability = if adjacent_stage_present(previous, width, height, cell.x, cell.y, next) {
            config.boosted_probability
        } else {
            config.base_probability
        };
        if roll < probability {
            cell.set_vegetation(next);
            return true;
        }
        false
    }
}

/// Whether any of the eight surrounding cells holds `stage` or a later one
fn adjacent_stage_present(
    vegetation: &[Vegetation],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    stage: Vegetation,
) -> bool {
    let x_range = x.saturating_sub(1)..=(x + 1).min(width - 1);
    for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
        for nx in x_range.clone() {
            if (nx, ny) != (x, y) && vegetation[ny * width + nx] >= stage {
                return true;
            }
        }
    }
    false
}
