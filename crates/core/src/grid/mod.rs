//! Cell grid, zones and neighbour topology
//!
//! Cells are stored row-major (`y * width + x`) with `y` growing northwards.
//! Both engines operate on a `&mut Grid`; the grid owns the zone table that
//! cells reference by index.

pub mod cell;
pub mod terrain;
pub mod topology;
pub mod zone;

pub use cell::{BurnRecord, Cell, FireLine, FIRE_LINE_DEPTH};
pub use terrain::TerrainInput;
pub use topology::{grid_cell_neighbours, line_cells, nonburnable_cell_between, within_dist};
pub use zone::Zone;

use crate::config::SimulationConfig;
use crate::core_types::{BurnIndex, BurnIndexThresholds, PerVegetation, Vegetation};
use crate::physics::{moisture_content, FuelSite};
use nalgebra::Vector2;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cell_size: f64,
    cells: Vec<Cell>,
    zones: Vec<Zone>,
    burn_index_thresholds: PerVegetation<BurnIndexThresholds>,
    carbon_cap: PerVegetation<f64>,
    max_cell_burn_time: f64,
}

impl Grid {
    /// Build cells for every grid position from `terrain`
    ///
    /// Zone indices outside the configured zone table fall back to zone 0.
    pub fn new(config: &SimulationConfig, terrain: &TerrainInput) -> Self {
        let width = config.grid_width;
        let height = config.grid_height();
        let zones = config.zones.clone();
        let carbon_cap = config.succession.carbon_cap;
        let mut bad_zone_refs = 0usize;

        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let mut zone_idx = terrain.zone_at(idx);
                if zone_idx >= zones.len() {
                    bad_zone_refs += 1;
                    zone_idx = 0;
                }
                let vegetation = zones[zone_idx].vegetation;
                let mut cell = Cell::new(x, y, zone_idx, vegetation);

                let outer_ring = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                let inner_ring = x <= 1 || y <= 1 || x + 2 >= width || y + 2 >= height;
                let fill_edges = config.fill_terrain_edges;

                cell.base_elevation = if fill_edges && outer_ring {
                    0.0
                } else {
                    terrain.elevation_at(idx)
                };
                cell.is_river = terrain.river_at(idx);
                cell.is_edge = fill_edges && inner_ring;
                cell.base_unburnt_island = terrain.island_at(idx);
                cell.is_unburnt_island = cell.base_unburnt_island;
                cell.carbon = *carbon_cap.get(vegetation);
                cell.burn_time = config.max_cell_burn_time;
                cells.push(cell);
            }
        }
        if bad_zone_refs > 0 {
            warn!(
                "{} cells referenced a missing zone and were assigned zone 0",
                bad_zone_refs
            );
        }

        Self {
            width,
            height,
            cell_size: config.cell_size(),
            cells,
            zones,
            burn_index_thresholds: config.burn_index_thresholds,
            carbon_cap,
            max_cell_burn_time: config.max_cell_burn_time,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell edge length (ft)
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    #[inline]
    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    #[inline]
    pub fn cell_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[inline]
    pub fn zone_of(&self, idx: usize) -> &Zone {
        &self.zones[self.cells[idx].zone_idx]
    }

    /// Apply one drought level to every zone
    pub fn set_drought_level(&mut self, level: f64) {
        for zone in &mut self.zones {
            zone.drought_level = level;
        }
    }

    pub fn set_zone_drought_levels(&mut self, levels: &[f64]) {
        for (zone, &level) in self.zones.iter_mut().zip(levels) {
            zone.drought_level = level;
        }
    }

    /// Cell containing a point in model feet, `None` off-grid
    pub fn cell_at(&self, position: Vector2<f64>) -> Option<usize> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let x = (position.x / self.cell_size).floor() as usize;
        let y = (position.y / self.cell_size).floor() as usize;
        (x < self.width && y < self.height).then(|| self.index(x, y))
    }

    /// Centre of a cell in model feet
    pub fn cell_center(&self, idx: usize) -> Vector2<f64> {
        let (x, y) = self.coords(idx);
        Vector2::new(
            (x as f64 + 0.5) * self.cell_size,
            (y as f64 + 0.5) * self.cell_size,
        )
    }

    /// Zone drought lowered by suppression drops, never below no drought
    pub fn drought_level(&self, idx: usize) -> f64 {
        let cell = &self.cells[idx];
        (self.zone_of(idx).drought_level - f64::from(cell.helitack_drop_count)).max(0.0)
    }

    /// Fuel moisture fraction; infinite for cells that cannot burn
    pub fn moisture_content(&self, idx: usize) -> f64 {
        let cell = &self.cells[idx];
        if cell.is_nonburnable() {
            return f64::INFINITY;
        }
        moisture_content(cell.vegetation(), self.drought_level(idx))
    }

    pub fn burn_index(&self, idx: usize) -> BurnIndex {
        let cell = &self.cells[idx];
        self.burn_index_thresholds
            .get(cell.vegetation())
            .classify(cell.spread_rate)
    }

    pub fn fuel_site(&self, idx: usize) -> FuelSite {
        let cell = &self.cells[idx];
        FuelSite {
            x: cell.x as f64,
            y: cell.y as f64,
            elevation: cell.elevation(),
            vegetation: cell.vegetation(),
            moisture: self.moisture_content(idx),
        }
    }

    #[inline]
    pub fn carbon_cap(&self, vegetation: Vegetation) -> f64 {
        *self.carbon_cap.get(vegetation)
    }

    #[inline]
    pub fn max_cell_burn_time(&self) -> f64 {
        self.max_cell_burn_time
    }

    /// Number of cells in each zone
    pub fn cell_count_by_zone(&self) -> Vec<usize> {
        let mut counts = vec![0; self.zones.len()];
        for cell in &self.cells {
            counts[cell.zone_idx] += 1;
        }
        counts
    }

    /// Reset every cell to its zone defaults
    pub fn reset(&mut self) {
        let max_burn = self.max_cell_burn_time;
        for cell in &mut self.cells {
            let vegetation = self.zones[cell.zone_idx].vegetation;
            cell.reset(vegetation, *self.carbon_cap.get(vegetation), max_burn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::TerrainType;

    fn small_config(width: usize) -> SimulationConfig {
        SimulationConfig {
            model_width: width as f64 * 100.0,
            model_height: width as f64 * 100.0,
            grid_width: width,
            fill_terrain_edges: false,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_cell_at_maps_feet_to_cells() {
        let grid = Grid::new(&small_config(4), &TerrainInput::flat());
        assert_eq!(grid.cell_at(Vector2::new(0.0, 0.0)), Some(0));
        assert_eq!(grid.cell_at(Vector2::new(150.0, 250.0)), Some(9));
        assert_eq!(grid.cell_at(Vector2::new(400.0, 0.0)), None);
        assert_eq!(grid.cell_at(Vector2::new(-1.0, 0.0)), None);
    }

    #[test]
    fn test_edges_filled() {
        let config = SimulationConfig {
            fill_terrain_edges: true,
            ..small_config(6)
        };
        let terrain = TerrainInput {
            elevation: Some(vec![10.0; 36]),
            ..TerrainInput::flat()
        };
        let grid = Grid::new(&config, &terrain);
        assert_eq!(grid.cell(0).base_elevation, 0.0);
        assert_eq!(grid.cell(grid.index(1, 1)).base_elevation, 10.0);
        assert!(grid.cell(grid.index(1, 3)).is_nonburnable());
        assert!(!grid.cell(grid.index(2, 3)).is_nonburnable());
        assert!(grid.cell(grid.index(4, 3)).is_nonburnable());
    }

    #[test]
    fn test_missing_zone_falls_back_to_zero() {
        let terrain = TerrainInput {
            zone_index: Some(vec![1, 9, 0, 0]),
            ..TerrainInput::flat()
        };
        let grid = Grid::new(&small_config(2), &terrain);
        assert_eq!(grid.cell(0).zone_idx, 1);
        assert_eq!(grid.cell(1).zone_idx, 0);
        assert_eq!(grid.cell_count_by_zone(), vec![3, 1]);
    }

    #[test]
    fn test_helitack_drops_lower_drought() {
        let mut config = small_config(2);
        config.zones = vec![Zone::new(
            Vegetation::Grass,
            TerrainType::Plains,
            crate::core_types::DroughtLevel::MediumDrought,
        )];
        config.zone_index = None;
        let mut grid = Grid::new(&config, &TerrainInput::flat());
        assert_eq!(grid.drought_level(0), 2.0);
        grid.cell_mut(0).helitack_drop_count = 1;
        assert_eq!(grid.drought_level(0), 1.0);
        grid.cell_mut(0).helitack_drop_count = 5;
        assert_eq!(grid.drought_level(0), 0.0);
        assert_eq!(grid.moisture_content(0), 0.1275);
    }

    #[test]
    fn test_nonburnable_moisture_is_infinite() {
        let mut grid = Grid::new(&small_config(2), &TerrainInput::flat());
        grid.cell_mut(0).is_river = true;
        assert!(grid.moisture_content(0).is_infinite());
    }

    #[test]
    fn test_reset_restores_zone_vegetation() {
        let mut grid = Grid::new(&small_config(2), &TerrainInput::flat());
        grid.cell_mut(0).set_vegetation(Vegetation::ConiferousForest);
        grid.cell_mut(0).carbon = 0.0;
        grid.reset();
        assert_eq!(grid.cell(0).vegetation(), Vegetation::Grass);
        assert_eq!(grid.cell(0).carbon, 0.068);
    }
}
