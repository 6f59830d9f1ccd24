//! Neighbour discovery and barrier-aware line of sight

use super::Grid;
use crate::core_types::BurnIndex;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Left, right, down, up
pub const DIRECT_NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Euclidean radius test with a small fudge so small radii round out on a
/// square lattice
#[inline]
pub fn within_dist(x0: usize, y0: usize, x1: usize, y1: usize, dist: f64) -> bool {
    let dx = x0 as f64 - x1 as f64;
    let dy = y0 as f64 - y1 as f64;
    dx * dx + dy * dy <= dist * dist + 0.5
}

/// Cells visited by Bresenham's line from `(x0, y0)` to `(x1, y1)`, both ends
/// included
///
/// The walk follows the major axis and starts with half a step of error, so
/// it is not symmetric: reversing the endpoints can pick different cells
/// where the line passes exactly between two of them.
pub fn line_cells(x0: usize, y0: usize, x1: usize, y1: usize) -> Vec<(usize, usize)> {
    let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let x_step = if x0 < x1 { 1 } else { -1 };
    let y_step = if y0 < y1 { 1 } else { -1 };
    // Doubled so the half-step start stays integral.
    let mut err = dx;
    let mut y = y0;
    let mut x = x0;
    let mut cells = Vec::with_capacity(dx as usize + 1);
    loop {
        let (px, py) = if steep { (y, x) } else { (x, y) };
        cells.push((px as usize, py as usize));
        if x == x1 {
            break;
        }
        err -= 2 * dy;
        if err < 0 {
            y += y_step;
            err += 2 * dx;
        }
        x += x_step;
    }
    cells
}

/// Whether the line between two cells crosses anything not burnable at
/// `burn_index`
pub fn nonburnable_cell_between(
    grid: &Grid,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    burn_index: BurnIndex,
) -> bool {
    line_cells(x0, y0, x1, y1)
        .into_iter()
        .any(|(x, y)| !grid.cell(grid.index(x, y)).is_burnable_for(burn_index))
}

/// Indices of cells within `dist` of `idx` that fire at `burn_index` can
/// reach, in ascending order
///
/// Breadth-first from the source through direct neighbours. Nonburnable
/// cells are never expanded; once one has been seen, every further candidate
/// also needs a clear line of sight back to the source.
pub fn grid_cell_neighbours(grid: &Grid, idx: usize, dist: f64, burn_index: BurnIndex) -> Vec<usize> {
    let (x0, y0) = grid.coords(idx);
    let width = grid.width() as isize;
    let height = grid.height() as isize;

    let mut neighbours = Vec::new();
    let mut processed: FxHashSet<usize> = FxHashSet::default();
    let mut queue = VecDeque::new();
    let mut any_nonburnable = false;

    processed.insert(idx);
    queue.push_back(idx);
    while let Some(current) = queue.pop_front() {
        let (cx, cy) = grid.coords(current);
        for (dx, dy) in DIRECT_NEIGHBOURS {
            let nx = cx as isize + dx;
            let ny = cy as isize + dy;
            if nx < 0 || nx >= width || ny < 0 || ny >= height {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let n_idx = grid.index(nx, ny);
            if processed.contains(&n_idx) || !within_dist(x0, y0, nx, ny, dist) {
                continue;
            }
            processed.insert(n_idx);
            if !grid.cell(n_idx).is_burnable_for(burn_index) {
                any_nonburnable = true;
            } else if !any_nonburnable
                || !nonburnable_cell_between(grid, nx, ny, x0, y0, burn_index)
            {
                neighbours.push(n_idx);
                queue.push_back(n_idx);
            }
        }
    }
    neighbours.sort_unstable();
    neighbours
}
