//! Uniform-grid spatial index for the link pass.
//!
//! Particles are binned into square cells at least as wide as the link
//! distance, sorted by cell key, and candidate pairs are only taken from the
//! same cell and its forward neighbours. Each unordered pair is visited at
//! most once, so the grid yields exactly the links the exhaustive scan does.
//!
//! The number of cells is bounded by the particle count: on a surface that
//! is large relative to the configured cell size, cells are widened until
//! the grid fits. Wider cells only add candidates, never drop links.

use glam::Vec2;

/// Cell budget per indexed particle.
const CELLS_PER_PARTICLE: usize = 4;
/// Cell budget floor, so small fields keep the configured cell size.
const MIN_CELLS: usize = 1024;

/// Configuration for the spatial grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialConfig {
    /// Minimum side length of each cell in pixels.
    pub cell_size: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { cell_size: 150.0 }
    }
}

impl SpatialConfig {
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "Cell size must be positive");
        Self { cell_size }
    }

    /// Grid dimensions `(columns, rows)` covering `bounds`. Saturates
    /// instead of overflowing.
    pub fn dimensions(&self, bounds: Vec2) -> (usize, usize) {
        let cols = (bounds.x.max(0.0) / self.cell_size).floor() as usize;
        let rows = (bounds.y.max(0.0) / self.cell_size).floor() as usize;
        (cols.saturating_add(1), rows.saturating_add(1))
    }
}

/// Forward neighbour offsets: right, down-left, down, down-right.
const FORWARD: [(isize, isize); 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

/// Particle indices sorted by cell, with per-cell ranges.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    config: SpatialConfig,
    /// Cell size in use after fitting the cell budget.
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// `(cell_key, particle_index)` sorted by key.
    entries: Vec<(usize, usize)>,
    /// `cell_start[k]..cell_start[k + 1]` indexes `entries` for cell `k`.
    cell_start: Vec<usize>,
}

impl SpatialGrid {
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            config,
            cell_size: config.cell_size,
            ..Default::default()
        }
    }

    pub fn config(&self) -> SpatialConfig {
        self.config
    }

    /// Cell size chosen by the last rebuild.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// `(columns, rows)` of the last rebuild.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Smallest cell size, doubling from the configured one, whose grid over
    /// `bounds` fits the budget for `count` particles.
    fn fit(&self, bounds: Vec2, count: usize) -> (f32, usize, usize) {
        let limit = count.saturating_mul(CELLS_PER_PARTICLE).max(MIN_CELLS);
        let mut cell_size = self.config.cell_size;
        loop {
            let (cols, rows) = SpatialConfig { cell_size }.dimensions(bounds);
            match cols.checked_mul(rows) {
                Some(cells) if cells <= limit => return (cell_size, cols, rows),
                _ => cell_size *= 2.0,
            }
        }
    }

    /// Rebuild the index for `positions` inside `bounds`.
    ///
    /// Positions outside bounds (possible right after a resize) are binned
    /// into the nearest edge cell.
    pub fn rebuild(&mut self, positions: impl ExactSizeIterator<Item = Vec2>, bounds: Vec2) {
        let (cell_size, cols, rows) = self.fit(bounds, positions.len());
        self.cell_size = cell_size;
        self.cols = cols;
        self.rows = rows;

        self.entries.clear();
        for (i, pos) in positions.enumerate() {
            let key = self.cell_key(pos);
            self.entries.push((key, i));
        }
        self.entries.sort_unstable();

        let cells = cols * rows;
        self.cell_start.clear();
        self.cell_start.resize(cells + 1, 0);
        for &(key, _) in &self.entries {
            self.cell_start[key + 1] += 1;
        }
        for k in 0..cells {
            self.cell_start[k + 1] += self.cell_start[k];
        }
    }

    fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        // Float-to-int casts saturate and map NaN to 0
        let cx = ((pos.x / self.cell_size).floor().max(0.0) as usize).min(self.cols - 1);
        let cy = ((pos.y / self.cell_size).floor().max(0.0) as usize).min(self.rows - 1);
        (cx, cy)
    }

    fn cell_key(&self, pos: Vec2) -> usize {
        let (cx, cy) = self.cell_coords(pos);
        cy * self.cols + cx
    }

    fn cell(&self, cx: usize, cy: usize) -> &[(usize, usize)] {
        let k = cy * self.cols + cx;
        &self.entries[self.cell_start[k]..self.cell_start[k + 1]]
    }

    /// Visit every candidate pair `(i, j)` once, `i != j`.
    ///
    /// Returns the number of pairs visited.
    pub fn for_each_candidate_pair(&self, mut visit: impl FnMut(usize, usize)) -> usize {
        let mut visited = 0;
        for cy in 0..self.rows {
            for cx in 0..self.cols {
                let here = self.cell(cx, cy);
                if here.is_empty() {
                    continue;
                }

                for (a, &(_, i)) in here.iter().enumerate() {
                    for &(_, j) in &here[a + 1..] {
                        visit(i, j);
                        visited += 1;
                    }
                }

                for (dx, dy) in FORWARD {
                    let (Some(nx), Some(ny)) = (cx.checked_add_signed(dx), cy.checked_add_signed(dy)) else {
                        continue;
                    };
                    if nx >= self.cols || ny >= self.rows {
                        continue;
                    }
                    let there = self.cell(nx, ny);
                    for &(_, i) in here {
                        for &(_, j) in there {
                            visit(i, j);
                            visited += 1;
                        }
                    }
                }
            }
        }
        visited
    }

    /// Number of indexed particles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pairs(grid: &SpatialGrid) -> HashSet<(usize, usize)> {
        let mut out = HashSet::new();
        grid.for_each_candidate_pair(|i, j| {
            let key = (i.min(j), i.max(j));
            assert!(out.insert(key), "pair {:?} visited twice", key);
        });
        out
    }

    #[test]
    fn test_dimensions() {
        let config = SpatialConfig::new(150.0);
        assert_eq!(config.dimensions(Vec2::new(800.0, 600.0)), (6, 5));
        assert_eq!(config.dimensions(Vec2::ZERO), (1, 1));
    }

    #[test]
    fn test_adjacent_cells_pair_up() {
        let mut grid = SpatialGrid::new(SpatialConfig::new(100.0));
        let positions = [
            Vec2::new(95.0, 95.0),  // cell (0,0)
            Vec2::new(105.0, 95.0), // cell (1,0)
            Vec2::new(95.0, 105.0), // cell (0,1)
            Vec2::new(105.0, 105.0), // cell (1,1)
            Vec2::new(390.0, 390.0), // far away
        ];
        grid.rebuild(positions.iter().copied(), Vec2::new(400.0, 400.0));

        let found = pairs(&grid);
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert!(found.contains(&(i, j)), "missing ({}, {})", i, j);
            }
        }
        assert!(!found.iter().any(|&(i, j)| i == 4 || j == 4));
    }

    #[test]
    fn test_down_left_neighbour() {
        let mut grid = SpatialGrid::new(SpatialConfig::new(100.0));
        let positions = [Vec2::new(105.0, 95.0), Vec2::new(95.0, 105.0)];
        grid.rebuild(positions.iter().copied(), Vec2::new(300.0, 300.0));
        assert_eq!(pairs(&grid), HashSet::from([(0, 1)]));
    }

    #[test]
    fn test_out_of_bounds_binned_to_edge() {
        let mut grid = SpatialGrid::new(SpatialConfig::new(100.0));
        let positions = [Vec2::new(750.0, 550.0), Vec2::new(390.0, 290.0)];
        grid.rebuild(positions.iter().copied(), Vec2::new(400.0, 300.0));
        assert_eq!(grid.len(), 2);
        assert_eq!(pairs(&grid), HashSet::from([(0, 1)]));
    }

    #[test]
    fn test_huge_surface_widens_cells() {
        let mut grid = SpatialGrid::new(SpatialConfig::new(1.0));
        let positions = [Vec2::new(10.0, 10.0), Vec2::new(10.5, 10.0), Vec2::new(69_000.0, 69_000.0)];
        grid.rebuild(positions.iter().copied(), Vec2::new(70_000.0, 70_000.0));

        let (cols, rows) = grid.dimensions();
        assert!(cols * rows <= MIN_CELLS);
        assert!(grid.cell_size() >= 1.0);
        assert!(pairs(&grid).contains(&(0, 1)));
    }

    #[test]
    fn test_cell_budget_tracks_particle_count() {
        let mut grid = SpatialGrid::new(SpatialConfig::new(1.0));
        let positions: Vec<Vec2> = (0..2000).map(|i| Vec2::new(i as f32 * 50.0, 0.0)).collect();
        grid.rebuild(positions.iter().copied(), Vec2::new(100_000.0, 100_000.0));

        let (cols, rows) = grid.dimensions();
        assert!(cols * rows <= 2000 * CELLS_PER_PARTICLE);
    }

    #[test]
    fn test_non_finite_bounds() {
        let mut grid = SpatialGrid::new(SpatialConfig::new(150.0));
        let positions = [Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        grid.rebuild(positions.iter().copied(), Vec2::new(f32::INFINITY, f32::NAN));
        assert_eq!(pairs(&grid), HashSet::from([(0, 1)]));
    }
}
