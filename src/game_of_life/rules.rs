//! Game of Life rules implementation

use super::{CellCoord, Grid};

/// Game of Life rules engine (B3/S23)
pub struct GameOfLifeRules;

impl GameOfLifeRules {
    /// Check if a cell should be alive in the next generation given its current state and neighbor count
    pub fn should_be_alive(current_state: bool, neighbor_count: u8) -> bool {
        let counts = if current_state {
            Self::survival_neighbor_counts()
        } else {
            Self::birth_neighbor_counts()
        };
        counts.contains(&neighbor_count)
    }

    /// Next state of a single cell, read from `current` only
    #[inline]
    pub fn next_state(current: &Grid, coord: CellCoord) -> bool {
        Self::should_be_alive(current.is_alive(coord), current.count_neighbors(coord))
    }

    /// Evaluate the given cells against `current`, writing results into `next`.
    ///
    /// `current` is never written, so the order of `coords` cannot affect the
    /// outcome. Coordinates outside either grid are skipped.
    pub fn evolve_cells<I>(current: &Grid, next: &mut Grid, coords: I)
    where
        I: IntoIterator<Item = CellCoord>,
    {
        debug_assert_eq!((current.width, current.height), (next.width, next.height));

        for coord in coords {
            if !current.contains(coord) {
                continue;
            }
            next.put(coord, Self::next_state(current, coord));
        }
    }

    /// Evaluate every cell of `current` in row-major order into `next`
    pub fn evolve_into(current: &Grid, next: &mut Grid) {
        Self::evolve_cells(current, next, current.coords());
    }

    /// Apply Game of Life rules to evolve the grid one generation forward
    pub fn evolve(current: &Grid) -> Grid {
        let mut next = current.clone();
        next.clear();
        Self::evolve_into(current, &mut next);
        next
    }

    /// Evolve the grid for multiple generations
    pub fn evolve_generations(mut grid: Grid, generations: usize) -> Grid {
        for _ in 0..generations {
            grid = Self::evolve(&grid);
        }
        grid
    }

    /// Neighbor counts that let a live cell survive
    pub fn survival_neighbor_counts() -> &'static [u8] {
        &[2, 3]
    }

    /// Neighbor counts that turn a dead cell alive
    pub fn birth_neighbor_counts() -> &'static [u8] {
        &[3]
    }
}
