//! Grid representation and utilities for Game of Life

use crate::error::{EngineError, EngineResult};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest allowed extent of either grid axis
pub const MIN_DIMENSION: usize = 1;
/// Largest allowed extent of either grid axis
pub const MAX_DIMENSION: usize = 1080;

/// Column/row address of a cell. `x` is the column, `y` the row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Shift by an offset, used when stamping patterns.
    /// Saturates, so an overflowing offset lands outside every grid.
    pub fn offset_by(self, offset: CellCoord) -> Self {
        Self::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
        )
    }
}

impl From<(usize, usize)> for CellCoord {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A fixed-size Game of Life grid. Cells outside the grid are always dead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    cells: Vec<bool>,
}

/// Unchecked wire form of a [`Grid`]
#[derive(Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = EngineError;

    fn try_from(raw: RawGrid) -> EngineResult<Self> {
        let mut grid = Self::new(raw.width, raw.height)?;
        if raw.cells.len() != grid.cells.len() {
            return Err(EngineError::InvalidPattern(format!(
                "{}x{} grid needs {} cells, got {}",
                raw.width,
                raw.height,
                grid.cells.len(),
                raw.cells.len()
            )));
        }
        grid.cells = raw.cells;
        Ok(grid)
    }
}

impl Grid {
    /// Create a new all-dead grid
    pub fn new(width: usize, height: usize) -> EngineResult<Self> {
        if !Self::dimension_in_range(width) || !Self::dimension_in_range(height) {
            return Err(EngineError::InvalidDimensions { width, height });
        }

        Ok(Self {
            width,
            height,
            cells: vec![false; width * height],
        })
    }

    /// Create a grid with the given cells alive
    pub fn with_alive<I>(width: usize, height: usize, alive: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut grid = Self::new(width, height)?;
        for coord in alive {
            if !grid.contains(coord) {
                return Err(EngineError::SeedOutOfBounds { coord, width, height });
            }
            let idx = grid.index(coord);
            grid.cells[idx] = true;
        }
        Ok(grid)
    }

    /// Create a grid from rows of booleans (outer vec is rows, top first)
    pub fn from_rows(rows: Vec<Vec<bool>>) -> EngineResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(EngineError::InvalidPattern(format!(
                    "row {} has length {}, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
        }

        let mut grid = Self::new(width, height)?;
        grid.cells = rows.into_iter().flatten().collect();
        Ok(grid)
    }

    fn dimension_in_range(extent: usize) -> bool {
        (MIN_DIMENSION..=MAX_DIMENSION).contains(&extent)
    }

    /// Convert a coordinate to its row-major index
    #[inline]
    fn index(&self, coord: CellCoord) -> usize {
        coord.y * self.width + coord.x
    }

    /// Whether the coordinate addresses a cell of this grid
    #[inline]
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn check(&self, coord: CellCoord) -> EngineResult<()> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Get cell value
    pub fn get(&self, coord: CellCoord) -> EngineResult<bool> {
        self.check(coord)?;
        Ok(self.cells[self.index(coord)])
    }

    /// Get cell value, treating anything outside the grid as dead
    #[inline]
    pub fn is_alive(&self, coord: CellCoord) -> bool {
        self.contains(coord) && self.cells[self.index(coord)]
    }

    /// Set cell value, returning the previous value
    pub fn set(&mut self, coord: CellCoord, value: bool) -> EngineResult<bool> {
        self.check(coord)?;
        let idx = self.index(coord);
        Ok(std::mem::replace(&mut self.cells[idx], value))
    }

    /// Write a cell already known to be in range
    #[inline]
    pub(crate) fn put(&mut self, coord: CellCoord, value: bool) {
        debug_assert!(self.contains(coord));
        let idx = self.index(coord);
        self.cells[idx] = value;
    }

    /// Flip a cell and return its new value
    pub fn toggle(&mut self, coord: CellCoord) -> EngineResult<bool> {
        self.check(coord)?;
        let idx = self.index(coord);
        self.cells[idx] = !self.cells[idx];
        Ok(self.cells[idx])
    }

    /// Count living neighbors of a cell. Neighbors past the edge are not counted.
    pub fn count_neighbors(&self, coord: CellCoord) -> u8 {
        let mut count = 0;

        for (dy, dx) in iproduct!(-1isize..=1, -1isize..=1) {
            if dx == 0 && dy == 0 {
                continue;
            }

            let x = coord.x as isize + dx;
            let y = coord.y as isize + dy;
            if x < 0 || y < 0 {
                continue;
            }

            if self.is_alive(CellCoord::new(x as usize, y as usize)) {
                count += 1;
            }
        }

        count
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> {
        iproduct!(0..self.height, 0..self.width).map(|(y, x)| CellCoord::new(x, y))
    }

    /// Get all living cell coordinates
    pub fn living_cells(&self) -> Vec<CellCoord> {
        self.coords().filter(|&c| self.is_alive(c)).collect()
    }

    /// Count total living cells
    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Check if the grid is empty (no living cells)
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| !cell)
    }

    /// Kill every cell
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Coordinates whose state differs between two equally sized grids
    pub fn diff<'a>(&'a self, other: &'a Grid) -> impl Iterator<Item = CellCoord> + 'a {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        self.coords()
            .filter(move |&c| self.is_alive(c) != other.is_alive(c))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &cell in row {
                let symbol = if cell { "⬛" } else { "⬜" };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 3);
        assert_eq!(grid.coords().count(), 9);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_dimension_bounds() {
        assert!(Grid::new(1, 1).is_ok());
        assert!(Grid::new(1080, 1).is_ok());
        assert_eq!(
            Grid::new(0, 5),
            Err(EngineError::InvalidDimensions { width: 0, height: 5 })
        );
        assert_eq!(
            Grid::new(4, 1081),
            Err(EngineError::InvalidDimensions { width: 4, height: 1081 })
        );
    }

    #[test]
    fn test_grid_from_rows() {
        let rows = vec![
            vec![true, false, true],
            vec![false, true, false],
        ];
        let grid = Grid::from_rows(rows).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.living_count(), 3);
        assert!(grid.is_alive(CellCoord::new(2, 0)));
        assert!(grid.is_alive(CellCoord::new(1, 1)));
        assert!(!grid.is_alive(CellCoord::new(1, 0)));

        let ragged = vec![vec![true, false], vec![true]];
        assert!(matches!(Grid::from_rows(ragged), Err(EngineError::InvalidPattern(_))));
    }

    #[test]
    fn test_seed_out_of_bounds() {
        let err = Grid::with_alive(3, 3, [CellCoord::new(3, 0)]).unwrap_err();
        assert_eq!(
            err,
            EngineError::SeedOutOfBounds {
                coord: CellCoord::new(3, 0),
                width: 3,
                height: 3
            }
        );
    }

    #[test]
    fn test_get_set_toggle() {
        let mut grid = Grid::new(4, 2).unwrap();
        let c = CellCoord::new(3, 1);

        assert_eq!(grid.set(c, true), Ok(false));
        assert_eq!(grid.get(c), Ok(true));
        assert_eq!(grid.toggle(c), Ok(false));
        assert_eq!(grid.get(c), Ok(false));

        let outside = CellCoord::new(4, 0);
        assert!(matches!(grid.get(outside), Err(EngineError::OutOfBounds { .. })));
        assert!(grid.toggle(outside).is_err());
        assert!(!grid.is_alive(outside));
    }

    #[test]
    fn test_neighbor_counting() {
        let rows = vec![
            vec![true, true, true],
            vec![true, false, true],
            vec![true, true, true],
        ];
        let grid = Grid::from_rows(rows).unwrap();

        assert_eq!(grid.count_neighbors(CellCoord::new(1, 1)), 8);
        // Only 2 because center is dead
        assert_eq!(grid.count_neighbors(CellCoord::new(0, 0)), 2);
    }

    #[test]
    fn test_corner_never_counts_past_edge() {
        let full = vec![vec![true; 3]; 3];
        let grid = Grid::from_rows(full).unwrap();

        for (x, y) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            assert_eq!(grid.count_neighbors(CellCoord::new(x, y)), 3);
        }
        // Edge (non-corner) cells see 5
        assert_eq!(grid.count_neighbors(CellCoord::new(1, 0)), 5);
    }

    #[test]
    fn test_single_cell_grid() {
        let grid = Grid::with_alive(1, 1, [CellCoord::new(0, 0)]).unwrap();
        assert_eq!(grid.count_neighbors(CellCoord::new(0, 0)), 0);
    }

    #[test]
    fn test_living_cells_and_diff() {
        let a = Grid::with_alive(3, 3, [CellCoord::new(0, 1), CellCoord::new(2, 2)]).unwrap();
        let b = Grid::with_alive(3, 3, [CellCoord::new(0, 1), CellCoord::new(1, 1)]).unwrap();

        assert_eq!(a.living_cells(), vec![CellCoord::new(0, 1), CellCoord::new(2, 2)]);
        let changed: Vec<_> = a.diff(&b).collect();
        assert_eq!(changed, vec![CellCoord::new(1, 1), CellCoord::new(2, 2)]);
    }

    #[test]
    fn test_offset_saturates_instead_of_overflowing() {
        let far = CellCoord::new(usize::MAX, 0);
        assert_eq!(CellCoord::new(1, 2).offset_by(far), CellCoord::new(usize::MAX, 2));

        let err = Grid::with_alive(5, 5, [CellCoord::new(1, 0).offset_by(far)]).unwrap_err();
        assert!(matches!(err, EngineError::SeedOutOfBounds { .. }));
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let grid = Grid::with_alive(2, 2, [CellCoord::new(1, 0)]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), grid);

        let zero_width = r#"{"width":0,"height":2,"cells":[]}"#;
        assert!(serde_json::from_str::<Grid>(zero_width).is_err());

        let short = r#"{"width":2,"height":2,"cells":[true,false]}"#;
        let err = serde_json::from_str::<Grid>(short).unwrap_err();
        assert!(err.to_string().contains("needs 4 cells, got 2"));
    }

    #[test]
    fn test_display() {
        let grid = Grid::with_alive(2, 1, [CellCoord::new(0, 0)]).unwrap();
        assert_eq!(grid.to_string(), "⬛⬜\n");
        assert_eq!(CellCoord::new(4, 7).to_string(), "(4, 7)");
    }
}
