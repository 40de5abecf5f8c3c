//! Game of Life core functionality

pub mod grid;
pub mod patterns;
pub mod rules;

pub use grid::{CellCoord, Grid};
pub use patterns::{grid_to_string, parse_pattern, ParsedPattern, Pattern};
pub use rules::GameOfLifeRules;
