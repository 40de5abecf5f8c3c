//! Error types for the grid engine

use crate::game_of_life::CellCoord;
use thiserror::Error;

/// Errors raised by grid construction and cell addressing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Grid dimensions outside the supported range
    #[error(
        "invalid grid dimensions {width}x{height} (each axis must be between {min} and {max})",
        min = crate::game_of_life::grid::MIN_DIMENSION,
        max = crate::game_of_life::grid::MAX_DIMENSION
    )]
    InvalidDimensions { width: usize, height: usize },

    /// A cell address outside the grid
    #[error("cell {coord} is out of bounds for {width}x{height} grid")]
    OutOfBounds {
        coord: CellCoord,
        width: usize,
        height: usize,
    },

    /// A seeded live cell that does not fit in the grid
    #[error("seed cell {coord} does not fit in {width}x{height} grid")]
    SeedOutOfBounds {
        coord: CellCoord,
        width: usize,
        height: usize,
    },

    /// Malformed pattern text
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

impl EngineError {
    /// Whether this is a bad cell address rather than a construction error
    pub fn is_addressing(&self) -> bool {
        matches!(self, EngineError::OutOfBounds { .. })
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
