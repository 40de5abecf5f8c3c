//! Conway's Game of Life grid engine
//!
//! A fixed-size, double-buffered simulation with cell toggling, an advisory
//! pause flag and per-instance event observers, plus an async driver that
//! advances the grid on a fixed interval.

pub mod config;
pub mod engine;
pub mod error;
pub mod game_of_life;
pub mod utils;

pub use config::Settings;
pub use engine::{CellState, Driver, DriverHandle, EngineEvent, GridEngine, GridSnapshot, Seed};
pub use error::{EngineError, EngineResult};
pub use game_of_life::{CellCoord, Grid, Pattern};

/// Build an engine from validated settings
pub fn engine_from_settings(settings: &Settings) -> anyhow::Result<GridEngine> {
    settings.validate()?;
    Ok(GridEngine::from_settings(settings)?)
}
