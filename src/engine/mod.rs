//! The grid engine: simulation state, notifications and the periodic driver

pub mod driver;
pub mod events;
pub mod grid_engine;

pub use driver::{Driver, DriverError, DriverHandle};
pub use events::{CellState, EngineEvent};
pub use grid_engine::{GridEngine, GridSnapshot, Seed};
