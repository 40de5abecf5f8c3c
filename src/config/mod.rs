//! Configuration management for the grid engine

pub mod settings;

pub use settings::{CliOverrides, GridConfig, SeedConfig, Settings, SimulationConfig};
