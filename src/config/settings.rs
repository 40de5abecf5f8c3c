//! Configuration settings for the grid engine

use crate::engine::Seed;
use crate::error::EngineResult;
use crate::game_of_life::grid::{MAX_DIMENSION, MIN_DIMENSION};
use crate::game_of_life::{parse_pattern, CellCoord, Grid, Pattern};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub grid: GridConfig,
    pub simulation: SimulationConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub cycle_interval_ms: u64,
    #[serde(default)]
    pub start_paused: bool,
    #[serde(default)]
    pub max_generations: Option<u64>,
}

impl SimulationConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }
}

/// Starting pattern as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedConfig {
    Empty,
    Pattern {
        pattern: Pattern,
        #[serde(default)]
        offset: CellCoord,
    },
    Cells {
        cells: Vec<CellCoord>,
    },
    Rows {
        rows: Vec<String>,
        #[serde(default)]
        offset: CellCoord,
    },
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridConfig {
                width: 10,
                height: 10,
            },
            simulation: SimulationConfig {
                cycle_interval_ms: 500,
                start_paused: false,
                max_generations: None,
            },
            seed: SeedConfig::Pattern {
                pattern: Pattern::Glider,
                offset: CellCoord::new(1, 1),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let GridConfig { width, height } = self.grid;
        for (axis, extent) in [("width", width), ("height", height)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&extent) {
                anyhow::bail!(
                    "Grid {} must be between {} and {}, got {}",
                    axis, MIN_DIMENSION, MAX_DIMENSION, extent
                );
            }
        }

        if self.simulation.cycle_interval_ms == 0 {
            anyhow::bail!("Cycle interval must be positive");
        }

        if self.simulation.max_generations == Some(0) {
            anyhow::bail!("Maximum generations must be positive when set");
        }

        let seed = self.seed().context("Invalid seed pattern")?;
        Grid::with_alive(width, height, seed.alive_cells())
            .context("Seed pattern does not fit the grid")?;

        Ok(())
    }

    /// Resolve the configured seed into engine terms
    pub fn seed(&self) -> EngineResult<Seed> {
        Ok(match &self.seed {
            SeedConfig::Empty => Seed::Empty,
            SeedConfig::Pattern { pattern, offset } => Seed::Pattern {
                pattern: *pattern,
                offset: *offset,
            },
            SeedConfig::Cells { cells } => Seed::Cells(cells.clone()),
            SeedConfig::Rows { rows, offset } => {
                let parsed = parse_pattern(&rows.join("\n"))?;
                Seed::Cells(parsed.cells.into_iter().map(|c| c.offset_by(*offset)).collect())
            }
        })
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(width) = cli_overrides.width {
            self.grid.width = width;
        }
        if let Some(height) = cli_overrides.height {
            self.grid.height = height;
        }
        if let Some(interval_ms) = cli_overrides.interval_ms {
            self.simulation.cycle_interval_ms = interval_ms;
        }
        if let Some(max_generations) = cli_overrides.max_generations {
            self.simulation.max_generations = Some(max_generations);
        }
        if cli_overrides.start_paused {
            self.simulation.start_paused = true;
        }
        if let Some(pattern) = cli_overrides.pattern {
            // Keep a configured offset when only the shape changes
            let offset = match self.seed {
                SeedConfig::Pattern { offset, .. } | SeedConfig::Rows { offset, .. } => offset,
                _ => CellCoord::default(),
            };
            self.seed = SeedConfig::Pattern { pattern, offset };
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub interval_ms: Option<u64>,
    pub max_generations: Option<u64>,
    pub pattern: Option<Pattern>,
    pub start_paused: bool,
}
