//! Seed patterns: built-in shapes and parsing of row text
//!
//! Row text uses one line per grid row, `1` or `#` for alive and `0` or `.`
//! for dead. Blank lines and surrounding whitespace are ignored.

use super::{CellCoord, Grid};
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in starting patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Glider,
    Blinker,
    Block,
    Beacon,
    Toad,
}

impl Pattern {
    pub const ALL: [Pattern; 5] = [
        Pattern::Glider,
        Pattern::Blinker,
        Pattern::Block,
        Pattern::Beacon,
        Pattern::Toad,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Glider => "glider",
            Pattern::Blinker => "blinker",
            Pattern::Block => "block",
            Pattern::Beacon => "beacon",
            Pattern::Toad => "toad",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Pattern::Glider => "spaceship, moves one cell diagonally every 4 generations",
            Pattern::Blinker => "period 2 oscillator",
            Pattern::Block => "still life",
            Pattern::Beacon => "period 2 oscillator",
            Pattern::Toad => "period 2 oscillator",
        }
    }

    fn rows(self) -> &'static [&'static str] {
        match self {
            Pattern::Glider => &["010", "001", "111"],
            Pattern::Blinker => &["000", "111", "000"],
            Pattern::Block => &["11", "11"],
            Pattern::Beacon => &["1100", "1100", "0011", "0011"],
            Pattern::Toad => &["0111", "1110"],
        }
    }

    /// Bounding box as (width, height)
    pub fn size(self) -> (usize, usize) {
        let rows = self.rows();
        (rows[0].len(), rows.len())
    }

    /// Alive cells relative to the pattern's top-left corner
    pub fn cells(self) -> Vec<CellCoord> {
        self.rows()
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'1')
                    .map(move |(x, _)| CellCoord::new(x, y))
            })
            .collect()
    }

    /// Alive cells shifted so the pattern's top-left lands on `offset`
    pub fn cells_at(self, offset: CellCoord) -> Vec<CellCoord> {
        self.cells().into_iter().map(|c| c.offset_by(offset)).collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Pattern::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Pattern::ALL.iter().map(|p| p.name()).collect();
                EngineError::InvalidPattern(format!(
                    "unknown pattern '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Result of parsing row text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellCoord>,
}

/// Parse a pattern from row text
pub fn parse_pattern(content: &str) -> EngineResult<ParsedPattern> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let Some(first) = lines.first() else {
        return Err(EngineError::InvalidPattern(
            "pattern contains no rows".to_string(),
        ));
    };
    let width = first.chars().count();

    let mut cells = Vec::new();
    for (y, line) in lines.iter().enumerate() {
        let len = line.chars().count();
        if len != width {
            return Err(EngineError::InvalidPattern(format!(
                "row {} has length {}, expected {} (all rows must have the same length)",
                y, len, width
            )));
        }

        for (x, ch) in line.chars().enumerate() {
            match ch {
                '1' | '#' => cells.push(CellCoord::new(x, y)),
                '0' | '.' => {}
                _ => {
                    return Err(EngineError::InvalidPattern(format!(
                        "invalid character '{}' at ({}, {}), only '0', '1', '.' and '#' are allowed",
                        ch, x, y
                    )))
                }
            }
        }
    }

    Ok(ParsedPattern {
        width,
        height: lines.len(),
        cells,
    })
}

/// Render a grid as `0`/`1` rows
pub fn grid_to_string(grid: &Grid) -> String {
    let mut result = String::with_capacity(grid.height * (grid.width + 1));

    for (i, coord) in grid.coords().enumerate() {
        result.push(if grid.is_alive(coord) { '1' } else { '0' });
        if (i + 1) % grid.width == 0 {
            result.push('\n');
        }
    }

    result
}
