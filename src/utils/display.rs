//! Display and output formatting utilities

use crate::engine::{EngineEvent, GridSnapshot};
use crate::game_of_life::{Grid, Pattern};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Terminal rendering of grids and snapshots
pub struct GridFormatter;

impl GridFormatter {
    /// Format a grid in compact form
    pub fn format_grid_compact(grid: &Grid) -> String {
        let mut output = String::with_capacity(grid.height * (grid.width * 3 + 1));
        for (i, coord) in grid.coords().enumerate() {
            output.push(if grid.is_alive(coord) { '█' } else { '·' });
            if (i + 1) % grid.width == 0 {
                output.push('\n');
            }
        }
        output
    }

    /// Format a grid with column and row numbers
    pub fn format_grid_with_coords(grid: &Grid) -> String {
        let mut output = String::new();

        // Header with column numbers
        output.push_str("   ");
        for x in 0..grid.width {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        for (i, coord) in grid.coords().enumerate() {
            if coord.x == 0 {
                output.push_str(&format!("{:2} ", coord.y));
            }
            output.push_str(if grid.is_alive(coord) { "██" } else { "··" });
            if (i + 1) % grid.width == 0 {
                output.push('\n');
            }
        }

        output
    }

    /// One status line for a snapshot
    pub fn format_status(snapshot: &GridSnapshot) -> String {
        format!(
            "Generation {} | Living: {} / {} | {}",
            snapshot.generation,
            snapshot.living,
            snapshot.grid.width * snapshot.grid.height,
            if snapshot.paused { "paused" } else { "running" }
        )
    }

    /// Status line followed by the grid
    pub fn format_snapshot(snapshot: &GridSnapshot, with_coords: bool) -> String {
        let grid = if with_coords {
            Self::format_grid_with_coords(&snapshot.grid)
        } else {
            Self::format_grid_compact(&snapshot.grid)
        };
        format!("{}\n{}", Self::format_status(snapshot), grid)
    }

    /// Table of the built-in patterns
    pub fn format_pattern_list() -> String {
        let mut output = String::new();
        output.push_str("Pattern  | Size | Cells | Kind\n");
        output.push_str("---------|------|-------|------------------------------\n");

        for pattern in Pattern::ALL {
            let (w, h) = pattern.size();
            output.push_str(&format!(
                "{:8} | {}x{}  | {:5} | {}\n",
                pattern.name(),
                w,
                h,
                pattern.cells().len(),
                pattern.description()
            ));
        }

        output
    }
}

/// Passive terminal view of an engine.
///
/// Keeps its own copy of the grid, updated only from engine events, and
/// produces a frame whenever a generation completes.
pub struct TerminalRenderer {
    view: GridSnapshot,
    with_coords: bool,
}

impl TerminalRenderer {
    pub fn new(initial: GridSnapshot, with_coords: bool) -> Self {
        Self {
            view: initial,
            with_coords,
        }
    }

    pub fn view(&self) -> &GridSnapshot {
        &self.view
    }

    /// Current frame: status line plus grid
    pub fn frame(&self) -> String {
        GridFormatter::format_snapshot(&self.view, self.with_coords)
    }

    /// Fold one event into the view; returns text worth printing, if any
    pub fn apply(&mut self, event: &EngineEvent) -> Option<String> {
        match event {
            EngineEvent::CellChanged(state) => {
                if self.view.grid.set(state.coord, state.alive).is_err() {
                    log::warn!("Renderer ignored event for {} outside its grid", state.coord);
                    return None;
                }
                self.view.living = self.view.grid.living_count();
                None
            }
            EngineEvent::CycleCompleted { generation, living } => {
                self.view.generation = *generation;
                self.view.living = *living;
                Some(self.frame())
            }
            EngineEvent::PauseChanged { paused } => {
                self.view.paused = *paused;
                Some(GridFormatter::format_status(&self.view))
            }
        }
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() &&
        (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }

    /// Color a log line by its level
    pub fn for_level(level: Level, text: &str) -> String {
        match level {
            Level::Error => Self::error(text),
            Level::Warn => Self::warning(text),
            Level::Info => Self::info(text),
            Level::Debug | Level::Trace => Self::colored(text, Color::Cyan),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Cyan => 36,
        }
    }
}

/// `log` backend that writes colored lines to stderr
pub struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Install as the global logger. Fails if a logger is already set.
    pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    fn format_record(record: &Record) -> String {
        format!("[{:5}] {}", record.level(), record.args())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", ColorOutput::for_level(record.level(), &Self::format_record(record)));
        }
    }

    fn flush(&self) {}
}
