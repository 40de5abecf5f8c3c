//! Double-buffered Game of Life engine

use super::events::{channel_observer, CellState, EngineEvent, ObserverList};
use crate::config::Settings;
use crate::error::EngineResult;
use crate::game_of_life::{CellCoord, GameOfLifeRules, Grid, Pattern};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Initial contents of a freshly built grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Seed {
    #[default]
    Empty,
    Cells(Vec<CellCoord>),
    Pattern { pattern: Pattern, offset: CellCoord },
}

impl Seed {
    /// Coordinates this seed turns alive
    pub fn alive_cells(&self) -> Vec<CellCoord> {
        match self {
            Seed::Empty => Vec::new(),
            Seed::Cells(cells) => cells.clone(),
            Seed::Pattern { pattern, offset } => pattern.cells_at(*offset),
        }
    }
}

/// Point-in-time copy of engine state handed to readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub generation: u64,
    pub paused: bool,
    pub living: usize,
    pub grid: Grid,
}

/// Owns the current generation and the scratch buffer the next one is
/// written into.
///
/// The engine does no timing of its own. A driver calls
/// [`advance_generation`](Self::advance_generation) on a schedule and is
/// expected to skip the call while [`is_paused`](Self::is_paused) is set.
pub struct GridEngine {
    current: Grid,
    next: Grid,
    paused: bool,
    generation: u64,
    observers: ObserverList,
}

impl GridEngine {
    /// Build an engine with the given dimensions and seed
    pub fn new(width: usize, height: usize, seed: Seed) -> EngineResult<Self> {
        let current = Grid::with_alive(width, height, seed.alive_cells())?;
        Ok(Self::from_grid(current))
    }

    /// Wrap an existing grid as the current generation
    pub fn from_grid(current: Grid) -> Self {
        let mut next = current.clone();
        next.clear();

        Self {
            current,
            next,
            paused: false,
            generation: 0,
            observers: ObserverList::default(),
        }
    }

    /// Build an engine from configuration
    pub fn from_settings(settings: &Settings) -> EngineResult<Self> {
        let seed = settings.seed()?;
        let mut engine = Self::new(settings.grid.width, settings.grid.height, seed)?;
        engine.paused = settings.simulation.start_paused;
        Ok(engine)
    }

    pub fn width(&self) -> usize {
        self.current.width
    }

    pub fn height(&self) -> usize {
        self.current.height
    }

    /// Number of completed cycles since construction or the last reseed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current generation
    pub fn grid(&self) -> &Grid {
        &self.current
    }

    pub fn living_count(&self) -> usize {
        self.current.living_count()
    }

    pub fn cell(&self, coord: CellCoord) -> EngineResult<bool> {
        self.current.get(coord)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            generation: self.generation,
            paused: self.paused,
            living: self.current.living_count(),
            grid: self.current.clone(),
        }
    }

    /// Register a callback for every event this engine emits
    pub fn subscribe<F>(&mut self, mut observer: F)
    where
        F: FnMut(&EngineEvent) + Send + 'static,
    {
        self.observers.push(Box::new(move |event: &EngineEvent| {
            observer(event);
            true
        }));
    }

    /// Receive this engine's events over a channel. The subscription ends
    /// when the receiver is dropped.
    pub fn event_channel(&mut self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (observer, rx) = channel_observer();
        self.observers.push(observer);
        rx
    }

    /// Compute the next generation from the current one and swap buffers.
    ///
    /// Every cell is evaluated against `current` and written to `next`; the
    /// two are swapped only after the whole pass. Observers then get one
    /// `CellChanged` per cell that flipped, followed by one `CycleCompleted`.
    pub fn advance_generation(&mut self) {
        GameOfLifeRules::evolve_into(&self.current, &mut self.next);
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;

        // `next` now holds the previous generation
        let changed: Vec<CellState> = self
            .current
            .diff(&self.next)
            .map(|coord| CellState {
                coord,
                alive: self.current.is_alive(coord),
            })
            .collect();
        self.next.clear();

        for state in changed {
            self.observers.notify(&EngineEvent::CellChanged(state));
        }

        let living = self.current.living_count();
        log::debug!("New cycle: generation {} ({} alive)", self.generation, living);
        self.observers.notify(&EngineEvent::CycleCompleted {
            generation: self.generation,
            living,
        });
    }

    /// Flip one cell immediately and return its new state.
    /// The scratch buffer is written too, keeping it in step with `current`.
    pub fn toggle_cell(&mut self, coord: CellCoord) -> EngineResult<bool> {
        let alive = self.current.toggle(coord)?;
        self.next.put(coord, alive);
        self.observers
            .notify(&EngineEvent::CellChanged(CellState { coord, alive }));
        Ok(alive)
    }

    /// Force a cell to a given state. Notifies only if the state changed.
    pub fn set_cell(&mut self, coord: CellCoord, alive: bool) -> EngineResult<()> {
        let previous = self.current.set(coord, alive)?;
        self.next.put(coord, alive);
        if previous != alive {
            self.observers
                .notify(&EngineEvent::CellChanged(CellState { coord, alive }));
        }
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
        self.observers.notify(&EngineEvent::PauseChanged { paused });
    }

    /// Flip the pause flag and return the new value
    pub fn toggle_paused(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    /// Kill every cell and reset the generation counter
    pub fn clear(&mut self) {
        let alive = self.current.living_cells();
        self.current.clear();
        self.next.clear();
        self.generation = 0;

        for coord in alive {
            self.observers
                .notify(&EngineEvent::CellChanged(CellState { coord, alive: false }));
        }
    }

    /// Replace the grid contents with a new seed. Dimensions are unchanged.
    ///
    /// The seed is validated before anything is touched.
    pub fn reseed(&mut self, seed: Seed) -> EngineResult<()> {
        let seeded = Grid::with_alive(self.width(), self.height(), seed.alive_cells())?;
        let previous = std::mem::replace(&mut self.current, seeded);
        self.next.clear();
        self.generation = 0;

        let changed: Vec<CellState> = self
            .current
            .diff(&previous)
            .map(|coord| CellState {
                coord,
                alive: self.current.is_alive(coord),
            })
            .collect();
        for state in changed {
            self.observers.notify(&EngineEvent::CellChanged(state));
        }
        Ok(())
    }
}

impl std::fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridEngine")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("generation", &self.generation)
            .field("paused", &self.paused)
            .field("observers", &self.observers.len())
            .finish()
    }
}
