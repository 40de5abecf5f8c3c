//! Periodic driver that owns an engine and serializes all access to it
//!
//! Ticks from the interval timer and commands from input handlers go through
//! one `select!` loop, so a toggle is always applied between two generations
//! and never lost in a buffer swap.

use super::grid_engine::{GridEngine, GridSnapshot};
use crate::config::SimulationConfig;
use crate::error::{EngineError, EngineResult};
use crate::game_of_life::CellCoord;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const COMMAND_QUEUE_DEPTH: usize = 64;

/// Errors returned through a [`DriverHandle`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("simulation driver has stopped")]
    Stopped,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug)]
enum Command {
    Toggle {
        coord: CellCoord,
        reply: oneshot::Sender<EngineResult<bool>>,
    },
    SetPaused(bool),
    TogglePaused {
        reply: oneshot::Sender<bool>,
    },
    Step {
        reply: oneshot::Sender<u64>,
    },
    Snapshot {
        reply: oneshot::Sender<GridSnapshot>,
    },
    Shutdown,
}

/// Fixed-interval ticker around a [`GridEngine`]
#[derive(Debug)]
pub struct Driver {
    engine: GridEngine,
    interval: Duration,
    max_generations: Option<u64>,
}

impl Driver {
    pub fn new(engine: GridEngine, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            max_generations: None,
        }
    }

    /// Driver configured from the simulation section of the settings
    pub fn from_config(engine: GridEngine, config: &SimulationConfig) -> Self {
        let mut driver = Self::new(engine, config.cycle_interval());
        driver.max_generations = config.max_generations;
        driver
    }

    /// Stop on its own once the engine reaches this generation
    pub fn with_generation_limit(mut self, limit: u64) -> Self {
        self.max_generations = Some(limit);
        self
    }

    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GridEngine {
        &mut self.engine
    }

    /// One scheduled tick: advance unless paused. Returns whether it advanced.
    pub fn tick(engine: &mut GridEngine) -> bool {
        if engine.is_paused() {
            return false;
        }
        engine.advance_generation();
        true
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// The task ends on shutdown, when every handle is dropped, or when the
    /// generation limit is reached, and hands the engine back.
    pub fn spawn(self) -> (DriverHandle, JoinHandle<GridEngine>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let task = tokio::spawn(self.run(rx));
        (DriverHandle { tx }, task)
    }

    fn limit_reached(&self) -> bool {
        self.max_generations
            .is_some_and(|limit| self.engine.generation() >= limit)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) -> GridEngine {
        // Zero periods are rejected by tokio
        let period = self.interval.max(Duration::from_millis(1));
        // First cycle runs one full interval after start
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Driver started: {}x{} grid, cycle every {:?}",
            self.engine.width(),
            self.engine.height(),
            self.interval
        );

        while !self.limit_reached() {
            tokio::select! {
                _ = ticker.tick() => {
                    Self::tick(&mut self.engine);
                }
                command = rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
            }
        }

        log::info!("Driver stopped at generation {}", self.engine.generation());
        self.engine
    }

    fn handle(&mut self, command: Command) {
        // A requester that stopped waiting for its reply is not an error
        match command {
            Command::Toggle { coord, reply } => {
                let result = self.engine.toggle_cell(coord);
                if let Err(err) = &result {
                    log::warn!("Rejected toggle: {}", err);
                }
                let _ = reply.send(result);
            }
            Command::SetPaused(paused) => self.engine.set_paused(paused),
            Command::TogglePaused { reply } => {
                let _ = reply.send(self.engine.toggle_paused());
            }
            Command::Step { reply } => {
                self.engine.advance_generation();
                let _ = reply.send(self.engine.generation());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Shutdown => {}
        }
    }
}

/// Cloneable inbound API to a running [`Driver`]
#[derive(Debug, Clone)]
pub struct DriverHandle {
    tx: mpsc::Sender<Command>,
}

impl DriverHandle {
    async fn send(&self, command: Command) -> Result<(), DriverError> {
        self.tx.send(command).await.map_err(|_| DriverError::Stopped)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, DriverError> {
        let (reply, response) = oneshot::channel();
        self.send(make(reply)).await?;
        response.await.map_err(|_| DriverError::Stopped)
    }

    /// Flip a cell between cycles and return its new state
    pub async fn toggle_cell(&self, coord: CellCoord) -> Result<bool, DriverError> {
        let result = self
            .request(|reply| Command::Toggle { coord, reply })
            .await?;
        Ok(result?)
    }

    pub async fn set_paused(&self, paused: bool) -> Result<(), DriverError> {
        self.send(Command::SetPaused(paused)).await
    }

    /// Flip the pause flag and return the new value
    pub async fn toggle_paused(&self) -> Result<bool, DriverError> {
        self.request(|reply| Command::TogglePaused { reply }).await
    }

    /// Advance exactly one generation now, paused or not
    pub async fn step(&self) -> Result<u64, DriverError> {
        self.request(|reply| Command::Step { reply }).await
    }

    pub async fn snapshot(&self) -> Result<GridSnapshot, DriverError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn shutdown(&self) -> Result<(), DriverError> {
        self.send(Command::Shutdown).await
    }

    /// Whether the driver loop has exited
    pub fn is_stopped(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Seed;
    use crate::game_of_life::Pattern;

    const INTERVAL: Duration = Duration::from_millis(500);

    fn blinker_engine() -> GridEngine {
        let seed = Seed::Pattern {
            pattern: Pattern::Blinker,
            offset: CellCoord::new(0, 0),
        };
        GridEngine::new(3, 3, seed).unwrap()
    }

    #[test]
    fn test_tick_checks_pause_flag() {
        let mut engine = blinker_engine();
        engine.set_paused(true);
        assert!(!Driver::tick(&mut engine));
        assert_eq!(engine.generation(), 0);

        engine.set_paused(false);
        assert!(Driver::tick(&mut engine));
        assert_eq!(engine.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (handle, task) = Driver::new(blinker_engine(), INTERVAL).spawn();

        time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(handle.snapshot().await.unwrap().generation, 2);

        handle.shutdown().await.unwrap();
        let engine = task.await.unwrap();
        assert_eq!(engine.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_driver_does_not_advance() {
        let mut engine = blinker_engine();
        engine.set_paused(true);
        let (handle, task) = Driver::new(engine, INTERVAL).spawn();

        time::sleep(Duration::from_millis(5200)).await;
        assert_eq!(handle.snapshot().await.unwrap().generation, 0);

        // Manual stepping still works while paused
        assert_eq!(handle.step().await.unwrap(), 1);

        handle.set_paused(false).await.unwrap();
        time::sleep(Duration::from_millis(1000)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.paused);
        assert_eq!(snapshot.generation, 3);

        assert!(handle.toggle_paused().await.unwrap());
        time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(handle.snapshot().await.unwrap().generation, 3);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_through_handle() {
        let (handle, task) = Driver::new(blinker_engine(), INTERVAL).spawn();

        assert_eq!(handle.toggle_cell(CellCoord::new(0, 0)).await, Ok(true));
        assert_eq!(
            handle.toggle_cell(CellCoord::new(3, 0)).await,
            Err(DriverError::Engine(EngineError::OutOfBounds {
                coord: CellCoord::new(3, 0),
                width: 3,
                height: 3,
            }))
        );

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.grid.is_alive(CellCoord::new(0, 0)));
        assert_eq!(snapshot.living, 4);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
        assert!(handle.is_stopped());
        assert_eq!(handle.snapshot().await, Err(DriverError::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_limit_stops_driver() {
        let driver = Driver::new(blinker_engine(), Duration::from_millis(100))
            .with_generation_limit(4);
        let (_handle, task) = driver.spawn();

        let engine = task.await.unwrap();
        assert_eq!(engine.generation(), 4);
        // Blinker has period 2
        assert_eq!(engine.grid(), blinker_engine().grid());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_flow_while_running() {
        let mut engine = blinker_engine();
        let mut events = engine.event_channel();
        let (handle, task) = Driver::new(engine, INTERVAL).spawn();

        time::sleep(Duration::from_millis(600)).await;
        handle.shutdown().await.unwrap();
        task.await.unwrap();

        let mut cycles = 0;
        while let Ok(event) = events.try_recv() {
            if let crate::engine::EngineEvent::CycleCompleted { generation, .. } = event {
                cycles += 1;
                assert_eq!(generation, 1);
            }
        }
        assert_eq!(cycles, 1);
    }
}
