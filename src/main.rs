//! Command line front end for the Game of Life grid engine

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lifegrid::{
    config::{CliOverrides, Settings},
    engine::{Driver, DriverError, DriverHandle, EngineEvent, GridEngine},
    game_of_life::{CellCoord, Pattern},
    utils::{display::TerminalRenderer, ColorOutput, ConsoleLogger, GridFormatter},
};
use log::LevelFilter;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver};

#[derive(Parser)]
#[command(name = "lifegrid")]
#[command(about = "Conway's Game of Life on a fixed grid")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation on a timer, reading commands from stdin
    Run {
        #[command(flatten)]
        sim: SimArgs,

        /// Stop after this many generations
        #[arg(short, long)]
        generations: Option<u64>,

        /// Start with the simulation paused
        #[arg(long)]
        paused: bool,

        /// Print row and column numbers around the grid
        #[arg(long)]
        coords: bool,
    },

    /// Advance a number of generations immediately and print the result
    Step {
        #[command(flatten)]
        sim: SimArgs,

        /// Generations to advance
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,

        /// Print every intermediate generation
        #[arg(long)]
        show_each: bool,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a default configuration file
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// List the built-in seed patterns
    Patterns,
}

/// Options shared by the commands that build an engine
#[derive(Args)]
struct SimArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Grid width (overrides config)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides config)
    #[arg(long)]
    height: Option<usize>,

    /// Cycle interval in milliseconds (overrides config)
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Seed pattern (overrides config)
    #[arg(short, long)]
    pattern: Option<Pattern>,
}

/// A line typed by the user while the simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputCommand {
    Toggle(CellCoord),
    Pause,
    Step,
    Show,
    Help,
    Quit,
}

const INPUT_HELP: &str = "Commands: t X Y (toggle cell), p (pause/resume), s (step), show, h (help), q (quit)";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    ConsoleLogger::init(level).context("Failed to install logger")?;

    match cli.command {
        Commands::Run { sim, generations, paused, coords } => {
            run_command(sim, generations, paused, coords).await
        }
        Commands::Step { sim, count, show_each, json } => {
            step_command(sim, count, show_each, json)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Patterns => {
            println!("{}", GridFormatter::format_pattern_list());
            Ok(())
        }
    }
}

fn load_settings(sim: &SimArgs, overrides: CliOverrides) -> Result<Settings> {
    let mut settings = if sim.config.exists() {
        Settings::from_file(&sim.config)
            .with_context(|| format!("Failed to load config from {}", sim.config.display()))?
    } else {
        log::warn!("Config file {} not found, using defaults", sim.config.display());
        Settings::default()
    };

    settings.merge_with_cli(&CliOverrides {
        width: sim.width,
        height: sim.height,
        interval_ms: sim.interval_ms,
        pattern: sim.pattern,
        ..overrides
    });

    settings.validate()
        .context("Configuration validation failed")?;

    log::debug!(
        "Configuration: {}x{} grid, {} ms interval, seed {:?}",
        settings.grid.width,
        settings.grid.height,
        settings.simulation.cycle_interval_ms,
        settings.seed
    );

    Ok(settings)
}

async fn run_command(sim: SimArgs, generations: Option<u64>, paused: bool, coords: bool) -> Result<()> {
    let settings = load_settings(&sim, CliOverrides {
        max_generations: generations,
        start_paused: paused,
        ..Default::default()
    })?;

    let mut engine = GridEngine::from_settings(&settings)
        .context("Failed to build grid engine")?;
    let mut events = engine.event_channel();
    let mut renderer = TerminalRenderer::new(engine.snapshot(), coords);

    println!("{}", ColorOutput::info("Starting Game of Life"));
    println!("{}", INPUT_HELP);
    println!("{}", renderer.frame());

    let (handle, mut task) = Driver::from_config(engine, &settings.simulation).spawn();
    let mut input = spawn_line_reader(BufReader::new(std::io::stdin()));
    let mut input_open = true;

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if let Some(text) = renderer.apply(&event) {
                    println!("{}", text);
                }
            }
            line = input.recv(), if input_open => {
                match line {
                    Some(line) => {
                        let line = line.context("Failed to read from stdin")?;
                        handle_input(&handle, &line, &mut renderer, &mut events).await?;
                    }
                    None => input_open = false,
                }
            }
            result = &mut task => {
                let engine = result.context("Simulation driver failed")?;
                drain_events(&mut renderer, &mut events);
                println!("{}", ColorOutput::success(&format!(
                    "Stopped at generation {} with {} living cells",
                    engine.generation(),
                    engine.living_count()
                )));
                return Ok(());
            }
        }
    }
}

/// Forward lines from a blocking reader on a detached thread.
/// A read still pending at exit does not hold the process open.
fn spawn_line_reader<R>(reader: R) -> UnboundedReceiver<std::io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in reader.lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Apply every queued event to the renderer, printing what it produces
fn drain_events(renderer: &mut TerminalRenderer, events: &mut UnboundedReceiver<EngineEvent>) {
    while let Ok(event) = events.try_recv() {
        if let Some(text) = renderer.apply(&event) {
            println!("{}", text);
        }
    }
}

async fn handle_input(
    handle: &DriverHandle,
    line: &str,
    renderer: &mut TerminalRenderer,
    events: &mut UnboundedReceiver<EngineEvent>,
) -> Result<()> {
    let command = match parse_input(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(()),
        Err(err) => {
            println!("{}", ColorOutput::warning(&err.to_string()));
            return Ok(());
        }
    };

    let outcome = match command {
        InputCommand::Toggle(coord) => match handle.toggle_cell(coord).await {
            Ok(alive) => {
                drain_events(renderer, events);
                println!("Cell {} is now {}", coord, if alive { "alive" } else { "dead" });
                println!("{}", renderer.frame());
                Ok(())
            }
            Err(DriverError::Engine(err)) => {
                println!("{}", ColorOutput::warning(&err.to_string()));
                Ok(())
            }
            Err(err) => Err(err),
        },
        InputCommand::Pause => handle.toggle_paused().await.map(|_| ()),
        InputCommand::Step => handle.step().await.map(|_| ()),
        InputCommand::Show => handle.snapshot().await.map(|snapshot| {
            println!("{}", GridFormatter::format_snapshot(&snapshot, true));
        }),
        InputCommand::Help => {
            println!("{}", INPUT_HELP);
            Ok(())
        }
        InputCommand::Quit => handle.shutdown().await,
    };

    match outcome {
        // The driver finishing on its own is reported by the run loop
        Err(DriverError::Stopped) => Ok(()),
        other => other.context("Failed to deliver command"),
    }
}

fn parse_input(line: &str) -> Result<Option<InputCommand>> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "t" | "toggle" => {
            let mut coordinate = |axis: &str| -> Result<usize> {
                let raw = parts
                    .next()
                    .with_context(|| format!("Missing {} coordinate. {}", axis, INPUT_HELP))?;
                raw.parse::<usize>()
                    .with_context(|| format!("Invalid {} coordinate '{}'", axis, raw))
            };
            let x = coordinate("x")?;
            let y = coordinate("y")?;
            InputCommand::Toggle(CellCoord::new(x, y))
        }
        "p" | "pause" | "resume" => InputCommand::Pause,
        "s" | "step" => InputCommand::Step,
        "show" => InputCommand::Show,
        "h" | "help" | "?" => InputCommand::Help,
        "q" | "quit" | "exit" => InputCommand::Quit,
        other => anyhow::bail!("Unknown command '{}'. {}", other, INPUT_HELP),
    };

    Ok(Some(command))
}

fn step_command(sim: SimArgs, count: u64, show_each: bool, json: bool) -> Result<()> {
    let settings = load_settings(&sim, CliOverrides::default())?;
    let mut engine = GridEngine::from_settings(&settings)
        .context("Failed to build grid engine")?;

    if show_each && !json {
        println!("{}", GridFormatter::format_snapshot(&engine.snapshot(), false));
    }

    for _ in 0..count {
        engine.advance_generation();
        if show_each && !json {
            println!("{}", GridFormatter::format_snapshot(&engine.snapshot(), false));
        }
    }

    let snapshot = engine.snapshot();
    if json {
        let output = serde_json::to_string_pretty(&snapshot)
            .context("Failed to serialize snapshot")?;
        println!("{}", output);
    } else if !show_each {
        println!("{}", GridFormatter::format_snapshot(&snapshot, true));
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up configuration..."));

    let config_dir = directory.join("config");
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create directory {}", config_dir.display()))?;

    write_config(&config_dir.join("default.yaml"), &Settings::default(), force)?;

    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    // Small oscillator, good for watching a single period
    let mut blinker = Settings::default();
    blinker.grid.width = 5;
    blinker.grid.height = 5;
    blinker.seed = lifegrid::config::SeedConfig::Pattern {
        pattern: Pattern::Blinker,
        offset: CellCoord::new(1, 1),
    };
    write_config(&examples_dir.join("blinker.yaml"), &blinker, force)?;

    // Glider on a larger board, bounded run
    let mut glider = Settings::default();
    glider.grid.width = 40;
    glider.grid.height = 20;
    glider.simulation.cycle_interval_ms = 200;
    glider.simulation.max_generations = Some(60);
    write_config(&examples_dir.join("glider.yaml"), &glider, force)?;

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: cargo run -- run --config {}", config_dir.join("default.yaml").display());

    Ok(())
}

fn write_config(path: &Path, settings: &Settings, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Skipped: {} (already exists)", path.display());
        return Ok(());
    }
    settings.to_file(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "lifegrid",
            "run",
            "--config", "test.yaml",
            "--width", "20",
            "--pattern", "beacon",
            "--generations", "5",
        ]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["lifegrid", "step", "-n", "3", "--json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Step { count: 3, json: true, .. }));

        assert!(Cli::try_parse_from(["lifegrid", "run", "--pattern", "spaceship"]).is_err());
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(
            parse_input("t 3 4").unwrap(),
            Some(InputCommand::Toggle(CellCoord::new(3, 4)))
        );
        assert_eq!(
            parse_input("  TOGGLE 0 9 ").unwrap(),
            Some(InputCommand::Toggle(CellCoord::new(0, 9)))
        );
        assert_eq!(parse_input("p").unwrap(), Some(InputCommand::Pause));
        assert_eq!(parse_input("step").unwrap(), Some(InputCommand::Step));
        assert_eq!(parse_input("q").unwrap(), Some(InputCommand::Quit));
        assert_eq!(parse_input("   ").unwrap(), None);

        assert!(parse_input("t 3").is_err());
        assert!(parse_input("t -1 2").is_err());
        assert!(parse_input("jump").is_err());
    }

    #[tokio::test]
    async fn test_line_reader_forwards_until_eof() {
        let mut lines = spawn_line_reader(std::io::Cursor::new("t 1 2\np\n"));
        assert_eq!(lines.recv().await.unwrap().unwrap(), "t 1 2");
        assert_eq!(lines.recv().await.unwrap().unwrap(), "p");
        assert!(lines.recv().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_line_reader_does_not_block_the_runtime() {
        // The peer stays open, so the reader thread is parked in a read when
        // the runtime shuts down at the end of the test
        let (reader, _peer) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut lines = spawn_line_reader(BufReader::new(reader));

        let pending =
            tokio::time::timeout(std::time::Duration::from_millis(50), lines.recv()).await;
        assert!(pending.is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();

        let default_path = temp_dir.path().join("config/default.yaml");
        assert!(default_path.exists());
        assert_eq!(Settings::from_file(&default_path).unwrap(), Settings::default());

        let glider = Settings::from_file(&temp_dir.path().join("config/examples/glider.yaml")).unwrap();
        assert_eq!(glider.simulation.max_generations, Some(60));
    }

    #[test]
    fn test_setup_keeps_existing_without_force() {
        let temp_dir = tempdir().unwrap();
        let default_path = temp_dir.path().join("config/default.yaml");
        std::fs::create_dir_all(default_path.parent().unwrap()).unwrap();
        std::fs::write(&default_path, "custom").unwrap();

        setup_command(temp_dir.path().to_path_buf(), false).unwrap();
        assert_eq!(std::fs::read_to_string(&default_path).unwrap(), "custom");

        setup_command(temp_dir.path().to_path_buf(), true).unwrap();
        assert!(Settings::from_file(&default_path).is_ok());
    }
}
