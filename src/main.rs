// algoviz: algorithm playground with array visualization

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{ensure, Context};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use algoviz::config::{Config, DEFAULT_MAX_STEPS, DEFAULT_PAUSE_MS};
use algoviz::memory::value::format_sequence;
use algoviz::session::Playground;
use algoviz::ui::App;
use algoviz::visual::observed::InterceptPolicy;
use algoviz::visual::scheduler::ThreadScheduler;

const LOG_ENV: &str = "ALGOVIZ_LOG";

/// Instrument counted loops in a small script and animate the array they walk
#[derive(Parser, Debug)]
#[command(name = "algoviz", version)]
struct Cli {
    /// Script to load into the playground
    file: Option<PathBuf>,

    /// Start from the built-in bubble-sort example
    #[arg(long, conflicts_with = "file")]
    example: bool,

    /// Run once and print the final array and log instead of opening the UI
    #[arg(long)]
    headless: bool,

    /// Sleep for real during pauses (headless only)
    #[arg(long, requires = "headless")]
    realtime: bool,

    /// Pause after each highlight and update, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAUSE_MS)]
    pause_ms: u64,

    /// Let wrapper reads and writes continue without waiting for their visualization
    #[arg(long)]
    detached: bool,

    /// Abort a run after this many statements and loop iterations
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Playback speed multiplier for the UI
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Write diagnostics to this file while the UI is open
    #[arg(long)]
    trace_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> anyhow::Result<Config> {
        ensure!(
            self.speed.is_finite() && self.speed > 0.0,
            "--speed must be a positive number, got {}",
            self.speed
        );
        ensure!(self.max_steps > 0, "--max-steps must be at least 1");
        Ok(Config {
            pause_ms: self.pause_ms,
            intercept: if self.detached {
                InterceptPolicy::Detached
            } else {
                InterceptPolicy::Serialized
            },
            max_steps: self.max_steps,
            playback_speed: self.speed,
        })
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .init();
    } else if let Some(path) = &cli.trace_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create trace file '{}'", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    // Without a trace file the UI owns the terminal and diagnostics are dropped
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli)?;
    let config = cli.config()?;

    let mut playground = if cli.realtime {
        Playground::with_scheduler(config, Box::new(ThreadScheduler::new()))
    } else {
        Playground::new(config)
    };

    if let Some(path) = &cli.file {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read '{}'", path.display()))?;
        info!(path = %path.display(), bytes = source.len(), "loaded script");
        playground.set_source(source);
    } else if cli.example {
        playground.set_source(algoviz::session::EXAMPLE_BUBBLE_SORT);
    }

    if cli.headless {
        return Ok(run_headless(&mut playground));
    }

    playground.initialize_array();
    run_tui(playground)?;
    Ok(ExitCode::SUCCESS)
}

/// Run once and print the outcome
fn run_headless(playground: &mut Playground) -> ExitCode {
    let session = playground.run();
    let state = playground.state();

    for line in &state.log {
        println!("{}", line);
    }
    println!("Final array: {}", format_sequence(&state.array));

    if session.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_tui(playground: Playground) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(playground);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}
