#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that runs the Lane Control simulation.

mod log_sink;
mod script;
mod store;

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use lane_control_core::{config::SimConfig, Command, Event, SpeedMultiplier};
use lane_control_simulation::{
    ports::{Clock, FixedClock, MemoryStore, StateStore, SystemClock},
    Driver,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use log_sink::LogSink;
use script::ScriptedClick;
use store::JsonFileStore;

/// Runs a single lane of minion combat without a window.
#[derive(Debug, Parser)]
#[command(name = "lane-control")]
#[command(about = "Headless single-lane minion combat simulator")]
struct Args {
    /// Number of frames to run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// Wall-clock duration of one frame, in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Initial speed multiplier (1, 2 or 4).
    #[arg(long, default_value_t = 1)]
    speed: u32,

    /// TOML file overriding the default configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file the world is persisted to between frames.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Overrides the configured RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Scripted tool click as `tool@x,y@seconds`; may be repeated.
    #[arg(long = "click")]
    clicks: Vec<ScriptedClick>,

    /// Paces frames against the wall clock instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Frames between HUD log lines.
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;
    let speed = SpeedMultiplier::from_factor(args.speed)
        .with_context(|| format!("unsupported speed multiplier {}", args.speed))?;
    let frame = Duration::from_millis(args.frame_ms);
    if frame.is_zero() {
        bail!("--frame-ms must be positive");
    }

    match (&args.state, args.realtime) {
        (Some(path), true) => run(&args, config, speed, SystemClock::new(), state_file(path)),
        (Some(path), false) => run(&args, config, speed, FixedClock::new(frame), state_file(path)),
        (None, true) => run(&args, config, speed, SystemClock::new(), MemoryStore::new()),
        (None, false) => run(&args, config, speed, FixedClock::new(frame), MemoryStore::new()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lane_control=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str::<SimConfig>(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn state_file(path: &Path) -> JsonFileStore {
    let store = JsonFileStore::new(path);
    info!(path = %store.path().display(), "persisting state to file");
    store
}

fn run<C, S>(args: &Args, config: SimConfig, speed: SpeedMultiplier, clock: C, store: S) -> Result<()>
where
    C: Clock,
    S: StateStore,
{
    let frame = Duration::from_millis(args.frame_ms);
    let input = script::timeline(&args.clicks, frame, speed);
    let mut driver = Driver::new(config, clock, input, store, LogSink::new(args.report_every));
    if speed != SpeedMultiplier::Normal {
        driver.queue(Command::SetSpeed { speed });
    }

    let mut kills = 0_u64;
    let mut waves = 0_u32;
    for _ in 0..args.ticks {
        let events = driver.tick().context("simulation frame failed")?;
        for event in &events {
            match event {
                Event::MinionKilled { .. } => kills += 1,
                Event::WaveScheduled { wave, .. } => waves = *wave,
                Event::TurretDestroyed { team, .. } => {
                    info!(team = ?team, "turret destroyed");
                }
                _ => {}
            }
        }
        if args.realtime {
            thread::sleep(frame);
        }
    }

    info!(
        frames = driver.sink().frames(),
        waves,
        kills,
        "run finished"
    );
    Ok(())
}
