#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick sequencing for Lane Control.
//!
//! [`step`] advances a world by one frame: operator controls, tool clicks,
//! spawning, movement, combat, cleanup and classification, in that order.
//! Movement and combat both read the snapshot taken after spawns
//! materialize, so neither observes the other's mutations within a tick.
//! [`Driver`] wraps `step` with the clock, input, persistence and render
//! ports.

pub mod ports;
mod scene;

use std::time::Duration;

use lane_control_core::{config::SimConfig, Command, Engagement, Event, InputSnapshot, Key};
use lane_control_rendering::RenderSink;
use lane_control_system_combat::Combat;
use lane_control_system_movement::{self as movement, Movement};
use lane_control_system_spawning::{self as spawning, Spawning};
use lane_control_system_targeting::{self as targeting, Targeting};
use lane_control_system_tools::{self as tools, Tools};
use lane_control_system_wave_state::{self as wave_state, WaveClassifier};
use lane_control_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use scene::capture_scene;

use ports::{Clock, InputSource, StateStore, StoreError};

/// Every pure system plus the scratch buffers reused across ticks.
#[derive(Debug)]
pub struct Systems {
    spawning: Spawning,
    targeting: Targeting,
    movement: Movement,
    combat: Combat,
    tools: Tools,
    classifier: WaveClassifier,
    engagements: Vec<Engagement>,
    commands: Vec<Command>,
}

impl Systems {
    /// Builds every system from the simulation configuration.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            spawning: Spawning::new(spawning::Config::from_sim_config(config)),
            targeting: Targeting::new(targeting::Config::from_sim_config(config)),
            movement: Movement::new(movement::Config::from_sim_config(config)),
            combat: Combat::new(),
            tools: Tools::new(tools::Config::from_sim_config(config)),
            classifier: WaveClassifier::new(wave_state::Config::from_sim_config(config)),
            engagements: Vec::new(),
            commands: Vec::new(),
        }
    }
}

/// Advances the world by one frame and returns the events it produced.
///
/// `frame_dt` is wall-clock time; it is scaled by the speed multiplier before
/// it reaches the physics phases, which are skipped entirely while paused.
/// Controls and tools are processed even while paused.
pub fn step(
    world: &mut World,
    systems: &mut Systems,
    frame_dt: Duration,
    input: &InputSnapshot,
) -> Vec<Event> {
    let mut events = Vec::new();

    controls(world, input, &mut systems.commands);
    flush(world, &mut systems.commands, &mut events);

    if input.click {
        if let Some(position) = input.cursor {
            let request = systems
                .tools
                .request(query::selected_tool(world), position);
            systems
                .tools
                .handle(request, &query::minion_view(world), &mut systems.commands);
            flush(world, &mut systems.commands, &mut events);
        }
    }

    let paused = query::is_paused(world);
    if !paused {
        let dt = query::clock(world).speed.scale(frame_dt);
        world::apply(world, Command::Tick { dt }, &mut events);

        let clock = query::clock(world);
        systems.spawning.schedule_waves(&clock, &mut systems.commands);
        flush(world, &mut systems.commands, &mut events);
        systems.spawning.materialize_due(
            &clock,
            &query::pending_spawns(world),
            &mut systems.commands,
        );
        flush(world, &mut systems.commands, &mut events);

        let now = query::elapsed(world);
        let tank = query::tank_point(world);
        let minions = query::minion_view(world);
        let turrets = query::turret_view(world);
        let projectiles = query::projectile_view(world);
        systems
            .targeting
            .handle(&minions, &turrets, tank, &mut systems.engagements);
        systems.movement.handle(
            dt,
            &minions,
            &turrets,
            &systems.engagements,
            &mut systems.commands,
        );
        systems.combat.handle(
            now,
            &systems.engagements,
            &minions,
            &turrets,
            &mut systems.commands,
        );
        systems.combat.advance_projectiles(
            dt,
            &projectiles,
            &minions,
            &turrets,
            tank,
            &mut systems.commands,
        );
        flush(world, &mut systems.commands, &mut events);
    }

    world::apply(world, Command::Cleanup, &mut events);

    if !paused {
        systems.classifier.handle(
            query::elapsed(world),
            &query::minion_view(world),
            &query::turret_view(world),
            query::trend(world),
            &mut systems.commands,
        );
        flush(world, &mut systems.commands, &mut events);
    }

    events
}

fn controls(world: &World, input: &InputSnapshot, out: &mut Vec<Command>) {
    for key in &input.pressed {
        match key {
            Key::Space => out.push(Command::SetPaused {
                paused: !query::is_paused(world),
            }),
            Key::F => out.push(Command::SetSpeed {
                speed: query::clock(world).speed.next(),
            }),
            Key::Escape => out.push(Command::ReleaseTank),
            digit => {
                if let Some(tool) = digit.tool() {
                    out.push(Command::SelectTool { tool });
                }
            }
        }
    }
}

fn flush(world: &mut World, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
    for command in commands.drain(..) {
        world::apply(world, command, events);
    }
}

/// Errors surfaced by [`Driver::tick`].
#[derive(Debug, Error)]
pub enum DriverError {
    /// Persisting the world failed.
    #[error("failed to persist simulation state")]
    Store(#[from] StoreError),
    /// The render sink rejected the scene.
    #[error(transparent)]
    Render(anyhow::Error),
}

/// Owns the ports and runs one [`step`] per frame.
///
/// The world lives in the state store between frames: every tick loads it,
/// steps it, saves it and presents the resulting scene.
#[derive(Debug)]
pub struct Driver<C, I, S, R> {
    config: SimConfig,
    systems: Systems,
    clock: C,
    input: I,
    store: S,
    sink: R,
    queued: Vec<Command>,
}

impl<C, I, S, R> Driver<C, I, S, R>
where
    C: Clock,
    I: InputSource,
    S: StateStore,
    R: RenderSink,
{
    /// Creates a driver for worlds built from `config`.
    pub fn new(config: SimConfig, clock: C, input: I, store: S, sink: R) -> Self {
        let systems = Systems::new(&config);
        Self {
            config,
            systems,
            clock,
            input,
            store,
            sink,
            queued: Vec::new(),
        }
    }

    /// Queues a command applied before the next frame's input.
    pub fn queue(&mut self, command: Command) {
        self.queued.push(command);
    }

    /// Runs one frame.
    pub fn tick(&mut self) -> Result<Vec<Event>, DriverError> {
        let mut world = self.load();
        let mut events = Vec::new();
        flush(&mut world, &mut self.queued, &mut events);

        let frame_dt = self.clock.frame_delta();
        let input = self.input.next_snapshot();
        events.extend(step(&mut world, &mut self.systems, frame_dt, &input));

        self.store.save(&world)?;
        self.sink
            .present(&capture_scene(&world))
            .map_err(DriverError::Render)?;
        Ok(events)
    }

    /// Runs `frames` frames, stopping at the first error.
    pub fn run(&mut self, frames: u64) -> Result<Vec<Event>, DriverError> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(self.tick()?);
        }
        Ok(events)
    }

    /// State store backing the driver.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Render sink fed by the driver.
    #[must_use]
    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// Configuration used for fresh worlds.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn load(&mut self) -> World {
        match self.store.load() {
            Ok(Some(world)) if self.accepts(&world) => world,
            Ok(Some(_)) => {
                warn!("stored state does not match the configuration, starting fresh");
                self.fresh()
            }
            Ok(None) => {
                info!("no stored state, starting fresh");
                self.fresh()
            }
            Err(error) => {
                warn!(%error, "stored state is unreadable, starting fresh");
                self.fresh()
            }
        }
    }

    fn accepts(&self, world: &World) -> bool {
        query::config(world) == &self.config && query::is_consistent(world)
    }

    fn fresh(&self) -> World {
        let world = World::with_config(self.config.clone());
        debug!(
            first_wave_at = ?query::clock(&world).next_wave_at,
            "fresh world created"
        );
        world
    }
}
