#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Control engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable views and
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what actually happened.

pub mod config;
pub mod geometry;
pub mod trend;

use std::{collections::BTreeSet, time::Duration};

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use crate::trend::{CrashRecord, WaveSample, WaveTrend};

/// One of the two opposing sides of the lane.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Team {
    /// Team whose base sits at the left endpoint of the lane.
    #[default]
    Blue,
    /// Team whose base sits at the right endpoint of the lane.
    Red,
}

impl Team {
    /// Both teams in deterministic order.
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }

    /// Sign of the lane-axis direction in which the team advances.
    #[must_use]
    pub const fn advance_sign(self) -> f32 {
        match self {
            Self::Blue => 1.0,
            Self::Red => -1.0,
        }
    }
}

/// Archetype of a minion.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MinionKind {
    /// Close-range frontliner.
    Melee,
    /// Ranged minion firing projectiles.
    Caster,
    /// Heavy siege minion that joins every few waves.
    Cannon,
}

impl MinionKind {
    /// Describes how attacks of this kind deliver their damage.
    #[must_use]
    pub const fn attack_style(self) -> AttackStyle {
        match self {
            Self::Melee | Self::Cannon => AttackStyle::Instant,
            Self::Caster => AttackStyle::Projectile,
        }
    }
}

/// Delivery mechanism of an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Damage lands the moment the attack triggers.
    Instant,
    /// Damage lands when a projectile reaches its target.
    Projectile,
}

/// Unique identifier assigned to a minion.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MinionId(u32);

impl MinionId {
    /// Creates a new minion identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a turret.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a scheduled spawn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SpawnId(u32);

impl SpawnId {
    /// Creates a new spawn identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Remaining hit points of a minion or turret.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Health(u32);

impl Health {
    /// Health of a destroyed entity.
    pub const ZERO: Self = Self(0);

    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the health value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the health is exhausted.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }
}

/// Unit able to launch attacks.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Attacker {
    /// A minion attacker.
    Minion(MinionId),
    /// A turret attacker.
    Turret(TurretId),
}

/// Entity or phantom point an attack is aimed at.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TargetRef {
    /// An enemy minion.
    Minion(MinionId),
    /// An enemy turret.
    Turret(TurretId),
    /// The operator's tank point; damage aimed here is absorbed.
    TankPoint,
}

/// Origin class of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileSource {
    /// Fired by a turret.
    Turret,
    /// Fired by a caster minion.
    Caster,
}

/// Operator interventions applied at a clicked point.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ToolKind {
    /// Executes low-health enemy minions around the click.
    #[default]
    LastHit,
    /// Damages enemy minions around the click without killing them.
    AoE,
    /// Kills enemy casters around the click.
    KillCasters,
    /// Kills every enemy minion around the click.
    FullClear,
    /// Plants a phantom aggro point absorbing enemy attacks.
    Tank,
}

impl ToolKind {
    /// Every tool in hotkey order.
    pub const ALL: [ToolKind; 5] = [
        ToolKind::LastHit,
        ToolKind::AoE,
        ToolKind::KillCasters,
        ToolKind::FullClear,
        ToolKind::Tank,
    ];

    /// Short human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LastHit => "last-hit",
            Self::AoE => "aoe",
            Self::KillCasters => "kill-casters",
            Self::FullClear => "full-clear",
            Self::Tank => "tank",
        }
    }

    /// Parses a label produced by [`ToolKind::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// One-shot operator intervention consumed within the tick it is issued.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Tool being applied.
    pub tool: ToolKind,
    /// Clicked lane position.
    pub position: Vec2,
    /// Team issuing the request; its opponent suffers the effect.
    pub team: Team,
}

/// Reasons a tool request was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolRejection {
    /// The click landed outside the lane bounds.
    OutOfBounds,
}

/// Single mutation produced by a tool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ToolEffect {
    /// Sets the minion's health to zero.
    Kill {
        /// Minion being executed.
        minion: MinionId,
    },
    /// Removes health while preserving at least `floor` hit points.
    Wound {
        /// Minion being damaged.
        minion: MinionId,
        /// Damage requested before the floor applies.
        amount: u32,
        /// Minimum health that must remain afterwards.
        floor: Health,
    },
    /// Plants the phantom aggro point.
    Tank {
        /// Position of the tank point.
        position: Vec2,
    },
}

/// Reason a minion died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillCause {
    /// Killed by an instant attack.
    Attack(Attacker),
    /// Killed by a landing projectile.
    Projectile(ProjectileId),
    /// Executed by an operator tool.
    Tool(ToolKind),
}

/// Simulation speed multiplier selected by the operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedMultiplier {
    /// Real time.
    #[default]
    Normal,
    /// Twice real time.
    Double,
    /// Four times real time.
    Quadruple,
}

impl SpeedMultiplier {
    /// Integer factor applied to frame deltas.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
            Self::Quadruple => 4,
        }
    }

    /// Next multiplier in the 1×, 2×, 4× cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Normal => Self::Double,
            Self::Double => Self::Quadruple,
            Self::Quadruple => Self::Normal,
        }
    }

    /// Parses an integer factor into a multiplier.
    #[must_use]
    pub const fn from_factor(factor: u32) -> Option<Self> {
        match factor {
            1 => Some(Self::Normal),
            2 => Some(Self::Double),
            4 => Some(Self::Quadruple),
            _ => None,
        }
    }

    /// Scales a frame delta into simulated time.
    #[must_use]
    pub fn scale(self, frame_dt: Duration) -> Duration {
        frame_dt.saturating_mul(self.factor())
    }
}

/// Tactical label describing the wave equilibrium.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveState {
    /// Even engagement near the lane center.
    #[default]
    Neutral,
    /// The blue wave is pushing toward the red turret.
    PushingBlue,
    /// The red wave is pushing toward the blue turret.
    PushingRed,
    /// Blue holds a growing numbers advantage across spawn cycles.
    SlowPushBlue,
    /// Red holds a growing numbers advantage across spawn cycles.
    SlowPushRed,
    /// The wave is held just outside the blue turret's range.
    FrozenBlue,
    /// The wave is held just outside the red turret's range.
    FrozenRed,
    /// Minions are fighting inside a turret's range.
    Crashing,
    /// A wave is rebounding after crashing.
    Bouncing,
}

impl WaveState {
    /// Pushing label for the provided team.
    #[must_use]
    pub const fn pushing(team: Team) -> Self {
        match team {
            Team::Blue => Self::PushingBlue,
            Team::Red => Self::PushingRed,
        }
    }

    /// Slow-push label for the provided team.
    #[must_use]
    pub const fn slow_push(team: Team) -> Self {
        match team {
            Team::Blue => Self::SlowPushBlue,
            Team::Red => Self::SlowPushRed,
        }
    }

    /// Frozen label for a wave held in front of the provided team's turret.
    #[must_use]
    pub const fn frozen(team: Team) -> Self {
        match team {
            Team::Blue => Self::FrozenBlue,
            Team::Red => Self::FrozenRed,
        }
    }

    /// Short human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::PushingBlue => "pushing-blue",
            Self::PushingRed => "pushing-red",
            Self::SlowPushBlue => "slow-push-blue",
            Self::SlowPushRed => "slow-push-red",
            Self::FrozenBlue => "frozen-blue",
            Self::FrozenRed => "frozen-red",
            Self::Crashing => "crashing",
            Self::Bouncing => "bouncing",
        }
    }
}

/// Kinds of transient visual markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Ring left where a tool was applied.
    Tool(ToolKind),
    /// Flash left where an instant attack landed.
    MeleeSwing,
    /// Flash left where the tank point absorbed a hit.
    TankAbsorb,
}

/// Planned spawn emitted by the scheduler before the world assigns an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlan {
    /// Team receiving the minion.
    pub team: Team,
    /// Type of minion to create.
    pub kind: MinionKind,
    /// Simulation time at which the minion materializes.
    pub spawn_at: Duration,
    /// Offset from the lane axis applied to the spawn point.
    pub lateral_offset: f32,
}

/// Keys the operator may press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    /// Toggles the pause flag.
    Space,
    /// Releases the tank point.
    Escape,
    /// Cycles the speed multiplier.
    F,
    /// Selects the last-hit tool.
    Digit1,
    /// Selects the AoE tool.
    Digit2,
    /// Selects the kill-casters tool.
    Digit3,
    /// Selects the full-clear tool.
    Digit4,
    /// Selects the tank tool.
    Digit5,
}

impl Key {
    /// Tool selected by the key, if it is a tool hotkey.
    #[must_use]
    pub const fn tool(self) -> Option<ToolKind> {
        match self {
            Self::Digit1 => Some(ToolKind::LastHit),
            Self::Digit2 => Some(ToolKind::AoE),
            Self::Digit3 => Some(ToolKind::KillCasters),
            Self::Digit4 => Some(ToolKind::FullClear),
            Self::Digit5 => Some(ToolKind::Tank),
            Self::Space | Self::Escape | Self::F => None,
        }
    }

    /// Hotkey that selects the provided tool.
    #[must_use]
    pub const fn for_tool(tool: ToolKind) -> Self {
        match tool {
            ToolKind::LastHit => Self::Digit1,
            ToolKind::AoE => Self::Digit2,
            ToolKind::KillCasters => Self::Digit3,
            ToolKind::FullClear => Self::Digit4,
            ToolKind::Tank => Self::Digit5,
        }
    }
}

/// Operator input captured once per tick by the driver.
///
/// The core never polls devices; it receives one snapshot per tick and treats
/// it as immutable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Cursor position in lane units, if the cursor is over the canvas.
    pub cursor: Option<Vec2>,
    /// Whether a click occurred during the frame.
    pub click: bool,
    /// Keys held down at the end of the frame.
    pub held: BTreeSet<Key>,
    /// Keys newly pressed during the frame.
    pub pressed: BTreeSet<Key>,
}

impl InputSnapshot {
    /// Snapshot describing a click at the provided position.
    #[must_use]
    pub fn click_at(position: Vec2) -> Self {
        Self {
            cursor: Some(position),
            click: true,
            ..Self::default()
        }
    }

    /// Adds a newly pressed key to the snapshot.
    #[must_use]
    pub fn with_pressed(mut self, key: Key) -> Self {
        let _ = self.pressed.insert(key);
        let _ = self.held.insert(key);
        self
    }

    /// Reports whether the key was newly pressed this frame.
    #[must_use]
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Sets the pause flag.
    SetPaused {
        /// Whether the simulation should be paused.
        paused: bool,
    },
    /// Sets the speed multiplier.
    SetSpeed {
        /// Multiplier applied to subsequent frame deltas.
        speed: SpeedMultiplier,
    },
    /// Selects the operator tool. Selecting another tool releases the tank point.
    SelectTool {
        /// Tool to activate.
        tool: ToolKind,
    },
    /// Releases the tank point.
    ReleaseTank,
    /// Enqueues a wave and advances the wave counter.
    ScheduleWave {
        /// Index of the wave being scheduled.
        wave: u32,
        /// Simulation time at which the following wave becomes due.
        next_wave_at: Duration,
        /// Staggered spawns composing the wave.
        spawns: Vec<SpawnPlan>,
    },
    /// Turns a due pending spawn into a minion.
    MaterializeSpawn {
        /// Pending spawn to materialize.
        spawn: SpawnId,
    },
    /// Records the current aggro decision of an attacker.
    SetTarget {
        /// Unit whose target changes.
        attacker: Attacker,
        /// New target, if any.
        target: Option<TargetRef>,
    },
    /// Places a minion at a new position.
    MoveMinion {
        /// Minion being moved.
        minion: MinionId,
        /// Destination computed from the start-of-tick snapshot.
        to: Vec2,
    },
    /// Triggers an attack and resets the attacker's cooldown.
    Strike {
        /// Unit launching the attack.
        attacker: Attacker,
        /// Target of the attack.
        target: TargetRef,
    },
    /// Moves a projectile along its flight path.
    AdvanceProjectile {
        /// Projectile in flight.
        projectile: ProjectileId,
        /// New projectile position.
        to: Vec2,
    },
    /// Resolves a projectile that reached its target.
    LandProjectile {
        /// Projectile that arrived.
        projectile: ProjectileId,
    },
    /// Removes a projectile whose target became invalid.
    DiscardProjectile {
        /// Projectile being discarded.
        projectile: ProjectileId,
    },
    /// Applies the effects of an operator tool in one step.
    ApplyTool {
        /// Request that produced the effects.
        request: ToolRequest,
        /// Mutations computed by the tool system.
        effects: Vec<ToolEffect>,
    },
    /// Records that a tool request was ignored.
    RejectTool {
        /// Request that was ignored.
        request: ToolRequest,
        /// Reason the request was ignored.
        reason: ToolRejection,
    },
    /// Removes dead minions and expired markers.
    Cleanup,
    /// Appends a classifier sample to the trend window.
    RecordWaveSample {
        /// Sample computed from the current tick.
        sample: WaveSample,
    },
    /// Publishes the wave-state label for the current tick.
    PublishWaveState {
        /// Label computed by the classifier.
        state: WaveState,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces a change of the pause flag.
    PauseChanged {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Announces a change of the speed multiplier.
    SpeedChanged {
        /// Multiplier now in effect.
        speed: SpeedMultiplier,
    },
    /// Announces a change of the selected tool.
    ToolSelected {
        /// Tool now selected.
        tool: ToolKind,
    },
    /// Confirms that the tank point was planted or moved.
    TankEngaged {
        /// Position of the tank point.
        position: Vec2,
    },
    /// Confirms that the tank point was released.
    TankReleased,
    /// Confirms that a wave was scheduled.
    WaveScheduled {
        /// Index of the scheduled wave.
        wave: u32,
        /// Number of pending spawns enqueued.
        spawns: u32,
        /// Simulation time at which the following wave becomes due.
        next_wave_at: Duration,
    },
    /// Confirms that a minion was created.
    MinionSpawned {
        /// Identifier assigned to the minion.
        minion: MinionId,
        /// Team of the minion.
        team: Team,
        /// Type of the minion.
        kind: MinionKind,
        /// Position the minion occupies after spawning.
        position: Vec2,
    },
    /// Reports a change in an attacker's aggro decision.
    TargetChanged {
        /// Unit whose target changed.
        attacker: Attacker,
        /// New target, if any.
        target: Option<TargetRef>,
    },
    /// Confirms that a projectile was launched.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Unit that fired the projectile.
        attacker: Attacker,
        /// Target the projectile homes in on.
        target: TargetRef,
    },
    /// Reports damage applied to a real entity.
    DamageDealt {
        /// Entity that received the damage.
        target: TargetRef,
        /// Damage requested by the source.
        amount: u32,
        /// Health remaining after the damage.
        remaining: Health,
    },
    /// Reports damage soaked by the tank point.
    DamageAbsorbed {
        /// Unit whose attack was absorbed.
        attacker: Attacker,
        /// Damage that was absorbed.
        amount: u32,
    },
    /// Reports a projectile whose damage was forfeited.
    ProjectileWasted {
        /// Projectile that was wasted.
        projectile: ProjectileId,
    },
    /// Reports that a minion's health reached zero.
    MinionKilled {
        /// Minion that died.
        minion: MinionId,
        /// Team of the minion.
        team: Team,
        /// Type of the minion.
        kind: MinionKind,
        /// What killed the minion.
        cause: KillCause,
    },
    /// Reports that a dead minion was removed from the store.
    MinionRemoved {
        /// Minion that was removed.
        minion: MinionId,
    },
    /// Reports that a turret's health reached zero.
    TurretDestroyed {
        /// Turret that was destroyed.
        turret: TurretId,
        /// Team owning the turret.
        team: Team,
    },
    /// Confirms that a tool was applied.
    ToolApplied {
        /// Tool that was applied.
        tool: ToolKind,
        /// Clicked position.
        position: Vec2,
        /// Number of minions affected.
        affected: u32,
    },
    /// Reports that a tool request was ignored.
    ToolIgnored {
        /// Tool that was requested.
        tool: ToolKind,
        /// Clicked position.
        position: Vec2,
        /// Reason the request was ignored.
        reason: ToolRejection,
    },
    /// Reports a change of the wave-state label.
    WaveStateChanged {
        /// Previous label.
        from: WaveState,
        /// New label.
        to: WaveState,
    },
}

/// Immutable representation of a single minion's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinionSnapshot {
    /// Unique identifier assigned to the minion.
    pub id: MinionId,
    /// Team of the minion.
    pub team: Team,
    /// Type of the minion.
    pub kind: MinionKind,
    /// Current lane position.
    pub position: Vec2,
    /// Remaining health.
    pub health: Health,
    /// Maximum health.
    pub max_health: Health,
    /// Damage per attack.
    pub damage: u32,
    /// Attack range.
    pub range: f32,
    /// Minimum delay between attacks.
    pub attack_interval: Duration,
    /// Simulation time of the last triggered attack.
    pub last_attack: Option<Duration>,
    /// Lane units travelled per second.
    pub move_speed: f32,
    /// Projectile speed for ranged attackers.
    pub projectile_speed: f32,
    /// Current aggro decision.
    pub target: Option<TargetRef>,
}

impl MinionSnapshot {
    /// Reports whether the minion is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_zero()
    }

    /// Reports whether the attack cooldown elapsed at `now`.
    #[must_use]
    pub fn ready_at(&self, now: Duration) -> bool {
        cooldown_elapsed(self.last_attack, self.attack_interval, now)
    }
}

/// Read-only snapshot describing all minions on the lane.
#[derive(Clone, Debug, Default)]
pub struct MinionView {
    snapshots: Vec<MinionSnapshot>,
}

impl MinionView {
    /// Creates a new minion view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MinionSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured minion snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &MinionSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over alive minions in identifier order.
    pub fn alive(&self) -> impl Iterator<Item = &MinionSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.is_alive())
    }

    /// Looks up a minion by identifier.
    #[must_use]
    pub fn get(&self, id: MinionId) -> Option<&MinionSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured minions, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no minions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MinionSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single turret's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated to the turret.
    pub id: TurretId,
    /// Team owning the turret.
    pub team: Team,
    /// Fixed lane position.
    pub position: Vec2,
    /// Remaining health.
    pub health: Health,
    /// Maximum health.
    pub max_health: Health,
    /// Damage per shot.
    pub damage: u32,
    /// Attack range measured from the turret center.
    pub range: f32,
    /// Radius of the turret body.
    pub body_radius: f32,
    /// Minimum delay between shots.
    pub attack_interval: Duration,
    /// Simulation time of the last shot.
    pub last_attack: Option<Duration>,
    /// Projectile speed of turret shots.
    pub projectile_speed: f32,
    /// Minion currently under fire.
    pub target: Option<MinionId>,
}

impl TurretSnapshot {
    /// Reports whether the turret still stands.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_zero()
    }

    /// Reports whether the shot cooldown elapsed at `now`.
    #[must_use]
    pub fn ready_at(&self, now: Duration) -> bool {
        cooldown_elapsed(self.last_attack, self.attack_interval, now)
    }

    /// Reports whether a point lies inside the turret's attack range.
    #[must_use]
    pub fn covers(&self, point: Vec2) -> bool {
        geometry::within_radius(self.position, point, self.range)
    }
}

/// Read-only snapshot describing both turrets.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured turret snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a turret by identifier.
    #[must_use]
    pub fn get(&self, id: TurretId) -> Option<&TurretSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Returns the turret owned by the provided team.
    #[must_use]
    pub fn of_team(&self, team: Team) -> Option<&TurretSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.team == team)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurretSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Unit that fired the projectile.
    pub attacker: Attacker,
    /// Origin class of the projectile.
    pub source: ProjectileSource,
    /// Position the projectile was launched from.
    pub origin: Vec2,
    /// Current position.
    pub position: Vec2,
    /// Target the projectile homes in on.
    pub target: TargetRef,
    /// Travel speed in lane units per second.
    pub speed: f32,
    /// Damage applied on arrival.
    pub damage: u32,
}

/// Read-only snapshot describing every projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a scheduled spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSpawnSnapshot {
    /// Identifier allocated to the pending spawn.
    pub id: SpawnId,
    /// Team receiving the minion.
    pub team: Team,
    /// Type of minion to create.
    pub kind: MinionKind,
    /// Simulation time at which the minion materializes.
    pub spawn_at: Duration,
}

/// Immutable representation of a transient visual marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerSnapshot {
    /// Kind of marker.
    pub kind: MarkerKind,
    /// Lane position of the marker.
    pub position: Vec2,
    /// Radius drawn around the position.
    pub radius: f32,
    /// Fraction of the marker lifetime already elapsed, in `[0, 1]`.
    pub age: f32,
}

/// Clock and counter state of the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSnapshot {
    /// Simulated time elapsed since the start.
    pub elapsed: Duration,
    /// Number of simulated ticks processed.
    pub tick: u64,
    /// Index of the most recently scheduled wave.
    pub wave_number: u32,
    /// Simulation time at which the next wave becomes due.
    pub next_wave_at: Duration,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Speed multiplier in effect.
    pub speed: SpeedMultiplier,
}

/// Aggro decision produced by the targeting system for a single unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Engagement {
    /// Unit the decision belongs to.
    pub attacker: Attacker,
    /// Team of the unit.
    pub team: Team,
    /// Position of the unit at the start of the tick.
    pub attacker_position: Vec2,
    /// Chosen target.
    pub target: TargetRef,
    /// Position of the target at the start of the tick.
    pub target_position: Vec2,
    /// Whether the target lies inside the unit's attack range.
    pub in_range: bool,
}

fn cooldown_elapsed(last_attack: Option<Duration>, interval: Duration, now: Duration) -> bool {
    match last_attack {
        None => true,
        Some(last) => now.saturating_sub(last) >= interval,
    }
}
