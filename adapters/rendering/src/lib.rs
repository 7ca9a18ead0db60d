#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Lane Control adapters.

use std::{fmt, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use lane_control_core::{
    geometry::LaneBounds, MarkerKind, MinionId, MinionKind, ProjectileId, ProjectileSource,
    SpeedMultiplier, Team, ToolKind, TurretId, WaveState,
};

/// RGBA color with channels in the range 0.0..=1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red, green and blue channels.
    pub rgb: [f32; 3],
    /// Opacity.
    pub alpha: f32,
}

const fn channel(value: u32, shift: u32) -> f32 {
    ((value >> shift) & 0xff) as f32 / 255.0
}

impl Color {
    /// Opaque color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn hex(value: u32) -> Self {
        Self {
            rgb: [channel(value, 16), channel(value, 8), channel(value, 0)],
            alpha: 1.0,
        }
    }

    /// Mixes the color toward white, as drawn for wrecked structures.
    #[must_use]
    pub fn washed(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self {
            rgb: self.rgb.map(|value| value + (1.0 - value) * amount),
            ..self
        }
    }

    /// Returns the same color with its alpha scaled by `factor`.
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        Self {
            alpha: self.alpha * factor.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Palette shared by every adapter.
pub mod palette {
    use super::Color;
    use lane_control_core::{MarkerKind, ProjectileSource, Team};

    /// Background of the lane strip.
    pub const LANE: Color = Color::hex(0x2e3e30);

    /// Base color of units owned by the team.
    #[must_use]
    pub const fn team(team: Team) -> Color {
        match team {
            Team::Blue => Color::hex(0x4287f5),
            Team::Red => Color::hex(0xde4437),
        }
    }

    /// Color of a projectile in flight.
    #[must_use]
    pub const fn projectile(source: ProjectileSource) -> Color {
        match source {
            ProjectileSource::Turret => Color::hex(0xffd65c),
            ProjectileSource::Caster => Color::hex(0xba78ff),
        }
    }

    /// Color of a fresh marker.
    #[must_use]
    pub const fn marker(kind: MarkerKind) -> Color {
        match kind {
            MarkerKind::Tool(_) => Color::hex(0xffffa0),
            MarkerKind::MeleeSwing => Color::hex(0xf0f0f0),
            MarkerKind::TankAbsorb => Color::hex(0x78e6c8),
        }
    }
}

/// Lane strip drawn beneath every entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanePresentation {
    /// Playable bounds in lane units.
    pub bounds: LaneBounds,
    /// Fill of the strip.
    pub color: Color,
}

/// Minion drawn as a disc with a health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinionPresentation {
    /// Identifier allocated by the world.
    pub id: MinionId,
    /// Owning team.
    pub team: Team,
    /// Unit type.
    pub kind: MinionKind,
    /// Lane position.
    pub position: Vec2,
    /// Remaining health as a fraction of the maximum.
    pub health_fraction: f32,
    /// Fill color.
    pub color: Color,
}

/// Turret drawn with its body, range ring and, while shooting, a target line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretPresentation {
    /// Identifier allocated by the world.
    pub id: TurretId,
    /// Owning team.
    pub team: Team,
    /// Lane position.
    pub position: Vec2,
    /// Attack range ring radius.
    pub range: f32,
    /// Body radius.
    pub body_radius: f32,
    /// Remaining health as a fraction of the maximum.
    pub health_fraction: f32,
    /// Position of the current target, if any.
    pub target: Option<Vec2>,
    /// Fill color.
    pub color: Color,
}

/// Projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectilePresentation {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Current position.
    pub position: Vec2,
    /// Emitter of the projectile.
    pub source: ProjectileSource,
    /// Fill color.
    pub color: Color,
}

/// Transient ring or flash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerPresentation {
    /// Kind of marker.
    pub kind: MarkerKind,
    /// Center of the ring.
    pub position: Vec2,
    /// Ring radius.
    pub radius: f32,
    /// Stroke color, faded by age.
    pub color: Color,
}

/// Heads-up display values shown next to the lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// Simulation time elapsed since the start.
    pub elapsed: Duration,
    /// Number of the most recently scheduled wave.
    pub wave_number: u32,
    /// Time left until the next wave is due.
    pub next_wave_in: Duration,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Active speed multiplier.
    pub speed: SpeedMultiplier,
    /// Tool applied on the next click.
    pub tool: ToolKind,
    /// Tank point while engaged.
    pub tank: Option<Vec2>,
    /// Latest wave-state label.
    pub wave_state: WaveState,
    /// Alive blue minions.
    pub blue_alive: u32,
    /// Alive red minions.
    pub red_alive: u32,
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.1}s wave={} next={:.1}s speed=x{} tool={} state={} blue={} red={}",
            self.elapsed.as_secs_f32(),
            self.wave_number,
            self.next_wave_in.as_secs_f32(),
            self.speed.factor(),
            self.tool.label(),
            self.wave_state.label(),
            self.blue_alive,
            self.red_alive,
        )?;
        if let Some(tank) = self.tank {
            write!(f, " tank=({:.0},{:.0})", tank.x, tank.y)?;
        }
        if self.paused {
            f.write_str(" paused")?;
        }
        Ok(())
    }
}

/// Read-only scene description handed to render sinks once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Lane strip.
    pub lane: LanePresentation,
    /// Minions in identifier order.
    pub minions: Vec<MinionPresentation>,
    /// Both turrets.
    pub turrets: Vec<TurretPresentation>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectilePresentation>,
    /// Markers that have not yet expired.
    pub markers: Vec<MarkerPresentation>,
    /// Heads-up display values.
    pub hud: Hud,
}

impl Scene {
    /// Creates a scene with no entities.
    #[must_use]
    pub const fn new(lane: LanePresentation, hud: Hud) -> Self {
        Self {
            lane,
            minions: Vec::new(),
            turrets: Vec::new(),
            projectiles: Vec::new(),
            markers: Vec::new(),
            hud,
        }
    }

    /// Number of minions of the team drawn in the scene.
    #[must_use]
    pub fn minion_count(&self, team: Team) -> usize {
        self.minions
            .iter()
            .filter(|minion| minion.team == team)
            .count()
    }
}

/// Sink receiving the scene after every tick.
pub trait RenderSink {
    /// Presents the scene.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Sink that keeps every presented scene in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    scenes: Vec<Scene>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scenes presented so far, oldest first.
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Most recently presented scene.
    #[must_use]
    pub fn last(&self) -> Option<&Scene> {
        self.scenes.last()
    }
}

impl RenderSink for RecordingSink {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        self.scenes.push(scene.clone());
        Ok(())
    }
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        (**self).present(scene)
    }
}
