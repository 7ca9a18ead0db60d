//! Tunable simulation parameters.
//!
//! Every numeric rule of the lane is exposed here as a named constant that
//! seeds the [`SimConfig`] defaults. Adapters may deserialize partial
//! overrides on top of these defaults; absent fields keep their default value.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{geometry::LaneBounds, MinionKind, Team, ToolKind};

/// Seconds between successive waves.
pub const SPAWN_INTERVAL_SECS: f32 = 30.0;
/// Every wave whose index is a multiple of this value carries a cannon minion.
pub const CANNON_WAVE_INTERVAL: u32 = 3;
/// Maximum health of each turret.
pub const TURRET_MAX_HP: u32 = 5_000;
/// Damage dealt by a single turret shot.
pub const TURRET_DAMAGE: u32 = 152;
/// Turret attacks per second.
pub const TURRET_ATTACKS_PER_SECOND: f32 = 0.83;
/// Turret attack range measured from the turret center.
pub const TURRET_RANGE: f32 = 150.0;
/// Radius of the area affected by the AoE tool.
pub const AOE_RADIUS: f32 = 80.0;
/// Damage dealt by the AoE tool before the non-lethal floor applies.
pub const AOE_DAMAGE: u32 = 150;
/// Radius affected by the kill-casters and full-clear tools.
pub const FULL_CLEAR_RANGE: f32 = 200.0;
/// Minions strictly below this health are eligible for last-hits.
pub const LASTHIT_THRESHOLD: u32 = 50;
/// Radius around the click searched by the last-hit tool.
pub const LASTHIT_RADIUS: f32 = 30.0;
/// Width of the simulated canvas.
pub const CANVAS_WIDTH: f32 = 1_200.0;
/// Height of the simulated canvas.
pub const CANVAS_HEIGHT: f32 = 400.0;

/// Errors reported when a configuration violates basic sanity rules.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero, negative or not finite.
    #[error("`{field}` must be a positive finite number (received {value})")]
    NonPositive {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A count that must be non-zero was zero.
    #[error("`{field}` must be greater than zero")]
    ZeroCount {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// A lane coordinate lies outside the canvas.
    #[error("`{field}` ({value}) lies outside the canvas")]
    OutsideCanvas {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// The classifier history cannot cover the freeze hold window.
    #[error("classifier history ({history_secs}s) is shorter than the freeze hold ({hold_secs}s)")]
    HistoryTooShort {
        /// Configured history duration.
        history_secs: f32,
        /// Configured freeze hold duration.
        hold_secs: f32,
    },
}

/// Complete set of tunables consumed by the world and the systems.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Lane geometry and structure placement.
    pub lane: LaneConfig,
    /// Wave cadence and composition.
    pub waves: WaveConfig,
    /// Turret statistics shared by both teams.
    pub turret: TurretConfig,
    /// Roster of per-type minion statistics.
    pub minions: MinionRoster,
    /// Operator tool tunables.
    pub tools: ToolConfig,
    /// Movement and separation tunables.
    pub movement: MovementConfig,
    /// Wave classifier thresholds.
    pub classifier: ClassifierConfig,
    /// Team controlled by the operator. Tools target the opposing team.
    pub operator_team: Team,
    /// Seed for the deterministic spawn jitter.
    pub rng_seed: u64,
}

impl SimConfig {
    /// Playable bounds derived from the lane configuration.
    #[must_use]
    pub fn bounds(&self) -> LaneBounds {
        LaneBounds::new(self.lane.width, self.lane.top, self.lane.bottom)
    }

    /// Statistics applied to freshly spawned minions of the provided kind.
    #[must_use]
    pub fn minion_stats(&self, kind: MinionKind) -> &MinionStats {
        match kind {
            MinionKind::Melee => &self.minions.melee,
            MinionKind::Caster => &self.minions.caster,
            MinionKind::Cannon => &self.minions.cannon,
        }
    }

    /// Location where minions of the team materialize.
    #[must_use]
    pub fn spawn_point(&self, team: Team) -> Vec2 {
        let x = match team {
            Team::Blue => self.lane.blue_spawn_x,
            Team::Red => self.lane.red_spawn_x,
        };
        Vec2::new(x, self.bounds().axis_y())
    }

    /// Fixed location of the team's turret.
    #[must_use]
    pub fn turret_position(&self, team: Team) -> Vec2 {
        let x = match team {
            Team::Blue => self.lane.blue_turret_x,
            Team::Red => self.lane.red_turret_x,
        };
        Vec2::new(x, self.bounds().axis_y())
    }

    /// Duration between waves.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        secs(self.waves.spawn_interval_secs)
    }

    /// Checks the configuration for values that would stall or corrupt the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("lane.width", self.lane.width)?;
        positive("lane.height", self.lane.height)?;
        for (field, value) in [
            ("lane.top", self.lane.top),
            ("lane.bottom", self.lane.bottom),
        ] {
            if !(0.0..=self.lane.height).contains(&value) {
                return Err(ConfigError::OutsideCanvas { field, value });
            }
        }
        for (field, value) in [
            ("lane.blue_spawn_x", self.lane.blue_spawn_x),
            ("lane.red_spawn_x", self.lane.red_spawn_x),
            ("lane.blue_turret_x", self.lane.blue_turret_x),
            ("lane.red_turret_x", self.lane.red_turret_x),
        ] {
            if !(0.0..=self.lane.width).contains(&value) {
                return Err(ConfigError::OutsideCanvas { field, value });
            }
        }

        positive("waves.spawn_interval_secs", self.waves.spawn_interval_secs)?;
        if self.waves.cannon_wave_interval == 0 {
            return Err(ConfigError::ZeroCount {
                field: "waves.cannon_wave_interval",
            });
        }

        positive("turret.attacks_per_second", self.turret.attacks_per_second)?;
        positive("turret.range", self.turret.range)?;
        positive("turret.projectile_speed", self.turret.projectile_speed)?;
        if self.turret.max_hp == 0 {
            return Err(ConfigError::ZeroCount {
                field: "turret.max_hp",
            });
        }

        for (prefix, stats) in [
            ("minions.melee", &self.minions.melee),
            ("minions.caster", &self.minions.caster),
            ("minions.cannon", &self.minions.cannon),
        ] {
            stats.validate(prefix)?;
        }
        positive(
            "minions.caster.projectile_speed",
            self.minions.caster.projectile_speed,
        )?;

        positive("tools.aoe_radius", self.tools.aoe_radius)?;
        positive("tools.full_clear_range", self.tools.full_clear_range)?;
        positive("tools.lasthit_radius", self.tools.lasthit_radius)?;
        positive("movement.separation_radius", self.movement.separation_radius)?;

        if self.classifier.history_secs < self.classifier.freeze_hold_secs {
            return Err(ConfigError::HistoryTooShort {
                history_secs: self.classifier.history_secs,
                hold_secs: self.classifier.freeze_hold_secs,
            });
        }
        Ok(())
    }
}

/// Lane geometry and structure placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Canvas width; minions are clamped to `[0, width]`.
    pub width: f32,
    /// Canvas height.
    pub height: f32,
    /// Upper vertical bound of the lane.
    pub top: f32,
    /// Lower vertical bound of the lane.
    pub bottom: f32,
    /// Horizontal coordinate of the blue spawn endpoint.
    pub blue_spawn_x: f32,
    /// Horizontal coordinate of the red spawn endpoint.
    pub red_spawn_x: f32,
    /// Horizontal coordinate of the blue turret.
    pub blue_turret_x: f32,
    /// Horizontal coordinate of the red turret.
    pub red_turret_x: f32,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            top: 140.0,
            bottom: 260.0,
            blue_spawn_x: 30.0,
            red_spawn_x: CANVAS_WIDTH - 30.0,
            blue_turret_x: 100.0,
            red_turret_x: CANVAS_WIDTH - 100.0,
        }
    }
}

/// Wave cadence and composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Seconds between successive waves.
    pub spawn_interval_secs: f32,
    /// Simulation time at which the first wave is due.
    pub first_wave_secs: f32,
    /// Waves whose index is a multiple of this value include a cannon.
    pub cannon_wave_interval: u32,
    /// Melee minions per team per wave.
    pub melee_per_wave: u32,
    /// Caster minions per team per wave.
    pub casters_per_wave: u32,
    /// Delay between successive materializations within a wave.
    pub stagger_secs: f32,
    /// Maximum lateral offset from the lane axis applied at spawn.
    pub lateral_jitter: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            spawn_interval_secs: SPAWN_INTERVAL_SECS,
            first_wave_secs: 0.0,
            cannon_wave_interval: CANNON_WAVE_INTERVAL,
            melee_per_wave: 3,
            casters_per_wave: 3,
            stagger_secs: 0.08,
            lateral_jitter: 14.0,
        }
    }
}

impl WaveConfig {
    /// Simulation time at which the first wave is due.
    #[must_use]
    pub fn first_wave(&self) -> Duration {
        secs(self.first_wave_secs)
    }
}

/// Turret statistics shared by both teams.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Maximum and initial health.
    pub max_hp: u32,
    /// Damage per shot.
    pub damage: u32,
    /// Shots per second.
    pub attacks_per_second: f32,
    /// Attack range measured from the turret center.
    pub range: f32,
    /// Travel speed of turret shots.
    pub projectile_speed: f32,
    /// Radius of the turret body used for reach and separation.
    pub body_radius: f32,
}

impl TurretConfig {
    /// Minimum delay between two turret shots.
    #[must_use]
    pub fn attack_interval(&self) -> Duration {
        secs(1.0 / self.attacks_per_second)
    }
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            max_hp: TURRET_MAX_HP,
            damage: TURRET_DAMAGE,
            attacks_per_second: TURRET_ATTACKS_PER_SECOND,
            range: TURRET_RANGE,
            projectile_speed: 450.0,
            body_radius: 24.0,
        }
    }
}

/// Per-type minion statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinionRoster {
    /// Melee minion statistics.
    pub melee: MinionStats,
    /// Caster minion statistics.
    pub caster: MinionStats,
    /// Cannon minion statistics.
    pub cannon: MinionStats,
}

impl Default for MinionRoster {
    fn default() -> Self {
        Self {
            melee: MinionStats {
                max_hp: 477,
                damage: 12,
                attacks_per_second: 1.25,
                range: 28.0,
                move_speed: 40.0,
                projectile_speed: 0.0,
            },
            caster: MinionStats {
                max_hp: 296,
                damage: 23,
                attacks_per_second: 0.667,
                range: 110.0,
                move_speed: 40.0,
                projectile_speed: 320.0,
            },
            cannon: MinionStats {
                max_hp: 912,
                damage: 40,
                attacks_per_second: 1.0,
                range: 60.0,
                move_speed: 40.0,
                projectile_speed: 0.0,
            },
        }
    }
}

/// Statistics for a single minion type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinionStats {
    /// Maximum and initial health.
    pub max_hp: u32,
    /// Damage per attack.
    pub damage: u32,
    /// Attacks per second.
    pub attacks_per_second: f32,
    /// Attack range measured center to center.
    pub range: f32,
    /// Lane units travelled per second.
    pub move_speed: f32,
    /// Projectile travel speed; ignored by melee-style attackers.
    pub projectile_speed: f32,
}

impl MinionStats {
    /// Minimum delay between two attacks.
    #[must_use]
    pub fn attack_interval(&self) -> Duration {
        secs(1.0 / self.attacks_per_second)
    }

    fn validate(&self, prefix: &'static str) -> Result<(), ConfigError> {
        if self.max_hp == 0 {
            return Err(ConfigError::ZeroCount { field: prefix });
        }
        positive(prefix, self.attacks_per_second)?;
        positive(prefix, self.range)?;
        positive(prefix, self.move_speed)
    }
}

/// Operator tool tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Minions strictly below this health may be last-hit.
    pub lasthit_threshold: u32,
    /// Radius searched by the last-hit tool.
    pub lasthit_radius: f32,
    /// Radius affected by the AoE tool.
    pub aoe_radius: f32,
    /// Damage dealt by the AoE tool.
    pub aoe_damage: u32,
    /// Radius affected by the kill-casters and full-clear tools.
    pub full_clear_range: f32,
    /// Lifetime of the visual marker left by a tool.
    pub marker_ttl_secs: f32,
}

impl ToolConfig {
    /// Lifetime of tool and combat markers.
    #[must_use]
    pub fn marker_ttl(&self) -> Duration {
        secs(self.marker_ttl_secs)
    }

    /// Radius around the click affected by the provided tool.
    #[must_use]
    pub fn radius(&self, tool: ToolKind) -> f32 {
        match tool {
            ToolKind::LastHit | ToolKind::Tank => self.lasthit_radius,
            ToolKind::AoE => self.aoe_radius,
            ToolKind::KillCasters | ToolKind::FullClear => self.full_clear_range,
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            lasthit_threshold: LASTHIT_THRESHOLD,
            lasthit_radius: LASTHIT_RADIUS,
            aoe_radius: AOE_RADIUS,
            aoe_damage: AOE_DAMAGE,
            full_clear_range: FULL_CLEAR_RANGE,
            marker_ttl_secs: 0.6,
        }
    }
}

/// Movement and separation tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Minions closer than this push each other apart.
    pub separation_radius: f32,
    /// Lane units per second applied at full separation pressure.
    pub separation_speed: f32,
    /// Upper bound on the summed separation pressure.
    pub max_separation_pressure: f32,
    /// Enemies within this radius pull a minion off the lane axis.
    pub acquisition_radius: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            separation_radius: 18.0,
            separation_speed: 30.0,
            max_separation_pressure: 2.0,
            acquisition_radius: 160.0,
        }
    }
}

/// Thresholds used by the wave classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Half-width of the band around the lane center considered neutral.
    pub neutral_band: f32,
    /// Largest alive-count difference still considered even.
    pub neutral_count_tolerance: u32,
    /// Smallest ratio between team health totals still considered even.
    pub neutral_hp_ratio: f32,
    /// Depth of the zone just outside turret range where waves may freeze.
    pub freeze_margin: f32,
    /// Largest midpoint drift tolerated while frozen.
    pub freeze_tolerance: f32,
    /// Duration the midpoint must stay put before the wave counts as frozen.
    pub freeze_hold_secs: f32,
    /// Duration of midpoint history retained in the trend window.
    pub history_secs: f32,
    /// Duration after a crash during which a disengaging wave is bouncing.
    pub bounce_secs: f32,
    /// Consecutive spawn-cycle samples required to detect a slow push.
    pub slow_push_cycles: u32,
}

impl ClassifierConfig {
    /// Duration of retained midpoint history.
    #[must_use]
    pub fn history(&self) -> Duration {
        secs(self.history_secs)
    }

    /// Duration the midpoint must hold still to count as frozen.
    #[must_use]
    pub fn freeze_hold(&self) -> Duration {
        secs(self.freeze_hold_secs)
    }

    /// Duration after a crash during which the wave may bounce.
    #[must_use]
    pub fn bounce_window(&self) -> Duration {
        secs(self.bounce_secs)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            neutral_band: 120.0,
            neutral_count_tolerance: 1,
            neutral_hp_ratio: 0.75,
            freeze_margin: 90.0,
            freeze_tolerance: 12.0,
            freeze_hold_secs: 3.0,
            history_secs: 6.0,
            bounce_secs: 4.0,
            slow_push_cycles: 2,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn secs(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f32(value)
    } else {
        Duration::ZERO
    }
}
