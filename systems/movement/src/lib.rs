#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that advances minions along the lane.
//!
//! Every destination is computed from the same start-of-tick snapshot, so
//! the order in which minions are visited never influences the result.

use std::time::Duration;

use lane_control_core::{
    config::SimConfig, geometry::LaneBounds, geometry::COINCIDENT_EPSILON, Attacker, Command,
    Engagement, MinionId, MinionSnapshot, MinionView, TargetRef, TurretView, Vec2,
};

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    bounds: LaneBounds,
    separation_radius: f32,
    separation_speed: f32,
    max_separation_pressure: f32,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        bounds: LaneBounds,
        separation_radius: f32,
        separation_speed: f32,
        max_separation_pressure: f32,
    ) -> Self {
        Self {
            bounds,
            separation_radius,
            separation_speed,
            max_separation_pressure,
        }
    }

    /// Derives the movement configuration from the simulation configuration.
    #[must_use]
    pub fn from_sim_config(config: &SimConfig) -> Self {
        Self::new(
            config.bounds(),
            config.movement.separation_radius,
            config.movement.separation_speed,
            config.movement.max_separation_pressure,
        )
    }
}

/// Pure system that emits `MoveMinion` commands.
#[derive(Debug)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits one `MoveMinion` per alive minion whose position changes this tick.
    ///
    /// Minions engaged with a target in range hold position apart from
    /// separation, chasing minions close in on their target without
    /// overshooting their attack range, and idle minions walk toward the
    /// enemy base.
    pub fn handle(
        &self,
        dt: Duration,
        minions: &MinionView,
        turrets: &TurretView,
        engagements: &[Engagement],
        out: &mut Vec<Command>,
    ) {
        let dt_secs = dt.as_secs_f32();
        if dt_secs <= 0.0 {
            return;
        }

        for minion in minions.alive() {
            let engagement = engagements
                .iter()
                .find(|engagement| engagement.attacker == Attacker::Minion(minion.id));
            let advanced = self.advance(minion, engagement, turrets, dt_secs);
            let separation = self.separation(minion, minions, turrets) * dt_secs;
            let destination = self.config.bounds.clamp(advanced + separation);

            if destination != minion.position {
                out.push(Command::MoveMinion {
                    minion: minion.id,
                    to: destination,
                });
            }
        }
    }

    fn advance(
        &self,
        minion: &MinionSnapshot,
        engagement: Option<&Engagement>,
        turrets: &TurretView,
        dt_secs: f32,
    ) -> Vec2 {
        let step = minion.move_speed.max(0.0) * dt_secs;
        match engagement {
            Some(engagement) if engagement.in_range => minion.position,
            Some(engagement) => {
                let reach = match engagement.target {
                    TargetRef::Turret(id) => {
                        minion.range + turrets.get(id).map_or(0.0, |turret| turret.body_radius)
                    }
                    TargetRef::Minion(_) | TargetRef::TankPoint => minion.range,
                };
                let offset = engagement.target_position - minion.position;
                let distance = offset.length();
                let gap = (distance - reach).max(0.0);
                if distance <= COINCIDENT_EPSILON {
                    return minion.position;
                }
                minion.position + offset / distance * step.min(gap)
            }
            None => minion.position + Vec2::new(minion.team.advance_sign() * step, 0.0),
        }
    }

    /// Separation velocity in lane units per second.
    fn separation(&self, minion: &MinionSnapshot, minions: &MinionView, turrets: &TurretView) -> Vec2 {
        let radius = self.config.separation_radius;
        let cap = self.config.max_separation_pressure.max(0.0);
        if radius <= 0.0 || cap <= 0.0 {
            return Vec2::ZERO;
        }

        let mut pressure = Vec2::ZERO;
        for other in minions.alive().filter(|other| other.id != minion.id) {
            pressure += push(minion.position, other.position, radius, cap, || {
                coincident_direction(minion.id, other.id)
            });
        }
        for turret in turrets.iter() {
            let body = turret.body_radius + radius * 0.5;
            let away = push(minion.position, turret.position, body, cap, || {
                Vec2::new(-minion.team.advance_sign(), 0.0)
            });
            pressure += if turret.team == minion.team {
                sidestep(minion.id, away)
            } else {
                away
            };
        }

        pressure.clamp_length_max(cap) * self.config.separation_speed
    }
}

/// Pressure exerted on `position` by a neighbour at `other`.
fn push(
    position: Vec2,
    other: Vec2,
    radius: f32,
    cap: f32,
    coincident: impl FnOnce() -> Vec2,
) -> Vec2 {
    let offset = position - other;
    let distance = offset.length();
    if distance >= radius {
        return Vec2::ZERO;
    }
    if distance <= COINCIDENT_EPSILON {
        return coincident() * cap;
    }
    let weight = (radius / distance - 1.0).min(cap);
    offset / distance * weight
}

/// Allied turrets never hold their own minions back; they only deflect them
/// sideways, to a side picked by identifier when the minion is on the axis.
fn sidestep(minion: MinionId, away: Vec2) -> Vec2 {
    if away.y.abs() > COINCIDENT_EPSILON {
        Vec2::new(0.0, away.y)
    } else if away.x.abs() > COINCIDENT_EPSILON {
        let side = if minion.get() % 2 == 0 { -1.0 } else { 1.0 };
        Vec2::new(0.0, side * away.x.abs())
    } else {
        Vec2::ZERO
    }
}

/// Stable push direction for two minions sharing a position.
fn coincident_direction(minion: MinionId, other: MinionId) -> Vec2 {
    if minion < other {
        Vec2::new(0.0, -1.0)
    } else {
        Vec2::new(0.0, 1.0)
    }
}
