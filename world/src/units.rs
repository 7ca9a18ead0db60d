//! Minion, projectile, spawn queue, and marker records owned by the world.

use std::time::Duration;

use lane_control_core::{
    config::MinionStats, Attacker, Health, MarkerKind, MarkerSnapshot, MinionId, MinionKind,
    MinionSnapshot, PendingSpawnSnapshot, ProjectileId, ProjectileSnapshot, ProjectileSource,
    SpawnId, TargetRef, Team, Vec2,
};
use serde::{Deserialize, Serialize};

/// Minion stored inside the world.
///
/// Combat statistics are copied from the configuration at spawn time so a
/// configuration reload never alters minions already on the lane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct MinionState {
    pub(crate) id: MinionId,
    pub(crate) team: Team,
    pub(crate) kind: MinionKind,
    pub(crate) position: Vec2,
    pub(crate) health: Health,
    pub(crate) stats: MinionStats,
    pub(crate) last_attack: Option<Duration>,
    pub(crate) target: Option<TargetRef>,
    /// Tick on which an attack or projectile brought health to zero.
    #[serde(default)]
    pub(crate) downed_on: Option<u64>,
}

impl MinionState {
    pub(crate) fn spawn(
        id: MinionId,
        team: Team,
        kind: MinionKind,
        position: Vec2,
        stats: &MinionStats,
    ) -> Self {
        Self {
            id,
            team,
            kind,
            position,
            health: Health::new(stats.max_hp),
            stats: stats.clone(),
            last_attack: None,
            target: None,
            downed_on: None,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.health.is_zero()
    }

    /// Alive, or downed by combat during `tick` and still owed its own swing.
    pub(crate) fn can_strike_on(&self, tick: u64) -> bool {
        self.is_alive() || self.downed_on == Some(tick)
    }

    pub(crate) fn max_health(&self) -> Health {
        Health::new(self.stats.max_hp)
    }

    pub(crate) fn snapshot(&self) -> MinionSnapshot {
        MinionSnapshot {
            id: self.id,
            team: self.team,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health(),
            damage: self.stats.damage,
            range: self.stats.range,
            attack_interval: self.stats.attack_interval(),
            last_attack: self.last_attack,
            move_speed: self.stats.move_speed,
            projectile_speed: self.stats.projectile_speed,
            target: self.target,
        }
    }
}

/// Projectile in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) attacker: Attacker,
    /// Team of the shooter at launch; the shooter may be gone by landing.
    pub(crate) team: Team,
    pub(crate) source: ProjectileSource,
    pub(crate) origin: Vec2,
    pub(crate) position: Vec2,
    pub(crate) target: TargetRef,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
}

impl ProjectileState {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            attacker: self.attacker,
            source: self.source,
            origin: self.origin,
            position: self.position,
            target: self.target,
            speed: self.speed,
            damage: self.damage,
        }
    }
}

/// Minion scheduled to materialize at a future simulation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PendingSpawn {
    pub(crate) id: SpawnId,
    pub(crate) team: Team,
    pub(crate) kind: MinionKind,
    pub(crate) spawn_at: Duration,
    pub(crate) lateral_offset: f32,
}

impl PendingSpawn {
    pub(crate) fn snapshot(&self) -> PendingSpawnSnapshot {
        PendingSpawnSnapshot {
            id: self.id,
            team: self.team,
            kind: self.kind,
            spawn_at: self.spawn_at,
        }
    }
}

/// Short-lived visual marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Marker {
    pub(crate) kind: MarkerKind,
    pub(crate) position: Vec2,
    pub(crate) radius: f32,
    pub(crate) created_at: Duration,
    pub(crate) expires_at: Duration,
}

impl Marker {
    pub(crate) fn is_expired(&self, now: Duration) -> bool {
        now >= self.expires_at
    }

    pub(crate) fn snapshot(&self, now: Duration) -> MarkerSnapshot {
        let lifetime = self.expires_at.saturating_sub(self.created_at);
        let age = if lifetime.is_zero() {
            1.0
        } else {
            (now.saturating_sub(self.created_at).as_secs_f32() / lifetime.as_secs_f32())
                .clamp(0.0, 1.0)
        };
        MarkerSnapshot {
            kind: self.kind,
            position: self.position,
            radius: self.radius,
            age,
        }
    }
}
