//! Authoritative turret state management utilities.

use std::time::Duration;

use lane_control_core::{
    config::SimConfig, Health, MinionId, Team, TurretId, TurretSnapshot, Vec2,
};
use serde::{Deserialize, Serialize};

/// State of a turret stored inside the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TurretState {
    /// Identifier allocated by the world for the turret.
    pub(crate) id: TurretId,
    /// Team defended by the turret.
    pub(crate) team: Team,
    /// Fixed lane position.
    pub(crate) position: Vec2,
    /// Remaining health.
    pub(crate) health: Health,
    /// Simulation time of the last shot.
    pub(crate) last_attack: Option<Duration>,
    /// Minion currently under fire.
    pub(crate) target: Option<MinionId>,
    /// Tick on which the turret was destroyed.
    #[serde(default)]
    pub(crate) destroyed_on: Option<u64>,
}

impl TurretState {
    pub(crate) fn is_alive(&self) -> bool {
        !self.health.is_zero()
    }

    pub(crate) fn can_strike_on(&self, tick: u64) -> bool {
        self.is_alive() || self.destroyed_on == Some(tick)
    }

    pub(crate) fn snapshot(&self, config: &SimConfig) -> TurretSnapshot {
        TurretSnapshot {
            id: self.id,
            team: self.team,
            position: self.position,
            health: self.health,
            max_health: Health::new(config.turret.max_hp),
            damage: config.turret.damage,
            range: config.turret.range,
            body_radius: config.turret.body_radius,
            attack_interval: config.turret.attack_interval(),
            last_attack: self.last_attack,
            projectile_speed: config.turret.projectile_speed,
            target: self.target,
        }
    }
}

/// Registry holding the two lane turrets.
///
/// Destroyed turrets stay in the registry with zero health so identifiers
/// remain stable for the rest of the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TurretRegistry {
    entries: Vec<TurretState>,
}

impl TurretRegistry {
    /// Places one full-health turret per team using identifiers produced by `allocate`.
    pub(crate) fn new(config: &SimConfig, mut allocate: impl FnMut() -> u32) -> Self {
        let entries = Team::ALL
            .into_iter()
            .map(|team| TurretState {
                id: TurretId::new(allocate()),
                team,
                position: config.turret_position(team),
                health: Health::new(config.turret.max_hp),
                last_attack: None,
                target: None,
                destroyed_on: None,
            })
            .collect();
        Self { entries }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TurretState> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TurretState> {
        self.entries.iter_mut()
    }

    pub(crate) fn get(&self, id: TurretId) -> Option<&TurretState> {
        self.entries.iter().find(|turret| turret.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TurretId) -> Option<&mut TurretState> {
        self.entries.iter_mut().find(|turret| turret.id == id)
    }
}
