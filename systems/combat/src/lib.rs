#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns aggro decisions into attacks and flies projectiles.

use std::time::Duration;

use lane_control_core::{
    geometry, Attacker, Command, Engagement, MinionView, ProjectileSnapshot, ProjectileView,
    TargetRef, TurretView, Vec2,
};

/// Combat system that queues target updates, strikes, and projectile flight.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `SetTarget` for changed aggro decisions and `Strike` for ready attackers.
    ///
    /// Attackers that hold a target but received no engagement this tick are
    /// told to drop it.
    pub fn handle(
        &mut self,
        now: Duration,
        engagements: &[Engagement],
        minions: &MinionView,
        turrets: &TurretView,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for minion in minions.alive() {
            let attacker = Attacker::Minion(minion.id);
            let engagement = find_engagement(engagements, attacker);
            let target = engagement.map(|engagement| engagement.target);
            if minion.target != target {
                self.scratch.push(Command::SetTarget { attacker, target });
            }
            if let Some(engagement) = engagement {
                if engagement.in_range && minion.ready_at(now) {
                    self.scratch.push(Command::Strike {
                        attacker,
                        target: engagement.target,
                    });
                }
            }
        }

        for turret in turrets.iter().filter(|turret| turret.is_alive()) {
            let attacker = Attacker::Turret(turret.id);
            let engagement = find_engagement(engagements, attacker);
            let target = engagement.map(|engagement| engagement.target);
            let current = turret.target.map(TargetRef::Minion);
            if current != target {
                self.scratch.push(Command::SetTarget { attacker, target });
            }
            if let Some(engagement) = engagement {
                if engagement.in_range && turret.ready_at(now) {
                    self.scratch.push(Command::Strike {
                        attacker,
                        target: engagement.target,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    /// Advances every projectile toward its target's current position.
    ///
    /// Projectiles within one step of their target land; projectiles whose
    /// target died, was removed, or whose tank point was released are
    /// discarded.
    pub fn advance_projectiles(
        &mut self,
        dt: Duration,
        projectiles: &ProjectileView,
        minions: &MinionView,
        turrets: &TurretView,
        tank: Option<Vec2>,
        out: &mut Vec<Command>,
    ) {
        let dt_secs = dt.as_secs_f32();
        for projectile in projectiles.iter() {
            let command = match target_position(projectile, minions, turrets, tank) {
                None => Command::DiscardProjectile {
                    projectile: projectile.id,
                },
                Some(destination) => {
                    let step = projectile.speed.max(0.0) * dt_secs;
                    if projectile.position.distance(destination) <= step {
                        Command::LandProjectile {
                            projectile: projectile.id,
                        }
                    } else {
                        Command::AdvanceProjectile {
                            projectile: projectile.id,
                            to: geometry::step_toward(projectile.position, destination, step),
                        }
                    }
                }
            };
            out.push(command);
        }
    }
}

fn find_engagement(engagements: &[Engagement], attacker: Attacker) -> Option<&Engagement> {
    engagements
        .iter()
        .find(|engagement| engagement.attacker == attacker)
}

fn target_position(
    projectile: &ProjectileSnapshot,
    minions: &MinionView,
    turrets: &TurretView,
    tank: Option<Vec2>,
) -> Option<Vec2> {
    match projectile.target {
        TargetRef::Minion(id) => minions
            .get(id)
            .filter(|minion| minion.is_alive())
            .map(|minion| minion.position),
        TargetRef::Turret(id) => turrets
            .get(id)
            .filter(|turret| turret.is_alive())
            .map(|turret| turret.position),
        TargetRef::TankPoint => tank,
    }
}
