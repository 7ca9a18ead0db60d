#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic aggro decisions from world snapshots.
//!
//! Minions prefer an enemy minion inside their attack range, then the enemy
//! turret, and otherwise chase the nearest enemy inside the acquisition
//! radius. While the operator's tank point is engaged, enemy minions close
//! enough to notice it attack the point instead. Turrets fire at the nearest
//! enemy minion inside their range. Distance ties resolve toward the smaller
//! identifier.

use lane_control_core::{
    config::SimConfig, Attacker, Engagement, MinionSnapshot, MinionView, TargetRef, Team,
    TurretSnapshot, TurretView, Vec2,
};

/// Configuration parameters required to construct the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    acquisition_radius: f32,
    operator_team: Team,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(acquisition_radius: f32, operator_team: Team) -> Self {
        Self {
            acquisition_radius,
            operator_team,
        }
    }

    /// Derives the targeting configuration from the simulation configuration.
    #[must_use]
    pub fn from_sim_config(config: &SimConfig) -> Self {
        Self::new(config.movement.acquisition_radius, config.operator_team)
    }
}

/// Targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug)]
pub struct Targeting {
    config: Config,
    minion_workspace: Vec<Candidate>,
}

impl Targeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            minion_workspace: Vec::new(),
        }
    }

    /// Computes engagements for every alive minion and turret.
    ///
    /// The output buffer is cleared before populating it. Units without any
    /// target produce no entry. Entries are ordered minions first, then
    /// turrets, each in identifier order.
    pub fn handle(
        &mut self,
        minions: &MinionView,
        turrets: &TurretView,
        tank: Option<Vec2>,
        out: &mut Vec<Engagement>,
    ) {
        out.clear();
        self.prepare_minion_workspace(minions);

        for minion in minions.alive() {
            if let Some(engagement) = self.minion_engagement(minion, turrets, tank) {
                out.push(engagement);
            }
        }

        for turret in turrets.iter().filter(|turret| turret.is_alive()) {
            if let Some(engagement) = self.turret_engagement(turret) {
                out.push(engagement);
            }
        }
    }

    fn prepare_minion_workspace(&mut self, minions: &MinionView) {
        self.minion_workspace.clear();
        self.minion_workspace.extend(minions.alive().map(|minion| Candidate {
            target: TargetRef::Minion(minion.id),
            team: minion.team,
            position: minion.position,
            reach_bonus: 0.0,
        }));
    }

    fn minion_engagement(
        &self,
        minion: &MinionSnapshot,
        turrets: &TurretView,
        tank: Option<Vec2>,
    ) -> Option<Engagement> {
        let engage = |target: TargetRef, target_position: Vec2, in_range: bool| Engagement {
            attacker: Attacker::Minion(minion.id),
            team: minion.team,
            attacker_position: minion.position,
            target,
            target_position,
            in_range,
        };

        let enemy_turrets: Vec<Candidate> = turrets
            .iter()
            .filter(|turret| turret.is_alive() && turret.team != minion.team)
            .map(Candidate::from_turret)
            .collect();

        let enemies = self
            .minion_workspace
            .iter()
            .filter(|candidate| candidate.team != minion.team);

        let acquisition = self.config.acquisition_radius;
        let engagement = nearest_within(minion.position, enemies.clone(), minion.range)
            .or_else(|| nearest_within(minion.position, enemy_turrets.iter(), minion.range))
            .map(|best| engage(best.target, best.position, true))
            .or_else(|| {
                nearest_within(minion.position, enemies, acquisition)
                    .or_else(|| nearest_within(minion.position, enemy_turrets.iter(), acquisition))
                    .map(|best| engage(best.target, best.position, false))
            })?;

        // Only aggro aimed at the operator's side is drawn onto the tank point.
        if minion.team != self.config.operator_team {
            if let Some(point) = tank {
                let distance = minion.position.distance(point);
                if distance <= acquisition {
                    return Some(engage(TargetRef::TankPoint, point, distance <= minion.range));
                }
            }
        }
        Some(engagement)
    }

    fn turret_engagement(&self, turret: &TurretSnapshot) -> Option<Engagement> {
        let enemies = self
            .minion_workspace
            .iter()
            .filter(|candidate| candidate.team != turret.team);
        nearest_within(turret.position, enemies, turret.range).map(|best| Engagement {
            attacker: Attacker::Turret(turret.id),
            team: turret.team,
            attacker_position: turret.position,
            target: best.target,
            target_position: best.position,
            in_range: true,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    target: TargetRef,
    team: Team,
    position: Vec2,
    /// Extra reach granted by the candidate's body radius.
    reach_bonus: f32,
}

impl Candidate {
    fn from_turret(turret: &TurretSnapshot) -> Self {
        Self {
            target: TargetRef::Turret(turret.id),
            team: turret.team,
            position: turret.position,
            reach_bonus: turret.body_radius,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    target: TargetRef,
    position: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        self.target < other.target
    }
}

fn nearest_within<'a>(
    origin: Vec2,
    candidates: impl Iterator<Item = &'a Candidate>,
    radius: f32,
) -> Option<BestCandidate> {
    let mut best: Option<BestCandidate> = None;
    for candidate in candidates {
        let distance = origin.distance(candidate.position);
        if distance - candidate.reach_bonus > radius {
            continue;
        }

        let current = BestCandidate {
            distance_sq: distance * distance,
            target: candidate.target,
            position: candidate.position,
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_control_core::{Health, MinionId, MinionKind, TurretId};
    use std::time::Duration;

    fn minion(id: u32, team: Team, kind: MinionKind, x: f32) -> MinionSnapshot {
        let range = match kind {
            MinionKind::Melee => 28.0,
            MinionKind::Caster => 110.0,
            MinionKind::Cannon => 60.0,
        };
        MinionSnapshot {
            id: MinionId::new(id),
            team,
            kind,
            position: Vec2::new(x, 200.0),
            health: Health::new(100),
            max_health: Health::new(100),
            damage: 10,
            range,
            attack_interval: Duration::from_secs(1),
            last_attack: None,
            move_speed: 40.0,
            projectile_speed: 320.0,
            target: None,
        }
    }

    fn turret(id: u32, team: Team, x: f32, hp: u32) -> TurretSnapshot {
        TurretSnapshot {
            id: TurretId::new(id),
            team,
            position: Vec2::new(x, 200.0),
            health: Health::new(hp),
            max_health: Health::new(5_000),
            damage: 152,
            range: 150.0,
            body_radius: 24.0,
            attack_interval: Duration::from_millis(1_205),
            last_attack: None,
            projectile_speed: 450.0,
            target: None,
        }
    }

    fn turrets() -> TurretView {
        TurretView::from_snapshots(vec![
            turret(0, Team::Blue, 100.0, 5_000),
            turret(1, Team::Red, 1_100.0, 5_000),
        ])
    }

    fn run(minions: Vec<MinionSnapshot>, turrets: &TurretView, tank: Option<Vec2>) -> Vec<Engagement> {
        let mut system = Targeting::new(Config::new(160.0, Team::Blue));
        let mut out = Vec::new();
        system.handle(&MinionView::from_snapshots(minions), turrets, tank, &mut out);
        out
    }

    fn engagement_of(out: &[Engagement], attacker: Attacker) -> Option<Engagement> {
        out.iter().copied().find(|engagement| engagement.attacker == attacker)
    }

    #[test]
    fn nearest_enemy_in_range_is_selected() {
        let out = run(
            vec![
                minion(10, Team::Blue, MinionKind::Caster, 500.0),
                minion(11, Team::Red, MinionKind::Melee, 590.0),
                minion(12, Team::Red, MinionKind::Melee, 560.0),
            ],
            &turrets(),
            None,
        );
        let caster = engagement_of(&out, Attacker::Minion(MinionId::new(10))).expect("engaged");
        assert_eq!(caster.target, TargetRef::Minion(MinionId::new(12)));
        assert!(caster.in_range);
    }

    #[test]
    fn equidistant_enemies_resolve_to_smaller_identifier() {
        let out = run(
            vec![
                minion(20, Team::Red, MinionKind::Melee, 520.0),
                minion(5, Team::Blue, MinionKind::Caster, 500.0),
                minion(14, Team::Red, MinionKind::Melee, 480.0),
            ],
            &turrets(),
            None,
        );
        let caster = engagement_of(&out, Attacker::Minion(MinionId::new(5))).expect("engaged");
        assert_eq!(caster.target, TargetRef::Minion(MinionId::new(14)));
    }

    #[test]
    fn distant_enemy_is_chased_but_not_in_range() {
        let out = run(
            vec![
                minion(1, Team::Blue, MinionKind::Melee, 500.0),
                minion(2, Team::Red, MinionKind::Melee, 620.0),
            ],
            &turrets(),
            None,
        );
        let melee = engagement_of(&out, Attacker::Minion(MinionId::new(1))).expect("chasing");
        assert_eq!(melee.target, TargetRef::Minion(MinionId::new(2)));
        assert!(!melee.in_range);
    }

    #[test]
    fn lone_minion_far_from_everything_has_no_target() {
        let out = run(
            vec![minion(1, Team::Blue, MinionKind::Melee, 600.0)],
            &turrets(),
            None,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn turret_body_extends_minion_reach() {
        let out = run(
            vec![minion(1, Team::Blue, MinionKind::Melee, 1_050.0)],
            &turrets(),
            None,
        );
        let melee = engagement_of(&out, Attacker::Minion(MinionId::new(1))).expect("engaged");
        assert_eq!(melee.target, TargetRef::Turret(TurretId::new(1)));
        assert!(melee.in_range, "50 units minus a 24 unit body is within 28");
        let turret = engagement_of(&out, Attacker::Turret(TurretId::new(1))).expect("firing");
        assert_eq!(turret.target, TargetRef::Minion(MinionId::new(1)));
    }

    #[test]
    fn destroyed_turret_is_neither_target_nor_shooter() {
        let view = TurretView::from_snapshots(vec![
            turret(0, Team::Blue, 100.0, 5_000),
            turret(1, Team::Red, 1_100.0, 0),
        ]);
        let out = run(
            vec![minion(1, Team::Blue, MinionKind::Melee, 1_050.0)],
            &view,
            None,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn tank_point_redirects_enemy_minions_only() {
        let tank = Some(Vec2::new(600.0, 200.0));
        let out = run(
            vec![
                minion(1, Team::Blue, MinionKind::Melee, 590.0),
                minion(2, Team::Red, MinionKind::Melee, 610.0),
            ],
            &turrets(),
            tank,
        );
        let red = engagement_of(&out, Attacker::Minion(MinionId::new(2))).expect("red engaged");
        assert_eq!(red.target, TargetRef::TankPoint);
        assert!(red.in_range);
        let blue = engagement_of(&out, Attacker::Minion(MinionId::new(1))).expect("blue engaged");
        assert_eq!(blue.target, TargetRef::Minion(MinionId::new(2)));
    }

    #[test]
    fn tank_point_does_not_capture_minions_without_an_operator_target() {
        let out = run(
            vec![minion(3, Team::Red, MinionKind::Melee, 800.0)],
            &turrets(),
            Some(Vec2::new(700.0, 200.0)),
        );
        assert!(engagement_of(&out, Attacker::Minion(MinionId::new(3))).is_none());
    }

    #[test]
    fn turret_ignores_allied_minions() {
        let out = run(
            vec![minion(1, Team::Red, MinionKind::Melee, 1_050.0)],
            &turrets(),
            None,
        );
        assert!(engagement_of(&out, Attacker::Turret(TurretId::new(1))).is_none());
    }
}
