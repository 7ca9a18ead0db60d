use std::{collections::BTreeSet, time::Duration};

use lane_control_core::{
    config::SimConfig, Command, Event, InputSnapshot, Key, MinionKind, MinionSnapshot, SpawnPlan,
    Team, ToolKind, Vec2, WaveState,
};
use lane_control_simulation::{step, Systems};
use lane_control_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(50);

struct Session {
    world: World,
    systems: Systems,
}

impl Session {
    fn new() -> Self {
        let world = World::new();
        let systems = Systems::new(query::config(&world));
        Self { world, systems }
    }

    fn advance(&mut self, input: &InputSnapshot) -> Vec<Event> {
        step(&mut self.world, &mut self.systems, FRAME, input)
    }

    fn idle(&mut self) -> Vec<Event> {
        self.advance(&InputSnapshot::default())
    }

    fn alive(&self, team: Team) -> Vec<MinionSnapshot> {
        query::minion_view(&self.world)
            .alive()
            .filter(|minion| minion.team == team)
            .copied()
            .collect()
    }

    fn front(&self, team: Team) -> Option<f32> {
        let xs = self.alive(team).into_iter().map(|minion| minion.position.x);
        match team {
            Team::Blue => xs.reduce(f32::max),
            Team::Red => xs.reduce(f32::min),
        }
    }

    /// Steps until the two waves are about to meet at the lane center.
    fn approach_center(&mut self) {
        for _ in 0..800 {
            let _ = self.idle();
            if let (Some(blue), Some(red)) = (self.front(Team::Blue), self.front(Team::Red)) {
                if self.alive(Team::Red).len() == 6 && red - blue < 150.0 {
                    return;
                }
            }
        }
        panic!("waves never approached each other");
    }

    fn click(&mut self, tool: ToolKind, position: Vec2) -> Vec<Event> {
        self.advance(&InputSnapshot::click_at(position).with_pressed(Key::for_tool(tool)))
    }

    fn red_turret_covers_blue(&self) -> bool {
        let turrets = query::turret_view(&self.world);
        let Some(turret) = turrets.of_team(Team::Red) else {
            return false;
        };
        self.alive(Team::Blue)
            .iter()
            .any(|minion| turret.covers(minion.position))
    }
}

fn centroid(minions: &[MinionSnapshot]) -> Vec2 {
    let sum = minions
        .iter()
        .fold(Vec2::ZERO, |sum, minion| sum + minion.position);
    sum / minions.len() as f32
}

/// A world holding one melee minion per listed position, with the next wave
/// far enough away that stepping never spawns more.
fn duel(config: SimConfig, placements: &[(Team, f32)]) -> World {
    let mut world = World::with_config(config);
    let mut events = Vec::new();
    let spawns = placements
        .iter()
        .map(|(team, _)| SpawnPlan {
            team: *team,
            kind: MinionKind::Melee,
            spawn_at: Duration::ZERO,
            lateral_offset: 0.0,
        })
        .collect();
    world::apply(
        &mut world,
        Command::ScheduleWave {
            wave: 1,
            next_wave_at: Duration::from_secs(600),
            spawns,
        },
        &mut events,
    );
    for pending in query::pending_spawns(&world) {
        world::apply(
            &mut world,
            Command::MaterializeSpawn { spawn: pending.id },
            &mut events,
        );
    }
    let ids: Vec<_> = query::minion_view(&world).iter().map(|minion| minion.id).collect();
    for (minion, (_, x)) in ids.into_iter().zip(placements) {
        world::apply(
            &mut world,
            Command::MoveMinion {
                minion,
                to: Vec2::new(*x, 200.0),
            },
            &mut events,
        );
    }
    world
}

#[test]
fn mutual_one_shot_kills_both_minions() {
    let mut config = SimConfig::default();
    config.minions.melee.max_hp = 12;
    config.minions.melee.damage = 12;
    let mut world = duel(config, &[(Team::Blue, 600.0), (Team::Red, 620.0)]);
    let mut systems = Systems::new(query::config(&world));

    let events = step(&mut world, &mut systems, FRAME, &InputSnapshot::default());
    let mut killed: Vec<Team> = events
        .iter()
        .filter_map(|event| match event {
            Event::MinionKilled { team, .. } => Some(*team),
            _ => None,
        })
        .collect();
    killed.sort();
    assert_eq!(killed, vec![Team::Blue, Team::Red]);
    assert!(query::minion_view(&world).is_empty());
}

#[test]
fn lone_enemy_beside_the_tank_point_keeps_walking() {
    let mut world = duel(SimConfig::default(), &[(Team::Red, 800.0)]);
    let mut systems = Systems::new(query::config(&world));
    let _ = step(
        &mut world,
        &mut systems,
        FRAME,
        &InputSnapshot::click_at(Vec2::new(700.0, 200.0)).with_pressed(Key::Digit5),
    );
    assert_eq!(query::tank_point(&world), Some(Vec2::new(700.0, 200.0)));

    for _ in 0..20 {
        let _ = step(&mut world, &mut systems, FRAME, &InputSnapshot::default());
    }
    let red = query::minion_view(&world).into_vec();
    assert!(red[0].target.is_none());
    assert!(red[0].position.x < 800.0 - 30.0, "red advanced along the lane");
}

#[test]
fn full_clear_then_survivors_crash_into_enemy_turret() {
    let mut session = Session::new();
    session.approach_center();
    assert_eq!(query::wave_state(&session.world), WaveState::Neutral);

    let red_before = session.alive(Team::Red);
    let events = session.click(ToolKind::FullClear, centroid(&red_before));
    let killed = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::MinionKilled {
                    team: Team::Red,
                    ..
                }
            )
        })
        .count();
    assert!(killed >= red_before.len(), "every red minion died this tick");
    assert!(session.alive(Team::Red).is_empty());
    assert!(!session.alive(Team::Blue).is_empty());

    let mut last_front = session.front(Team::Blue).expect("blue survives");
    for _ in 0..400 {
        let _ = session.idle();
        if session.red_turret_covers_blue() {
            assert_eq!(query::wave_state(&session.world), WaveState::Crashing);
            return;
        }
        assert_ne!(query::wave_state(&session.world), WaveState::Crashing);
        let front = session.front(Team::Blue).expect("blue survives");
        assert!(front > last_front, "idle survivors advance toward the enemy turret");
        last_front = front;
    }
    panic!("blue wave never reached the red turret");
}

#[test]
fn kill_casters_sets_up_a_numbers_advantage() {
    let mut session = Session::new();
    session.approach_center();
    assert_eq!(query::wave_state(&session.world), WaveState::Neutral);

    let red_casters: Vec<MinionSnapshot> = session
        .alive(Team::Red)
        .into_iter()
        .filter(|minion| minion.kind == MinionKind::Caster)
        .collect();
    let blue_casters: BTreeSet<_> = session
        .alive(Team::Blue)
        .into_iter()
        .filter(|minion| minion.kind == MinionKind::Caster)
        .map(|minion| minion.id)
        .collect();
    let click_at = centroid(&red_casters);

    let _ = session.click(ToolKind::KillCasters, click_at);
    let red_after = session.alive(Team::Red);
    for caster in red_casters
        .iter()
        .filter(|caster| caster.position.distance(click_at) <= 200.0)
    {
        assert!(red_after.iter().all(|minion| minion.id != caster.id));
    }
    assert!(red_after.iter().all(|minion| minion.kind != MinionKind::Caster));
    let blue_after: BTreeSet<_> = session
        .alive(Team::Blue)
        .into_iter()
        .filter(|minion| minion.kind == MinionKind::Caster)
        .map(|minion| minion.id)
        .collect();
    assert_eq!(blue_after, blue_casters);

    let mut spawned_second_wave = false;
    for _ in 0..800 {
        let _ = session.idle();
        if query::clock(&session.world).wave_number >= 2 {
            spawned_second_wave = true;
            break;
        }
    }
    assert!(spawned_second_wave);
    let _ = session.idle();

    assert!(session.alive(Team::Blue).len() > session.alive(Team::Red).len());
    assert_ne!(query::wave_state(&session.world), WaveState::Neutral);
}

#[test]
fn long_run_keeps_health_clamped_and_ids_unique() {
    let mut session = Session::new();
    let mut spawned = BTreeSet::new();
    let mut launched = BTreeSet::new();

    // Five minutes of simulated time at quadruple speed.
    let _ = session.advance(&InputSnapshot::default().with_pressed(Key::F));
    let _ = session.advance(&InputSnapshot::default().with_pressed(Key::F));
    for _ in 0..1_500 {
        for event in session.idle() {
            match event {
                Event::MinionSpawned { minion, .. } => {
                    assert!(spawned.insert(minion), "minion id {minion:?} reused");
                }
                Event::ProjectileLaunched { projectile, .. } => {
                    assert!(launched.insert(projectile), "projectile id {projectile:?} reused");
                }
                _ => {}
            }
        }

        for minion in query::minion_view(&session.world).iter() {
            assert!(minion.health <= minion.max_health);
            assert_eq!(minion.is_alive(), !minion.health.is_zero());
        }
        for turret in query::turret_view(&session.world).iter() {
            assert!(turret.health <= turret.max_health);
        }
        assert!(query::is_consistent(&session.world));
    }

    assert!(query::clock(&session.world).wave_number >= 10);
    assert!(spawned.len() >= 120);
}
