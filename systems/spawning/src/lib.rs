#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for scheduling minion waves.
//!
//! Waves are planned as staggered spawn slots. Lateral jitter is drawn from a
//! generator seeded by the configured seed and the wave index, so the same
//! wave always produces the same offsets regardless of when it is scheduled.

use std::time::Duration;

use lane_control_core::{
    config::SimConfig, ClockSnapshot, Command, MinionKind, PendingSpawnSnapshot, SpawnPlan, Team,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WAVE_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;
const MAX_WAVES_PER_TICK: u32 = 8;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_interval: Duration,
    cannon_wave_interval: u32,
    melee_per_wave: u32,
    casters_per_wave: u32,
    stagger: Duration,
    lateral_jitter: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    ///
    /// Composition defaults to three melee and three casters per team with a
    /// cannon every third wave.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            cannon_wave_interval: 3,
            melee_per_wave: 3,
            casters_per_wave: 3,
            stagger: Duration::from_millis(80),
            lateral_jitter: 0.0,
            rng_seed,
        }
    }

    /// Derives the spawning configuration from the simulation configuration.
    #[must_use]
    pub fn from_sim_config(config: &SimConfig) -> Self {
        let waves = &config.waves;
        let stagger = if waves.stagger_secs.is_finite() && waves.stagger_secs > 0.0 {
            Duration::from_secs_f32(waves.stagger_secs)
        } else {
            Duration::ZERO
        };
        Self {
            spawn_interval: config.spawn_interval(),
            cannon_wave_interval: waves.cannon_wave_interval,
            melee_per_wave: waves.melee_per_wave,
            casters_per_wave: waves.casters_per_wave,
            stagger,
            lateral_jitter: waves.lateral_jitter.max(0.0),
            rng_seed: config.rng_seed,
        }
    }

    /// Overrides the maximum lateral offset applied at spawn.
    #[must_use]
    pub const fn with_lateral_jitter(mut self, lateral_jitter: f32) -> Self {
        self.lateral_jitter = lateral_jitter;
        self
    }
}

/// Pure system that deterministically emits wave scheduling and spawn commands.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits a `ScheduleWave` command for every wave that became due.
    ///
    /// The next due time is this wave's due time plus the interval rather than
    /// the current time plus the interval, so frame granularity never
    /// accumulates into drift of the wave timer. A single call schedules at most a handful of waves so an enormous frame
    /// delta cannot flood the pending queue.
    pub fn schedule_waves(&self, clock: &ClockSnapshot, out: &mut Vec<Command>) {
        if self.config.spawn_interval.is_zero() {
            return;
        }

        let mut due_at = clock.next_wave_at;
        let mut wave = clock.wave_number;
        let mut scheduled = 0;
        while due_at <= clock.elapsed && scheduled < MAX_WAVES_PER_TICK {
            wave = wave.saturating_add(1);
            let next_wave_at = due_at.saturating_add(self.config.spawn_interval);
            out.push(Command::ScheduleWave {
                wave,
                next_wave_at,
                spawns: self.plan_wave(wave, due_at),
            });
            due_at = next_wave_at;
            scheduled += 1;
        }
    }

    /// Emits `MaterializeSpawn` commands for pending spawns whose time arrived.
    pub fn materialize_due(
        &self,
        clock: &ClockSnapshot,
        pending: &[PendingSpawnSnapshot],
        out: &mut Vec<Command>,
    ) {
        out.extend(
            pending
                .iter()
                .filter(|spawn| spawn.spawn_at <= clock.elapsed)
                .map(|spawn| Command::MaterializeSpawn { spawn: spawn.id }),
        );
    }

    /// Minion types composing one team's half of the provided wave, in spawn order.
    #[must_use]
    pub fn composition(&self, wave: u32) -> Vec<MinionKind> {
        let config = &self.config;
        let cannon = config.cannon_wave_interval != 0 && wave % config.cannon_wave_interval == 0;
        let melee = (0..config.melee_per_wave).map(|_| MinionKind::Melee);
        let casters = (0..config.casters_per_wave).map(|_| MinionKind::Caster);
        melee
            .chain(cannon.then_some(MinionKind::Cannon))
            .chain(casters)
            .collect()
    }

    fn plan_wave(&self, wave: u32, due_at: Duration) -> Vec<SpawnPlan> {
        let composition = self.composition(wave);
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.config.rng_seed ^ u64::from(wave).wrapping_mul(WAVE_SEED_MIX),
        );
        let jitter = self.config.lateral_jitter;

        let mut plans = Vec::with_capacity(composition.len() * Team::ALL.len());
        let mut stagger = Duration::ZERO;
        for kind in composition {
            for team in Team::ALL {
                let lateral_offset = if jitter > 0.0 {
                    rng.gen_range(-jitter..=jitter)
                } else {
                    0.0
                };
                plans.push(SpawnPlan {
                    team,
                    kind,
                    spawn_at: due_at.saturating_add(stagger),
                    lateral_offset,
                });
            }
            stagger = stagger.saturating_add(self.config.stagger);
        }
        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_control_core::{SpawnId, SpeedMultiplier};

    fn clock(elapsed: Duration, wave_number: u32, next_wave_at: Duration) -> ClockSnapshot {
        ClockSnapshot {
            elapsed,
            tick: 0,
            wave_number,
            next_wave_at,
            paused: false,
            speed: SpeedMultiplier::Normal,
        }
    }

    fn system() -> Spawning {
        Spawning::new(Config::new(Duration::from_secs(30), 7))
    }

    #[test]
    fn zero_interval_never_schedules() {
        let spawning = Spawning::new(Config::new(Duration::ZERO, 1));
        let mut out = Vec::new();
        spawning.schedule_waves(&clock(Duration::from_secs(90), 0, Duration::ZERO), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn nothing_is_scheduled_before_due_time() {
        let mut out = Vec::new();
        system().schedule_waves(
            &clock(Duration::from_secs(29), 1, Duration::from_secs(30)),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn large_delta_schedules_each_missed_wave_in_order() {
        let mut out = Vec::new();
        system().schedule_waves(
            &clock(Duration::from_secs(61), 0, Duration::ZERO),
            &mut out,
        );
        let waves: Vec<(u32, Duration)> = out
            .iter()
            .map(|command| match command {
                Command::ScheduleWave {
                    wave, next_wave_at, ..
                } => (*wave, *next_wave_at),
                other => panic!("unexpected command emitted: {other:?}"),
            })
            .collect();
        assert_eq!(
            waves,
            vec![
                (1, Duration::from_secs(30)),
                (2, Duration::from_secs(60)),
                (3, Duration::from_secs(90)),
            ]
        );
    }

    #[test]
    fn late_tick_keeps_the_wave_cadence() {
        let mut out = Vec::new();
        system().schedule_waves(
            &clock(Duration::from_millis(30_016), 1, Duration::from_secs(30)),
            &mut out,
        );
        assert!(matches!(
            out.as_slice(),
            [Command::ScheduleWave { wave: 2, next_wave_at, .. }]
                if *next_wave_at == Duration::from_secs(60)
        ));
    }

    #[test]
    fn slots_are_staggered_and_interleave_teams() {
        let plans = system().plan_wave(1, Duration::from_secs(30));
        assert_eq!(plans.len(), 12);
        assert_eq!(plans[0].team, Team::Blue);
        assert_eq!(plans[1].team, Team::Red);
        assert_eq!(plans[0].spawn_at, plans[1].spawn_at);
        assert_eq!(
            plans[2].spawn_at - plans[0].spawn_at,
            Duration::from_millis(80)
        );
        assert!(plans.iter().all(|plan| plan.lateral_offset == 0.0));
    }

    #[test]
    fn jitter_is_bounded_and_reproducible() {
        let spawning =
            Spawning::new(Config::new(Duration::from_secs(30), 99).with_lateral_jitter(14.0));
        let first = spawning.plan_wave(4, Duration::from_secs(90));
        let second = spawning.plan_wave(4, Duration::from_secs(90));
        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|plan| plan.lateral_offset.abs() <= 14.0));
        let other_wave = spawning.plan_wave(5, Duration::from_secs(120));
        assert_ne!(
            first.iter().map(|plan| plan.lateral_offset).collect::<Vec<_>>(),
            other_wave
                .iter()
                .map(|plan| plan.lateral_offset)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn only_due_spawns_materialize() {
        let pending = vec![
            PendingSpawnSnapshot {
                id: SpawnId::new(4),
                team: Team::Blue,
                kind: MinionKind::Melee,
                spawn_at: Duration::from_millis(30_000),
            },
            PendingSpawnSnapshot {
                id: SpawnId::new(5),
                team: Team::Red,
                kind: MinionKind::Melee,
                spawn_at: Duration::from_millis(30_080),
            },
        ];
        let mut out = Vec::new();
        system().materialize_due(
            &clock(Duration::from_millis(30_050), 1, Duration::from_secs(60)),
            &pending,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::MaterializeSpawn {
                spawn: SpawnId::new(4)
            }]
        );
    }
}
