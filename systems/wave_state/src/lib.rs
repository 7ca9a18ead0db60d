#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system labelling the wave equilibrium once per tick.
//!
//! The classifier measures the two wave fronts, compares their meeting
//! point against the lane center and both turret ranges, and consults the
//! trend window kept in the world for the labels that need history
//! (frozen, bouncing and slow push). Labels are checked in a fixed
//! precedence so exactly one applies each tick:
//!
//! 1. `Crashing` while minions fight inside an enemy turret's range.
//! 2. `Bouncing` shortly after a crash once the crashing wave thinned out.
//! 3. `Frozen*` while the meeting point holds just outside a turret's range.
//! 4. `SlowPush*` while one side grows its numbers lead every spawn cycle.
//! 5. `Pushing*` when the meeting point left the neutral band or the
//!    engagement is lopsided.
//! 6. `Neutral` otherwise.

use std::time::Duration;

use lane_control_core::{
    config::{ClassifierConfig, SimConfig},
    Command, MinionView, Team, TurretSnapshot, TurretView, WaveSample, WaveState, WaveTrend,
};

/// Configuration parameters required to construct the classifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    thresholds: ClassifierConfig,
    lane_center: f32,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(thresholds: ClassifierConfig, lane_center: f32) -> Self {
        Self {
            thresholds,
            lane_center,
        }
    }

    /// Derives the classifier configuration from the simulation configuration.
    #[must_use]
    pub fn from_sim_config(config: &SimConfig) -> Self {
        Self::new(config.classifier.clone(), config.bounds().center_x())
    }
}

/// Label plus the measurements it was derived from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    /// Label for the current tick.
    pub state: WaveState,
    /// Sample to append to the trend window.
    pub sample: WaveSample,
}

/// Wave-state classifier.
#[derive(Debug)]
pub struct WaveClassifier {
    config: Config,
}

impl WaveClassifier {
    /// Creates a new classifier.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits the sample and label for the current tick.
    pub fn handle(
        &self,
        now: Duration,
        minions: &MinionView,
        turrets: &TurretView,
        trend: &WaveTrend,
        out: &mut Vec<Command>,
    ) {
        let Classification { state, sample } = self.classify(now, minions, turrets, trend);
        out.push(Command::RecordWaveSample { sample });
        out.push(Command::PublishWaveState { state });
    }

    /// Classifies the wave using the trend recorded before this tick.
    #[must_use]
    pub fn classify(
        &self,
        now: Duration,
        minions: &MinionView,
        turrets: &TurretView,
        trend: &WaveTrend,
    ) -> Classification {
        let fronts = Fronts::measure(minions);
        let sample = WaveSample {
            at: now,
            midpoint: fronts.midpoint(),
            blue_alive: fronts.blue_alive,
            red_alive: fronts.red_alive,
            crashing: crashing_team(minions, turrets),
        };

        let state = if sample.crashing.is_some() {
            WaveState::Crashing
        } else if self.bouncing(&sample, trend) {
            WaveState::Bouncing
        } else if let Some(team) = self.frozen_before(&sample, turrets, trend) {
            WaveState::frozen(team)
        } else if let Some(team) = self.slow_push(&sample, trend) {
            WaveState::slow_push(team)
        } else if let Some(team) = self.pushing(&sample, &fronts) {
            WaveState::pushing(team)
        } else {
            WaveState::Neutral
        };

        Classification { state, sample }
    }

    fn bouncing(&self, sample: &WaveSample, trend: &WaveTrend) -> bool {
        let Some(crash) = trend.last_crash() else {
            return false;
        };
        sample.at.saturating_sub(crash.at) <= self.config.thresholds.bounce_window()
            && sample.alive(crash.team) < crash.peak_alive
    }

    /// Turret team whose range boundary currently holds the wave still.
    fn frozen_before(
        &self,
        sample: &WaveSample,
        turrets: &TurretView,
        trend: &WaveTrend,
    ) -> Option<Team> {
        let thresholds = &self.config.thresholds;
        let midpoint = sample.midpoint?;
        let turret = turrets
            .iter()
            .filter(|turret| turret.is_alive())
            .find(|turret| self.in_freeze_zone(turret, midpoint))?;

        let window_start = sample.at.checked_sub(thresholds.freeze_hold())?;
        if !trend
            .oldest()
            .is_some_and(|oldest| oldest.at <= window_start)
        {
            return None;
        }

        let window: Vec<&WaveSample> = trend
            .samples()
            .filter(|past| past.at >= window_start)
            .chain(std::iter::once(sample))
            .collect();
        let held = window.iter().all(|past| {
            past.midpoint
                .is_some_and(|past_midpoint| (past_midpoint - midpoint).abs() <= thresholds.freeze_tolerance)
        });
        let defenders_not_growing = window
            .windows(2)
            .all(|pair| pair[1].alive(turret.team) <= pair[0].alive(turret.team));

        (held && defenders_not_growing).then_some(turret.team)
    }

    fn in_freeze_zone(&self, turret: &TurretSnapshot, midpoint: f32) -> bool {
        let distance = (midpoint - turret.position.x).abs();
        distance > turret.range && distance <= turret.range + self.config.thresholds.freeze_margin
    }

    fn slow_push(&self, sample: &WaveSample, trend: &WaveTrend) -> Option<Team> {
        let cycles = usize::try_from(self.config.thresholds.slow_push_cycles).ok()?;
        if cycles == 0 || trend.spawn_advantages().len() < cycles {
            return None;
        }
        let current = i64::from(sample.blue_alive) - i64::from(sample.red_alive);
        let team = match current.signum() {
            1 => Team::Blue,
            -1 => Team::Red,
            _ => return None,
        };
        let skip = trend.spawn_advantages().len() - cycles;
        let recent: Vec<i64> = trend
            .spawn_advantages()
            .skip(skip)
            .map(|advantage| match team {
                Team::Blue => i64::from(advantage),
                Team::Red => -i64::from(advantage),
            })
            .collect();

        let same_side = recent.iter().all(|lead| *lead > 0);
        let growing = recent.windows(2).all(|pair| pair[1] > pair[0]);
        (same_side && growing).then_some(team)
    }

    fn pushing(&self, sample: &WaveSample, fronts: &Fronts) -> Option<Team> {
        let thresholds = &self.config.thresholds;
        let midpoint = sample.midpoint?;
        let offset = midpoint - self.config.lane_center;
        if offset > thresholds.neutral_band {
            return Some(Team::Blue);
        }
        if offset < -thresholds.neutral_band {
            return Some(Team::Red);
        }

        let (blue, red) = (sample.blue_alive, sample.red_alive);
        if blue.abs_diff(red) > thresholds.neutral_count_tolerance {
            return Some(if blue > red { Team::Blue } else { Team::Red });
        }

        let (blue_hp, red_hp) = (fronts.blue_health, fronts.red_health);
        let strongest = blue_hp.max(red_hp);
        if strongest == 0 {
            return None;
        }
        let ratio = blue_hp.min(red_hp) as f32 / strongest as f32;
        if ratio < thresholds.neutral_hp_ratio {
            return Some(if blue_hp > red_hp { Team::Blue } else { Team::Red });
        }
        None
    }
}

/// Front-most positions and totals of both waves.
#[derive(Debug, Default)]
struct Fronts {
    blue: Option<f32>,
    red: Option<f32>,
    blue_alive: u32,
    red_alive: u32,
    blue_health: u64,
    red_health: u64,
}

impl Fronts {
    fn measure(minions: &MinionView) -> Self {
        let mut fronts = Self::default();
        for minion in minions.alive() {
            let x = minion.position.x;
            let health = u64::from(minion.health.get());
            match minion.team {
                Team::Blue => {
                    fronts.blue = Some(fronts.blue.map_or(x, |front| front.max(x)));
                    fronts.blue_alive += 1;
                    fronts.blue_health += health;
                }
                Team::Red => {
                    fronts.red = Some(fronts.red.map_or(x, |front| front.min(x)));
                    fronts.red_alive += 1;
                    fronts.red_health += health;
                }
            }
        }
        fronts
    }

    fn midpoint(&self) -> Option<f32> {
        match (self.blue, self.red) {
            (Some(blue), Some(red)) => Some((blue + red) * 0.5),
            (front @ Some(_), None) | (None, front @ Some(_)) => front,
            (None, None) => None,
        }
    }
}

/// Team with minions inside the range of a living enemy turret.
///
/// When both waves reach the opposing turret at once the team with more
/// minions inside range wins; ties go to blue.
fn crashing_team(minions: &MinionView, turrets: &TurretView) -> Option<Team> {
    let inside = |team: Team| -> usize {
        let Some(turret) = turrets
            .of_team(team.opponent())
            .filter(|turret| turret.is_alive())
        else {
            return 0;
        };
        minions
            .alive()
            .filter(|minion| minion.team == team && turret.covers(minion.position))
            .count()
    };

    match (inside(Team::Blue), inside(Team::Red)) {
        (0, 0) => None,
        (blue, red) if blue >= red => Some(Team::Blue),
        _ => Some(Team::Red),
    }
}
