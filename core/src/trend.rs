//! Rolling history consumed by the wave-state classifier.

use std::{collections::VecDeque, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Team;

/// Maximum number of spawn-cycle advantages retained.
pub const MAX_SPAWN_HISTORY: usize = 32;

/// Per-tick measurements of the wave equilibrium.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSample {
    /// Simulation time of the sample.
    pub at: Duration,
    /// Lane-axis midpoint between the two fronts, if any minion is alive.
    pub midpoint: Option<f32>,
    /// Alive blue minions.
    pub blue_alive: u32,
    /// Alive red minions.
    pub red_alive: u32,
    /// Team with minions fighting inside the enemy turret's range.
    pub crashing: Option<Team>,
}

impl WaveSample {
    /// Alive minions of the provided team.
    #[must_use]
    pub const fn alive(&self, team: Team) -> u32 {
        match team {
            Team::Blue => self.blue_alive,
            Team::Red => self.red_alive,
        }
    }
}

/// Most recent crash observed by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashRecord {
    /// Simulation time of the last sample that observed the crash.
    pub at: Duration,
    /// Team whose wave crashed into the enemy turret.
    pub team: Team,
    /// Largest alive count of the crashing team during the crash.
    pub peak_alive: u32,
}

/// Time-windowed sample history plus per-spawn-cycle numbers advantages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveTrend {
    samples: VecDeque<WaveSample>,
    spawn_advantages: VecDeque<i32>,
    last_crash: Option<CrashRecord>,
}

impl WaveTrend {
    /// Appends a sample and drops samples older than `history`.
    pub fn record_sample(&mut self, sample: WaveSample, history: Duration) {
        if let Some(team) = sample.crashing {
            let continuing = self
                .samples
                .back()
                .is_some_and(|previous| previous.crashing == Some(team));
            let alive = sample.alive(team);
            let peak_alive = match self.last_crash {
                Some(record) if continuing && record.team == team => record.peak_alive.max(alive),
                _ => alive,
            };
            self.last_crash = Some(CrashRecord {
                at: sample.at,
                team,
                peak_alive,
            });
        }

        self.samples.push_back(sample);
        let horizon = sample.at.saturating_sub(history);
        while self
            .samples
            .front()
            .is_some_and(|oldest| oldest.at < horizon)
        {
            let _ = self.samples.pop_front();
        }
    }

    /// Records the blue-minus-red alive advantage observed when a wave spawned.
    pub fn record_spawn_cycle(&mut self, blue_alive: u32, red_alive: u32) {
        let advantage = i64::from(blue_alive) - i64::from(red_alive);
        let advantage = i32::try_from(advantage).unwrap_or(if advantage > 0 {
            i32::MAX
        } else {
            i32::MIN
        });
        self.spawn_advantages.push_back(advantage);
        while self.spawn_advantages.len() > MAX_SPAWN_HISTORY {
            let _ = self.spawn_advantages.pop_front();
        }
    }

    /// Samples retained inside the history window, oldest first.
    pub fn samples(&self) -> impl DoubleEndedIterator<Item = &WaveSample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// Most recent sample.
    #[must_use]
    pub fn latest(&self) -> Option<&WaveSample> {
        self.samples.back()
    }

    /// Oldest retained sample.
    #[must_use]
    pub fn oldest(&self) -> Option<&WaveSample> {
        self.samples.front()
    }

    /// Spawn-cycle advantages, oldest first.
    pub fn spawn_advantages(&self) -> impl DoubleEndedIterator<Item = i32> + ExactSizeIterator + '_ {
        self.spawn_advantages.iter().copied()
    }

    /// Most recent crash, if any was observed.
    #[must_use]
    pub const fn last_crash(&self) -> Option<CrashRecord> {
        self.last_crash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(at_ms: u64, blue: u32, red: u32, crashing: Option<Team>) -> WaveSample {
        WaveSample {
            at: Duration::from_millis(at_ms),
            midpoint: Some(600.0),
            blue_alive: blue,
            red_alive: red,
            crashing,
        }
    }

    #[test]
    fn samples_outside_history_are_pruned() {
        let mut trend = WaveTrend::default();
        let history = Duration::from_secs(2);
        for step in 0..50 {
            trend.record_sample(sample(step * 100, 3, 3, None), history);
        }
        let oldest = trend.oldest().expect("oldest sample").at;
        let latest = trend.latest().expect("latest sample").at;
        assert_eq!(latest, Duration::from_millis(4_900));
        assert!(latest - oldest <= history);
        assert_eq!(oldest, Duration::from_millis(2_900));
    }

    #[test]
    fn crash_peak_tracks_continuous_crash_only() {
        let mut trend = WaveTrend::default();
        let history = Duration::from_secs(10);
        trend.record_sample(sample(0, 4, 2, Some(Team::Blue)), history);
        trend.record_sample(sample(100, 6, 2, Some(Team::Blue)), history);
        trend.record_sample(sample(200, 5, 2, Some(Team::Blue)), history);
        assert_eq!(trend.last_crash().map(|record| record.peak_alive), Some(6));

        trend.record_sample(sample(300, 2, 2, None), history);
        trend.record_sample(sample(400, 3, 2, Some(Team::Blue)), history);
        let record = trend.last_crash().expect("crash record");
        assert_eq!(record.peak_alive, 3);
        assert_eq!(record.at, Duration::from_millis(400));
    }

    #[test]
    fn spawn_history_is_bounded() {
        let mut trend = WaveTrend::default();
        for cycle in 0..(MAX_SPAWN_HISTORY as u32 + 5) {
            trend.record_spawn_cycle(cycle, 0);
        }
        assert_eq!(trend.spawn_advantages().len(), MAX_SPAWN_HISTORY);
        assert_eq!(trend.spawn_advantages().next(), Some(5));
    }
}
