use anyhow::Result;
use lane_control_core::WaveState;
use lane_control_rendering::{RenderSink, Scene};
use tracing::info;

/// Render sink that reports the HUD through the log.
///
/// A line is emitted every `every` frames and whenever the wave label
/// changes.
#[derive(Debug)]
pub(crate) struct LogSink {
    every: u64,
    frames: u64,
    last_state: Option<WaveState>,
}

impl LogSink {
    pub(crate) fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
            last_state: None,
        }
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    fn should_report(&mut self, scene: &Scene) -> bool {
        self.frames = self.frames.saturating_add(1);
        let changed = self.last_state != Some(scene.hud.wave_state);
        self.last_state = Some(scene.hud.wave_state);
        changed || self.frames % self.every == 0
    }
}

impl RenderSink for LogSink {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        if self.should_report(scene) {
            info!(
                frame = self.frames,
                projectiles = scene.projectiles.len(),
                markers = scene.markers.len(),
                "{}",
                scene.hud
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_control_world::World;

    #[test]
    fn reports_on_cadence_and_label_changes() {
        let mut sink = LogSink::new(3);
        let mut scene = lane_control_simulation::capture_scene(&World::new());

        let reported: Vec<bool> = (0..6)
            .map(|frame| {
                if frame == 4 {
                    scene.hud.wave_state = WaveState::Crashing;
                }
                sink.should_report(&scene)
            })
            .collect();
        assert_eq!(reported, vec![true, false, true, false, true, true]);
        assert_eq!(sink.frames(), 6);
    }
}
