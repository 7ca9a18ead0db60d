//! Collaborators the driver consumes: frame clock, operator input and state
//! persistence. Each port ships with a deterministic implementation usable in
//! tests and headless runs.

use std::{
    collections::BTreeMap,
    io,
    time::{Duration, Instant},
};

use lane_control_core::InputSnapshot;
use lane_control_world::World;
use thiserror::Error;

/// Longest frame delta a wall clock reports, so a stalled process does not
/// dump seconds of simulation into one tick.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Source of frame deltas.
pub trait Clock {
    /// Time elapsed since the previous frame.
    fn frame_delta(&mut self) -> Duration;
}

/// Monotonic wall clock.
#[derive(Debug)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    /// Creates a clock whose first delta is measured from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn frame_delta(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        delta.min(MAX_FRAME_DELTA)
    }
}

/// Clock reporting the same delta every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    delta: Duration,
}

impl FixedClock {
    /// Creates a clock that always reports `delta`.
    #[must_use]
    pub const fn new(delta: Duration) -> Self {
        Self { delta }
    }
}

impl Clock for FixedClock {
    fn frame_delta(&mut self) -> Duration {
        self.delta
    }
}

/// Source of per-frame operator input.
pub trait InputSource {
    /// Input captured for the next frame.
    fn next_snapshot(&mut self) -> InputSnapshot;
}

/// Input replayed from a timeline keyed by frame index.
///
/// Frames without an entry produce an empty snapshot.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    timeline: BTreeMap<u64, InputSnapshot>,
    frame: u64,
}

impl ScriptedInput {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `snapshot` for the frame at `index`, merging it with input
    /// already scheduled for that frame.
    #[must_use]
    pub fn at(mut self, index: u64, snapshot: InputSnapshot) -> Self {
        let merged = match self.timeline.remove(&index) {
            Some(existing) => merge(existing, snapshot),
            None => snapshot,
        };
        let _ = self.timeline.insert(index, merged);
        self
    }

    /// Index of the frame the next snapshot belongs to.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

impl InputSource for ScriptedInput {
    fn next_snapshot(&mut self) -> InputSnapshot {
        let snapshot = self.timeline.remove(&self.frame).unwrap_or_default();
        self.frame = self.frame.saturating_add(1);
        snapshot
    }
}

fn merge(mut base: InputSnapshot, later: InputSnapshot) -> InputSnapshot {
    if later.cursor.is_some() {
        base.cursor = later.cursor;
    }
    base.click |= later.click;
    base.held.extend(later.held);
    base.pressed.extend(later.pressed);
    base
}

/// Errors raised while loading or persisting simulation state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("state storage i/o failed")]
    Io(#[from] io::Error),
    /// The stored payload was not a valid world document.
    #[error("state payload is malformed")]
    Serde(#[from] serde_json::Error),
}

/// Persistence of the world between frames.
pub trait StateStore {
    /// Loads the stored world, or `None` when nothing was stored yet.
    fn load(&mut self) -> Result<Option<World>, StoreError>;

    /// Replaces the stored world.
    fn save(&mut self, world: &World) -> Result<(), StoreError>;
}

/// Serialises a world into the JSON document used by every store.
pub fn encode_world(world: &World) -> Result<String, StoreError> {
    Ok(serde_json::to_string(world)?)
}

/// Parses a JSON document produced by [`encode_world`].
pub fn decode_world(document: &str) -> Result<World, StoreError> {
    Ok(serde_json::from_str(document)?)
}

/// In-memory store holding the encoded document.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    document: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with an arbitrary document.
    #[must_use]
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }

    /// Currently stored document.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl StateStore for MemoryStore {
    fn load(&mut self) -> Result<Option<World>, StoreError> {
        self.document.as_deref().map(decode_world).transpose()
    }

    fn save(&mut self, world: &World) -> Result<(), StoreError> {
        self.document = Some(encode_world(world)?);
        Ok(())
    }
}
