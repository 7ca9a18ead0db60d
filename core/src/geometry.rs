//! Planar geometry helpers shared by every system operating on lane positions.
//!
//! All positions are expressed in lane units with the origin at the top-left
//! corner of the canvas. The lane axis runs along `x`, from the blue endpoint
//! (small `x`) to the red endpoint (large `x`).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Distances below this threshold are treated as coincident points.
pub const COINCIDENT_EPSILON: f32 = 1.0e-4;

/// Axis-aligned playable region of the lane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneBounds {
    min: Vec2,
    max: Vec2,
}

impl LaneBounds {
    /// Creates bounds spanning `[0, width]` horizontally and `[top, bottom]` vertically.
    ///
    /// Inverted vertical limits are swapped so the bounds never describe an
    /// empty range.
    #[must_use]
    pub fn new(width: f32, top: f32, bottom: f32) -> Self {
        let (top, bottom) = if top <= bottom {
            (top, bottom)
        } else {
            (bottom, top)
        };
        Self {
            min: Vec2::new(0.0, top),
            max: Vec2::new(width.max(0.0), bottom),
        }
    }

    /// Smallest coordinate contained in the bounds.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Largest coordinate contained in the bounds.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Vertical coordinate of the lane axis.
    #[must_use]
    pub fn axis_y(&self) -> f32 {
        (self.min.y + self.max.y) * 0.5
    }

    /// Horizontal coordinate of the lane center.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        (self.min.x + self.max.x) * 0.5
    }

    /// Reports whether the point lies inside the bounds, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamps the point into the bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Reports whether `point` lies within `radius` of `center`, boundary included.
#[must_use]
pub fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    if radius < 0.0 {
        return false;
    }
    center.distance_squared(point) <= radius * radius
}

/// Reports whether two circles overlap or touch.
#[must_use]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    within_radius(a, b, radius_a + radius_b)
}

/// Moves `from` toward `to` by at most `max_step`, never overshooting.
#[must_use]
pub fn step_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let offset = to - from;
    let length = offset.length();
    if length <= max_step || length <= COINCIDENT_EPSILON {
        return to;
    }
    from + offset / length * max_step.max(0.0)
}
