use crate::world::{BIRD_CENTER_OFFSET, Bird, Pipe};

/// Constant bias term appended to every raw observation.
pub const OBSERVATION_BIAS: f32 = 1.0;

/// Raw per-frame view of the world handed to a [`Pilot`](crate::Pilot).
///
/// All values are in pixels and are not normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Vertical offset from the bird's center to the center of the next gap.
    ///
    /// Negative when the gap is above the bird.
    pub gap_distance: f32,
    /// Horizontal distance from the bird to the next pipe's leading edge.
    pub horizontal_distance: f32,
    /// The bird's vertical position (top edge, growing downwards).
    pub bird_height: f32,
}

impl Observation {
    #[must_use]
    pub const fn new(gap_distance: f32, horizontal_distance: f32, bird_height: f32) -> Self {
        Self {
            gap_distance,
            horizontal_distance,
            bird_height,
        }
    }

    /// Builds the observation of `pipe` as seen from `bird`.
    #[must_use]
    pub fn of(bird: &Bird, pipe: &Pipe) -> Self {
        Self {
            gap_distance: pipe.gap_center() - (bird.y() + BIRD_CENTER_OFFSET),
            horizontal_distance: pipe.x() - bird.x(),
            bird_height: bird.y(),
        }
    }

    /// Returns the observation as `[gap, horizontal, height, bias]`.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [
            self.gap_distance,
            self.horizontal_distance,
            self.bird_height,
            OBSERVATION_BIAS,
        ]
    }
}
