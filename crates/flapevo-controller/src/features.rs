use flapevo_engine::Observation;

/// Number of features fed into the network.
pub const FEATURE_COUNT: usize = 6;

pub const GAP_DISTANCE_SCALE: f32 = 256.0;
pub const HORIZONTAL_DISTANCE_SCALE: f32 = 568.0;
pub const HEIGHT_SCALE: f32 = 512.0;
pub const VELOCITY_SCALE: f32 = 10.0;
/// Gap offsets smaller than this (in pixels) count as aligned.
pub const ALIGNMENT_THRESHOLD: f32 = 50.0;

/// Normalized network input derived from one observation.
///
/// | index | feature | value |
/// |-------|---------|-------|
/// | 0 | gap distance | `gap / 256` |
/// | 1 | horizontal distance | `horizontal / 568` |
/// | 2 | height | `height / 512` |
/// | 3 | velocity | `(height - last height) / 10`, 0 without a previous height |
/// | 4 | urgency | `min(horizontal / 568, 1)` |
/// | 5 | alignment | 1 if `abs(gap) < 50`, else 0 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features([f32; FEATURE_COUNT]);

impl Features {
    /// Extracts features from an observation and the previously observed height.
    ///
    /// ```
    /// use flapevo_controller::Features;
    /// use flapevo_engine::Observation;
    ///
    /// let obs = Observation::new(30.0, 180.0, 240.0);
    /// let features = Features::extract(&obs, Some(256.0));
    /// assert_eq!(features.velocity(), -1.6);
    /// assert_eq!(features.as_array()[5], 1.0);
    /// ```
    #[must_use]
    pub fn extract(observation: &Observation, last_observed_y: Option<f32>) -> Self {
        let Observation {
            gap_distance,
            horizontal_distance,
            bird_height,
        } = *observation;
        let velocity = last_observed_y.map_or(0.0, |last| bird_height - last);
        let horizontal = horizontal_distance / HORIZONTAL_DISTANCE_SCALE;
        Self([
            gap_distance / GAP_DISTANCE_SCALE,
            horizontal,
            bird_height / HEIGHT_SCALE,
            velocity / VELOCITY_SCALE,
            f32::min(horizontal, 1.0),
            if gap_distance.abs() < ALIGNMENT_THRESHOLD {
                1.0
            } else {
                0.0
            },
        ])
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.0[3]
    }
}
