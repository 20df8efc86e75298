//! Hand-tuned weights for the default 6-8-1 network.
//!
//! Useful as a baseline and as a fallback when no trained model is available.

use flapevo_controller::{Architecture, Controller};

/// Fitness reported for the sample model.
pub const SAMPLE_FITNESS: f32 = 120.0;

#[rustfmt::skip]
pub const SAMPLE_WEIGHTS: [f32; 65] = [
    // W1, one row per feature
    // gap distance
    -0.8, 0.2, -0.6, 0.4, -0.3, 0.7, -0.5, 0.1,
    // horizontal distance
    0.3, -0.1, 0.5, -0.2, 0.4, -0.3, 0.2, 0.6,
    // height
    -0.2, 0.4, -0.1, 0.3, -0.4, 0.2, -0.3, 0.5,
    // velocity
    -0.9, 0.1, -0.7, 0.3, -0.5, 0.8, -0.4, 0.2,
    // urgency
    0.4, -0.2, 0.6, -0.1, 0.3, -0.4, 0.5, -0.3,
    // alignment
    0.2, 0.5, -0.1, 0.4, -0.2, 0.3, 0.1, -0.4,
    // b1
    0.1, -0.2, 0.0, 0.3, -0.1, 0.2, -0.3, 0.1,
    // W2
    0.7, -0.3, 0.5, -0.8, 0.4, 0.6, -0.2, 0.9,
    // b2
    -0.1,
];

#[must_use]
pub fn sample_controller() -> Controller {
    Controller::from_weights(Architecture::DEFAULT, SAMPLE_WEIGHTS.to_vec())
        .expect("sample weights fit the default architecture")
        .with_fitness(SAMPLE_FITNESS)
}
