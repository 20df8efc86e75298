//! Neural-network controller evolved by the training engine.
//!
//! A [`Controller`] turns a raw [`Observation`](flapevo_engine::Observation)
//! into a flap decision:
//!
//! ```text
//! Observation (gap, horizontal, height)
//!     ↓ Features::extract (+ last observed height → velocity)
//! 6 normalized features
//!     ↓ Network::forward: tanh(x·W1 + b1)·W2 + b2
//! scalar output
//!     ↓ output > 0
//! flap?
//! ```
//!
//! The only state carried between calls is the last observed bird height,
//! which must be cleared with [`Controller::reset_trial_state`] before every
//! independent episode.
//!
//! # Example
//!
//! ```
//! use flapevo_controller::{Architecture, Controller};
//! use flapevo_engine::Observation;
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
//! let mut controller = Controller::random(Architecture::DEFAULT, &mut rng);
//! assert_eq!(controller.weights().len(), 65);
//!
//! controller.reset_trial_state();
//! let _flap = controller.observe(&Observation::new(50.0, 200.0, 256.0));
//! assert_eq!(controller.last_observed_y(), Some(256.0));
//! ```

pub use self::{architecture::*, controller::*, features::*, network::*};

mod architecture;
mod controller;
mod features;
mod network;

/// Invalid architecture or a weight vector that does not fit one.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ArchitectureError {
    #[display("expected {expected} weights, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },
    #[display(
        "controller produces {} features, architecture declares {num_features}",
        FEATURE_COUNT
    )]
    UnsupportedFeatureCount { num_features: usize },
    #[display("hidden layer must have at least one neuron")]
    EmptyHiddenLayer,
}
