//! Side-scrolling "flappy" environment used as the fitness oracle.
//!
//! The world is a 512 px tall corridor. A bird at a fixed horizontal
//! position falls under gravity and can flap upwards; pipe pairs with a
//! fixed-size gap scroll towards it. An [`Episode`] asks a [`Pilot`] for a
//! flap decision once per frame, passing an [`Observation`] of the nearest
//! pipe, until the bird collides or the frame limit is reached.
//!
//! All randomness (pipe heights) comes from a [`Pcg32`](rand_pcg::Pcg32)
//! seeded by an [`EpisodeSeed`], so an episode is fully reproducible.
//!
//! # Example
//!
//! ```
//! use flapevo_engine::{EpisodeSeed, Observation, run_episode};
//!
//! // a pilot that flaps whenever the gap is above the bird
//! let mut pilot = |obs: &Observation| obs.gap_distance < 0.0;
//! let stats = run_episode(&mut pilot, EpisodeSeed::new(7), 2_000);
//! assert!(stats.score() >= 0.0);
//! ```

pub use self::{episode::*, observation::*, world::*};

mod episode;
mod observation;
mod world;
