//! The environment seen by the training engine: one episode in, one score out.

use flapevo_controller::Controller;
use flapevo_engine::{DEFAULT_FRAME_LIMIT, EpisodeSeed, run_episode};

/// Runs one episode for a controller and returns its score.
///
/// The oracle owns all environment randomness; `seed` selects the episode so
/// that evaluation is reproducible. Implementations must be [`Sync`] because
/// controllers of one generation are evaluated on parallel threads.
pub trait Oracle: Sync {
    /// Plays one episode. The returned score must be finite and non-negative.
    fn run_episode(
        &self,
        controller: &mut Controller,
        seed: EpisodeSeed,
    ) -> Result<f32, OracleFault>;
}

/// Runtime fault raised while running an episode. Fatal for a training run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("oracle fault: {message}")]
pub struct OracleFault {
    message: String,
}

impl OracleFault {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_score(score: f32) -> Self {
        Self::new(format!("episode returned invalid score {score}"))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Oracle backed by the built-in flappy simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightOracle {
    frame_limit: usize,
}

impl Default for FlightOracle {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_LIMIT)
    }
}

impl FlightOracle {
    #[must_use]
    pub const fn new(frame_limit: usize) -> Self {
        Self { frame_limit }
    }

    #[must_use]
    pub const fn frame_limit(&self) -> usize {
        self.frame_limit
    }
}

impl Oracle for FlightOracle {
    fn run_episode(
        &self,
        controller: &mut Controller,
        seed: EpisodeSeed,
    ) -> Result<f32, OracleFault> {
        Ok(run_episode(controller, seed, self.frame_limit).score())
    }
}
