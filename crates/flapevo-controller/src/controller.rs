use flapevo_engine::{Observation, Pilot};
use rand::Rng;

use crate::{Architecture, ArchitectureError, Features, Mutation, Network};

/// A candidate solution: network weights, fitness bookkeeping and the
/// per-trial inference state.
///
/// Controllers are ranked by [`Controller::fitness`]; the type itself has no
/// ordering.
#[derive(Debug, Clone)]
pub struct Controller {
    network: Network,
    fitness: f32,
    relative_fitness: f32,
    last_observed_y: Option<f32>,
}

/// Intermediate values of one inference step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    pub features: Features,
    pub output: f32,
    pub decision: bool,
}

impl Controller {
    #[must_use]
    pub fn new(network: Network) -> Self {
        Self {
            network,
            fitness: 0.0,
            relative_fitness: 0.0,
            last_observed_y: None,
        }
    }

    /// Creates a controller with Xavier-initialized random weights.
    pub fn random<R>(architecture: Architecture, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(Network::random(architecture, rng))
    }

    /// Creates a controller from an existing weight vector.
    pub fn from_weights(
        architecture: Architecture,
        weights: Vec<f32>,
    ) -> Result<Self, ArchitectureError> {
        Ok(Self::new(Network::new(architecture, weights)?))
    }

    #[must_use]
    pub fn with_fitness(mut self, fitness: f32) -> Self {
        self.fitness = fitness;
        self
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn architecture(&self) -> Architecture {
        self.network.architecture()
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        self.network.weights()
    }

    /// Result of the most recent fitness evaluation (0 before the first one).
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Share of its generation's total fitness.
    #[must_use]
    pub fn relative_fitness(&self) -> f32 {
        self.relative_fitness
    }

    pub fn set_relative_fitness(&mut self, relative_fitness: f32) {
        self.relative_fitness = relative_fitness;
    }

    #[must_use]
    pub fn last_observed_y(&self) -> Option<f32> {
        self.last_observed_y
    }

    /// Forgets the last observed height. Call before every independent trial.
    pub fn reset_trial_state(&mut self) {
        self.last_observed_y = None;
    }

    /// Runs the network on an observation and records its height.
    pub fn infer(&mut self, observation: &Observation) -> Inference {
        let features = Features::extract(observation, self.last_observed_y);
        self.last_observed_y = Some(observation.bird_height);
        let output = self.network.forward(features.as_array());
        Inference {
            features,
            output,
            decision: output > 0.0,
        }
    }

    /// Returns `true` to flap.
    pub fn observe(&mut self, observation: &Observation) -> bool {
        self.infer(observation).decision
    }

    /// Returns a new controller with mutated weights and fresh state.
    #[must_use]
    pub fn mutated<R>(&self, mutation: &Mutation, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(self.network.mutated(mutation, rng))
    }

    /// Returns an unmutated copy with fitness and trial state reset.
    #[must_use]
    pub fn elite_copy(&self) -> Self {
        Self::new(self.network.clone())
    }
}

impl Pilot for Controller {
    fn decide(&mut self, observation: &Observation) -> bool {
        self.observe(observation)
    }
}
