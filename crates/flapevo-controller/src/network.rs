use rand::Rng;
use rand_distr::{Normal, NormalError};

use crate::{Architecture, ArchitectureError};

/// Weights are clipped to `[-WEIGHT_LIMIT, WEIGHT_LIMIT]` after mutation.
pub const WEIGHT_LIMIT: f32 = 3.0;

/// Feed-forward network with one tanh hidden layer and a linear scalar output.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    architecture: Architecture,
    weights: Vec<f32>,
}

impl Network {
    /// Wraps an existing weight vector.
    ///
    /// Fails if `weights` does not have exactly
    /// [`Architecture::total_weights`] elements.
    pub fn new(architecture: Architecture, weights: Vec<f32>) -> Result<Self, ArchitectureError> {
        architecture.check_weight_count(weights.len())?;
        Ok(Self {
            architecture,
            weights,
        })
    }

    /// Samples every weight uniformly from `±architecture.xavier_limit()`.
    pub fn random<R>(architecture: Architecture, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let limit = architecture.xavier_limit();
        let weights = (0..architecture.total_weights())
            .map(|_| rng.random_range(-limit..=limit))
            .collect();
        Self {
            architecture,
            weights,
        }
    }

    #[must_use]
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Computes `tanh(x·W1 + b1)·W2 + b2`.
    ///
    /// # Panics
    ///
    /// Panics if `input` does not have one value per input feature.
    #[must_use]
    pub fn forward(&self, input: &[f32]) -> f32 {
        let features = self.architecture.num_features();
        let hidden = self.architecture.hidden_size();
        assert_eq!(input.len(), features, "input length mismatch");

        let (w1, rest) = self.weights.split_at(features * hidden);
        let (b1, rest) = rest.split_at(hidden);
        let (w2, b2) = rest.split_at(hidden);

        let output = (0..hidden)
            .map(|j| {
                let z = b1[j]
                    + input
                        .iter()
                        .enumerate()
                        .map(|(i, x)| x * w1[i * hidden + j])
                        .sum::<f32>();
                z.tanh() * w2[j]
            })
            .sum::<f32>();
        output + b2[0]
    }

    /// Returns a copy with [`Mutation`] applied to every weight.
    #[must_use]
    pub fn mutated<R>(&self, mutation: &Mutation, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut weights = self.weights.clone();
        mutation.apply(&mut weights, rng);
        Self {
            architecture: self.architecture,
            weights,
        }
    }
}

/// Additive Gaussian noise `N(0, σ)` on every weight, then clipping to
/// `[-WEIGHT_LIMIT, WEIGHT_LIMIT]`.
#[derive(Debug, Clone, Copy)]
pub struct Mutation {
    noise: Normal<f32>,
}

impl Mutation {
    /// Fails if `std_dev` is negative or not finite.
    pub fn new(std_dev: f32) -> Result<Self, NormalError> {
        Ok(Self {
            noise: Normal::new(0.0, std_dev)?,
        })
    }

    #[must_use]
    pub fn std_dev(&self) -> f32 {
        self.noise.std_dev()
    }

    pub fn apply<R>(&self, weights: &mut [f32], rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for w in weights {
            *w = (*w + rng.sample(self.noise)).clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
        }
    }
}
