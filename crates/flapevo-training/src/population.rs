//! A generation of controllers and its parallel fitness evaluation.
//!
//! Every controller plays its trials on its own scoped thread with a private
//! RNG seeded from the run RNG, so results do not depend on thread scheduling.

use std::{panic, thread};

use flapevo_controller::{Architecture, Controller};
use flapevo_stats::descriptive::DescriptiveStats;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use tracing::debug;

use crate::{
    fitness::FitnessEvaluator,
    oracle::{Oracle, OracleFault},
    selection,
};

/// A generation of controllers sharing one architecture.
#[derive(Debug, Clone)]
pub struct Population {
    controllers: Vec<Controller>,
}

impl Population {
    /// Creates `count` randomly initialized controllers.
    #[must_use]
    pub fn random<R>(architecture: Architecture, count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let controllers = (0..count)
            .map(|_| Controller::random(architecture, rng))
            .collect();
        Self { controllers }
    }

    #[must_use]
    pub fn from_controllers(controllers: Vec<Controller>) -> Self {
        Self { controllers }
    }

    #[must_use]
    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// The fittest controller; only meaningful after [`Self::evaluate_fitness`].
    #[must_use]
    pub fn best(&self) -> Option<&Controller> {
        self.controllers.first()
    }

    #[must_use]
    pub fn is_ranked(&self) -> bool {
        selection::is_ranked(&self.controllers)
    }

    /// Evaluates every controller on its own thread, then ranks the population
    /// by descending fitness and assigns relative fitness.
    ///
    /// Each controller gets an independent random stream seeded from `rng`
    /// before any thread starts, so the outcome does not depend on thread
    /// scheduling. Returns the first oracle fault in population order.
    pub fn evaluate_fitness<O, R>(
        &mut self,
        evaluator: &FitnessEvaluator,
        oracle: &O,
        rng: &mut R,
    ) -> Result<(), OracleFault>
    where
        O: Oracle + ?Sized,
        R: Rng + ?Sized,
    {
        let seeds = (0..self.controllers.len())
            .map(|_| rng.random::<u64>())
            .collect::<Vec<_>>();

        let results = thread::scope(|s| {
            let handles = self
                .controllers
                .iter_mut()
                .zip(seeds)
                .map(|(controller, seed)| {
                    s.spawn(move || -> Result<f32, OracleFault> {
                        let mut rng = Pcg32::seed_from_u64(seed);
                        let fitness = evaluator.evaluate(controller, oracle, &mut rng)?;
                        controller.set_fitness(fitness);
                        Ok(fitness)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect::<Vec<Result<f32, OracleFault>>>()
        });

        for (i, result) in results.into_iter().enumerate() {
            let fitness = result?;
            debug!(controller = i, fitness, "controller evaluated");
        }

        self.assign_relative_fitness();
        selection::rank(&mut self.controllers);
        Ok(())
    }

    /// Sum of all fitness scores.
    #[must_use]
    pub fn total_fitness(&self) -> f32 {
        self.controllers.iter().map(Controller::fitness).sum()
    }

    /// Sets each controller's share of the total fitness (all zero when the
    /// total is zero).
    pub fn assign_relative_fitness(&mut self) {
        let total = self.total_fitness();
        for controller in &mut self.controllers {
            let relative = if total == 0.0 {
                0.0
            } else {
                controller.fitness() / total
            };
            controller.set_relative_fitness(relative);
        }
    }

    /// Descriptive statistics of each weight across the population, useful to
    /// see which genes have converged.
    #[must_use]
    pub fn compute_weight_stats(&self) -> Vec<DescriptiveStats> {
        let len = self.controllers.first().map_or(0, |c| c.weights().len());
        (0..len)
            .filter_map(|i| DescriptiveStats::new(self.controllers.iter().map(|c| c.weights()[i])))
            .collect()
    }

    /// Descriptive statistics of the population's fitness.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.controllers.iter().map(Controller::fitness))
    }
}

#[cfg(test)]
mod tests {
    use flapevo_engine::EpisodeSeed;

    use super::*;

    /// Scores a controller by its first weight, never failing.
    struct FirstWeight;

    impl Oracle for FirstWeight {
        fn run_episode(
            &self,
            controller: &mut Controller,
            _seed: EpisodeSeed,
        ) -> Result<f32, OracleFault> {
            Ok(controller.weights()[0].abs() * 100.0)
        }
    }

    /// Fails for controllers with a negative first weight.
    struct Picky;

    impl Oracle for Picky {
        fn run_episode(
            &self,
            controller: &mut Controller,
            _seed: EpisodeSeed,
        ) -> Result<f32, OracleFault> {
            if controller.weights()[0] < 0.0 {
                return Err(OracleFault::new("negative"));
            }
            Ok(1.0)
        }
    }

    #[test]
    fn test_evaluate_ranks_and_assigns_relative_fitness() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut population = Population::random(Architecture::DEFAULT, 8, &mut rng);
        population
            .evaluate_fitness(&FitnessEvaluator::new(2), &FirstWeight, &mut rng)
            .unwrap();

        assert!(population.is_ranked());
        for c in population.controllers() {
            assert!((c.fitness() - c.weights()[0].abs() * 100.0).abs() < 1e-4);
        }
        let shares: f32 = population
            .controllers()
            .iter()
            .map(Controller::relative_fitness)
            .sum();
        assert!((shares - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_total_fitness_gives_zero_shares() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut population = Population::random(Architecture::DEFAULT, 3, &mut rng);
        population.assign_relative_fitness();
        assert!(
            population
                .controllers()
                .iter()
                .all(|c| c.relative_fitness() == 0.0)
        );
    }

    #[test]
    fn test_fault_is_propagated() {
        let arch = Architecture::DEFAULT;
        let mut weights = vec![0.5; arch.total_weights()];
        let ok = Controller::from_weights(arch, weights.clone()).unwrap();
        weights[0] = -0.5;
        let bad = Controller::from_weights(arch, weights).unwrap();
        let mut population = Population::from_controllers(vec![ok, bad]);
        let mut rng = Pcg32::seed_from_u64(2);
        let err = population
            .evaluate_fitness(&FitnessEvaluator::new(1), &Picky, &mut rng)
            .unwrap_err();
        assert_eq!(err.message(), "negative");
    }

    #[test]
    fn test_weight_stats_cover_every_gene() {
        let mut rng = Pcg32::seed_from_u64(3);
        let population = Population::random(Architecture::DEFAULT, 5, &mut rng);
        let stats = population.compute_weight_stats();
        assert_eq!(stats.len(), Architecture::DEFAULT.total_weights());
        assert!(stats.iter().all(|s| s.count == 5));
        assert_eq!(population.compute_fitness_stats().unwrap().max, 0.0);
    }
}
