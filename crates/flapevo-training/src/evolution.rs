//! The generational loop.
//!
//! One epoch walks through the phases
//!
//! ```text
//! Initialized ─┐
//!              ↓
//!          Evaluating → Recording → Recombining ─┐
//!              ↑                                  │
//!              └──────────────────────────────────┘
//!                         (last epoch) → Terminated
//! ```
//!
//! - **Evaluating**: every controller is scored by the [`FitnessEvaluator`]
//!   and the population is ranked
//! - **Recording**: a [`GenerationRecord`] is appended to the log
//! - **Recombining**: [`Evolver::evolve`] builds the next generation from the
//!   elites and the offspring of the survivor pool
//!
//! [`Evolution::run`] drives the whole loop; callers that want to report on
//! each epoch can call [`Evolution::evaluate`], [`Evolution::record`] and
//! [`Evolution::advance`] themselves.

use std::io;

use flapevo_controller::{Architecture, ArchitectureError, Controller, Mutation};
use rand::Rng;
use rand_pcg::Pcg32;
use tracing::info;

use crate::{
    fitness::FitnessEvaluator,
    operators::{self, CrossoverStrategy},
    oracle::{Oracle, OracleFault},
    population::Population,
    record::{GenerationLog, GenerationRecord},
    selection,
};

/// Parameters of one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub epochs: usize,
    /// Episodes played per controller and epoch.
    pub trials: usize,
    /// Top controllers copied unchanged into the next generation.
    pub elite_count: usize,
    /// Fraction of the ranked population eligible as parents.
    pub survival_rate: f32,
    pub tournament_size: usize,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f32,
    pub crossover: CrossoverStrategy,
    pub architecture: Architecture,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            epochs: 50,
            trials: 3,
            elite_count: 5,
            survival_rate: 0.35,
            tournament_size: 3,
            mutation_sigma: 0.1,
            crossover: CrossoverStrategy::Blend,
            architecture: Architecture::DEFAULT,
        }
    }
}

/// Rejected [`EvolutionConfig`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be positive")]
    EmptyPopulation,
    #[display("at least one epoch is required")]
    NoEpochs,
    #[display("at least one trial is required")]
    NoTrials,
    #[display("elite count {elite_count} exceeds population size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("survival rate must be in (0, 1], got {survival_rate}")]
    InvalidSurvivalRate { survival_rate: f32 },
    #[display("tournament size must be positive")]
    EmptyTournament,
    #[display("mutation sigma must be finite and non-negative, got {sigma}")]
    InvalidMutationSigma { sigma: f32 },
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.epochs == 0 {
            return Err(ConfigError::NoEpochs);
        }
        if self.trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        if self.elite_count > self.population_size {
            return Err(ConfigError::TooManyElites {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if !(self.survival_rate > 0.0 && self.survival_rate <= 1.0) {
            return Err(ConfigError::InvalidSurvivalRate {
                survival_rate: self.survival_rate,
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        self.mutation()?;
        Ok(())
    }

    /// Size of the parent pool; see [`selection::survivor_count`].
    #[must_use]
    pub fn survivor_count(&self) -> usize {
        selection::survivor_count(self.population_size, self.survival_rate)
    }

    fn mutation(&self) -> Result<Mutation, ConfigError> {
        Mutation::new(self.mutation_sigma).map_err(|_| ConfigError::InvalidMutationSigma {
            sigma: self.mutation_sigma,
        })
    }
}

/// Builds the next generation from a ranked one.
#[derive(Debug, Clone)]
pub struct Evolver {
    elite_count: usize,
    survivor_count: usize,
    tournament_size: usize,
    crossover: CrossoverStrategy,
    mutation: Mutation,
}

impl Evolver {
    pub fn from_config(config: &EvolutionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            elite_count: config.elite_count,
            survivor_count: config.survivor_count(),
            tournament_size: config.tournament_size,
            crossover: config.crossover,
            mutation: config.mutation()?,
        })
    }

    /// Evolves the population to create the next generation.
    ///
    /// 1. Copies the top `elite_count` controllers unchanged
    /// 2. Fills the remaining slots with mutated offspring of two parents,
    ///    each picked by tournament from the top `survivor_count` controllers
    ///
    /// The result has the same size as `population` and is not evaluated.
    ///
    /// # Panics
    ///
    /// Panics if `population` is not ranked by descending fitness.
    pub fn evolve<R>(
        &self,
        population: &Population,
        rng: &mut R,
    ) -> Result<Population, ArchitectureError>
    where
        R: Rng + ?Sized,
    {
        assert!(population.is_ranked(), "population must be ranked");
        let ranked = population.controllers();
        let pool = &ranked[..self.survivor_count.min(ranked.len())];

        let mut next = selection::elites(ranked, self.elite_count.min(ranked.len()));
        while next.len() < ranked.len() {
            let (p1, p2) =
                selection::select_parents(pool, Controller::fitness, self.tournament_size, rng);
            let child = operators::crossover(self.crossover, &pool[p1], &pool[p2], rng)?;
            next.push(Controller::new(child.mutated(&self.mutation, rng)));
        }
        Ok(Population::from_controllers(next))
    }
}

/// The phase an [`Evolution`] most recently entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum EvolutionPhase {
    Initialized,
    Evaluating,
    Recording,
    Recombining,
    Terminated,
}

/// Fatal failure of a training run.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolutionError {
    #[display("evaluation failed: {_0}")]
    Oracle(OracleFault),
    #[display("failed to write generation record: {_0}")]
    Log(io::Error),
    #[display("offspring does not fit the architecture: {_0}")]
    Architecture(ArchitectureError),
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// One record per epoch, in order.
    pub records: Vec<GenerationRecord>,
    /// Fittest controller evaluated during the whole run, with its fitness.
    pub best: Option<Controller>,
    /// The last evaluated generation, ranked.
    pub population: Population,
}

/// State of a training run.
#[derive(Debug, Clone)]
pub struct Evolution {
    config: EvolutionConfig,
    evaluator: FitnessEvaluator,
    evolver: Evolver,
    rng: Pcg32,
    population: Population,
    records: Vec<GenerationRecord>,
    best: Option<Controller>,
    epoch: usize,
    phase: EvolutionPhase,
}

impl Evolution {
    /// Validates `config` and creates the random initial population from `rng`.
    ///
    /// All randomness of the run, including trial seeds, is drawn from `rng`.
    pub fn new(config: EvolutionConfig, mut rng: Pcg32) -> Result<Self, ConfigError> {
        let evolver = Evolver::from_config(&config)?;
        let population = Population::random(config.architecture, config.population_size, &mut rng);
        Ok(Self {
            config,
            evaluator: FitnessEvaluator::new(config.trials),
            evolver,
            rng,
            population,
            records: Vec::with_capacity(config.epochs),
            best: None,
            epoch: 0,
            phase: EvolutionPhase::Initialized,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// Fittest controller evaluated so far.
    #[must_use]
    pub fn best(&self) -> Option<&Controller> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    /// Zero-based index of the current epoch.
    #[must_use]
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Scores and ranks the current population.
    ///
    /// # Panics
    ///
    /// Panics unless the run is `Initialized` or `Recombining`.
    pub fn evaluate<O>(&mut self, oracle: &O) -> Result<(), OracleFault>
    where
        O: Oracle + ?Sized,
    {
        assert!(
            self.phase.is_initialized() || self.phase.is_recombining(),
            "cannot evaluate while {}",
            self.phase
        );
        self.phase = EvolutionPhase::Evaluating;
        self.population
            .evaluate_fitness(&self.evaluator, oracle, &mut self.rng)?;

        let improved = self.population.best().filter(|top| {
            self.best
                .as_ref()
                .is_none_or(|best| top.fitness() > best.fitness())
        });
        if let Some(top) = improved {
            self.best = Some(top.clone());
        }
        Ok(())
    }

    /// Summarizes the evaluated population and appends the record to `log`.
    ///
    /// # Panics
    ///
    /// Panics unless the run is `Evaluating` with a finished evaluation.
    pub fn record<L>(&mut self, mut log: L) -> io::Result<&GenerationRecord>
    where
        L: GenerationLog,
    {
        assert!(
            self.phase.is_evaluating() && self.population.is_ranked(),
            "cannot record while {}",
            self.phase
        );
        self.phase = EvolutionPhase::Recording;
        let record = GenerationRecord::from_ranked(
            self.epoch,
            self.population.controllers(),
            self.config.elite_count,
        );
        log.write_record(&record)?;
        info!(
            epoch = self.epoch,
            best = record.best_fitness,
            average = record.average_fitness,
            elite = record.elite_fitness,
            "epoch finished"
        );
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Builds the next generation, or terminates after the last epoch.
    ///
    /// # Panics
    ///
    /// Panics unless the run is `Recording`.
    pub fn advance(&mut self) -> Result<(), ArchitectureError> {
        assert!(
            self.phase.is_recording(),
            "cannot advance while {}",
            self.phase
        );
        if self.epoch + 1 >= self.config.epochs {
            self.phase = EvolutionPhase::Terminated;
            return Ok(());
        }
        self.phase = EvolutionPhase::Recombining;
        self.population = self.evolver.evolve(&self.population, &mut self.rng)?;
        self.epoch += 1;
        Ok(())
    }

    /// Runs one full epoch. Does nothing once the run has terminated.
    pub fn step<O, L>(&mut self, oracle: &O, log: L) -> Result<(), EvolutionError>
    where
        O: Oracle + ?Sized,
        L: GenerationLog,
    {
        if self.phase.is_terminated() {
            return Ok(());
        }
        self.evaluate(oracle)?;
        self.record(log)?;
        self.advance()?;
        Ok(())
    }

    /// Runs every remaining epoch.
    pub fn run<O, L>(mut self, oracle: &O, mut log: L) -> Result<EvolutionOutcome, EvolutionError>
    where
        O: Oracle + ?Sized,
        L: GenerationLog,
    {
        while !self.phase.is_terminated() {
            self.step(oracle, &mut log)?;
        }
        Ok(self.into_outcome())
    }

    #[must_use]
    pub fn into_outcome(self) -> EvolutionOutcome {
        EvolutionOutcome {
            records: self.records,
            best: self.best,
            population: self.population,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use flapevo_engine::EpisodeSeed;
    use rand::SeedableRng as _;

    use super::*;
    use crate::oracle::FlightOracle;

    fn config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 6,
            epochs: 3,
            trials: 2,
            elite_count: 2,
            ..EvolutionConfig::default()
        }
    }

    fn ranked(fitness: &[f32], rng: &mut Pcg32) -> Population {
        let controllers = fitness
            .iter()
            .map(|&f| Controller::random(Architecture::DEFAULT, rng).with_fitness(f))
            .collect();
        Population::from_controllers(controllers)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EvolutionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let cases = [
            (
                EvolutionConfig {
                    population_size: 0,
                    ..config()
                },
                ConfigError::EmptyPopulation,
            ),
            (
                EvolutionConfig {
                    elite_count: 7,
                    ..config()
                },
                ConfigError::TooManyElites {
                    elite_count: 7,
                    population_size: 6,
                },
            ),
            (
                EvolutionConfig {
                    survival_rate: 0.0,
                    ..config()
                },
                ConfigError::InvalidSurvivalRate { survival_rate: 0.0 },
            ),
            (
                EvolutionConfig {
                    tournament_size: 0,
                    ..config()
                },
                ConfigError::EmptyTournament,
            ),
            (
                EvolutionConfig {
                    mutation_sigma: -1.0,
                    ..config()
                },
                ConfigError::InvalidMutationSigma { sigma: -1.0 },
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_elites_are_carried_over_unmodified() {
        let mut rng = Pcg32::seed_from_u64(0);
        let population = ranked(&[50.0, 40.0, 30.0, 20.0, 10.0, 0.0], &mut rng);
        let evolver = Evolver::from_config(&config()).unwrap();
        let next = evolver.evolve(&population, &mut rng).unwrap();

        assert_eq!(next.len(), population.len());
        for (elite, source) in next.controllers()[..2].iter().zip(population.controllers()) {
            assert_eq!(elite.weights(), source.weights());
            assert_eq!(elite.fitness(), 0.0);
        }
        for child in &next.controllers()[2..] {
            assert!(child.weights().iter().all(|w| w.abs() <= 3.0));
            assert_eq!(child.weights().len(), Architecture::DEFAULT.total_weights());
        }
    }

    #[test]
    fn test_offspring_come_from_survivor_pool() {
        let config = EvolutionConfig {
            population_size: 4,
            elite_count: 1,
            survival_rate: 0.5,
            mutation_sigma: 0.0,
            crossover: CrossoverStrategy::Uniform,
            ..EvolutionConfig::default()
        };
        let evolver = Evolver::from_config(&config).unwrap();

        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..20 {
            let population = ranked(&[40.0, 30.0, 20.0, 10.0], &mut rng);
            let [a, b, ..] = population.controllers() else {
                unreachable!()
            };
            let next = evolver.evolve(&population, &mut rng).unwrap();

            assert_eq!(next.controllers()[0].weights(), a.weights());
            for child in &next.controllers()[1..] {
                for (i, w) in child.weights().iter().enumerate() {
                    assert!(*w == a.weights()[i] || *w == b.weights()[i]);
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "population must be ranked")]
    fn test_evolve_requires_ranking() {
        let mut rng = Pcg32::seed_from_u64(2);
        let population = ranked(&[1.0, 2.0], &mut rng);
        let evolver = Evolver::from_config(&EvolutionConfig {
            population_size: 2,
            elite_count: 0,
            ..config()
        })
        .unwrap();
        let _ = evolver.evolve(&population, &mut rng);
    }

    #[test]
    fn test_run_records_every_epoch() {
        let evolution = Evolution::new(config(), Pcg32::seed_from_u64(3)).unwrap();
        let mut log: Vec<GenerationRecord> = Vec::new();
        let outcome = evolution.run(&FlightOracle::new(300), &mut log).unwrap();

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(log, outcome.records);
        for (epoch, record) in outcome.records.iter().enumerate() {
            assert_eq!(record.epoch, epoch);
            assert!(record.best_fitness >= record.average_fitness);
        }
        let best = outcome.best.unwrap();
        let top = outcome
            .records
            .iter()
            .map(|r| r.best_fitness)
            .fold(f32::MIN, f32::max);
        assert_eq!(best.fitness(), top);
        assert_eq!(outcome.population.len(), 6);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            Evolution::new(config(), Pcg32::seed_from_u64(4))
                .unwrap()
                .run(&FlightOracle::new(300), Vec::<GenerationRecord>::new())
                .unwrap()
                .records
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_phases() {
        let config = EvolutionConfig {
            epochs: 2,
            ..config()
        };
        let mut evolution = Evolution::new(config, Pcg32::seed_from_u64(5)).unwrap();
        let oracle = FlightOracle::new(100);
        let mut log: Vec<GenerationRecord> = Vec::new();
        assert!(evolution.phase().is_initialized());

        evolution.evaluate(&oracle).unwrap();
        assert!(evolution.phase().is_evaluating());
        evolution.record(&mut log).unwrap();
        assert!(evolution.phase().is_recording());
        evolution.advance().unwrap();
        assert!(evolution.phase().is_recombining());
        assert_eq!(evolution.epoch(), 1);

        evolution.step(&oracle, &mut log).unwrap();
        assert!(evolution.phase().is_terminated());
        evolution.step(&oracle, &mut log).unwrap();
        assert_eq!(log.len(), 2);
    }

    struct Failing {
        calls: AtomicUsize,
    }

    impl Oracle for Failing {
        fn run_episode(
            &self,
            _controller: &mut Controller,
            _seed: EpisodeSeed,
        ) -> Result<f32, OracleFault> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(OracleFault::new("simulation crashed"))
        }
    }

    #[test]
    fn test_oracle_fault_aborts_run() {
        let evolution = Evolution::new(config(), Pcg32::seed_from_u64(6)).unwrap();
        let oracle = Failing {
            calls: AtomicUsize::new(0),
        };
        let mut log: Vec<GenerationRecord> = Vec::new();
        let err = evolution.run(&oracle, &mut log).unwrap_err();
        assert!(matches!(err, EvolutionError::Oracle(_)));
        assert!(log.is_empty());
        // each controller stops at its first failing trial
        assert_eq!(oracle.calls.load(Ordering::Relaxed), 6);
    }

    struct BrokenLog;

    impl GenerationLog for BrokenLog {
        fn write_record(&mut self, _record: &GenerationRecord) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[test]
    fn test_log_failure_aborts_run() {
        let evolution = Evolution::new(config(), Pcg32::seed_from_u64(7)).unwrap();
        let err = evolution
            .run(&FlightOracle::new(50), BrokenLog)
            .unwrap_err();
        assert!(matches!(err, EvolutionError::Log(_)));
    }
}
