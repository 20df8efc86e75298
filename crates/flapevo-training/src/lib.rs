//! Evolutionary training of flappy controllers.
//!
//! This crate evolves the weight vectors of
//! [`Controller`](flapevo_controller::Controller)s with a generational genetic
//! algorithm. Fitness comes from an [`Oracle`](oracle::Oracle) that plays one
//! episode per call; the built-in [`FlightOracle`](oracle::FlightOracle) runs
//! the `flapevo-engine` simulation.
//!
//! # How Training Works
//!
//! 1. **Population** - Create `N` controllers with Xavier-initialized weights
//! 2. **Evaluation** - Each controller plays several episodes on its own thread
//! 3. **Fitness** - Trial scores are aggregated with outlier trimming
//! 4. **Recording** - Averages, best and elite summaries go to the generation log
//! 5. **Selection** - Elites are kept; parents come from tournaments over the
//!    top survivors
//! 6. **Reproduction** - Crossover and bounded Gaussian mutation fill the rest
//!
//! # Architecture
//!
//! ```text
//! Evolution (evolution)
//!     ↓ drives
//! Population::evaluate_fitness (population)
//!     ↓ per controller
//! FitnessEvaluator (fitness) → Oracle (oracle)
//!     ↓ ranked population
//! GenerationRecord (record) → GenerationLog
//!     ↓
//! Evolver: elites + tournaments (selection) + crossover (operators)
//!     ↓
//! next Population
//! ```
//!
//! # Example
//!
//! ```
//! use flapevo_training::{
//!     evolution::{Evolution, EvolutionConfig},
//!     oracle::FlightOracle,
//!     record::GenerationRecord,
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let config = EvolutionConfig {
//!     population_size: 8,
//!     epochs: 2,
//!     elite_count: 2,
//!     ..EvolutionConfig::default()
//! };
//! let evolution = Evolution::new(config, Pcg32::seed_from_u64(42)).unwrap();
//! let mut log: Vec<GenerationRecord> = Vec::new();
//! let outcome = evolution.run(&FlightOracle::new(500), &mut log).unwrap();
//!
//! assert_eq!(log.len(), 2);
//! assert!(outcome.best.is_some());
//! ```

pub mod evolution;
pub mod fitness;
pub mod operators;
pub mod oracle;
pub mod population;
pub mod record;
pub mod selection;
