use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use flapevo_controller::Architecture;
use flapevo_engine::DEFAULT_FRAME_LIMIT;
use flapevo_training::{
    evolution::{Evolution, EvolutionConfig},
    operators::CrossoverStrategy,
    oracle::FlightOracle,
    population::Population,
    record::{GenerationLog, GenerationRecord},
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    schema::{generation_log::CsvGenerationLog, weights_file::WeightExport},
    util::{self, Output},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CrossoverArg {
    Uniform,
    Blend,
    SinglePoint,
}

impl From<CrossoverArg> for CrossoverStrategy {
    fn from(arg: CrossoverArg) -> Self {
        match arg {
            CrossoverArg::Uniform => Self::Uniform,
            CrossoverArg::Blend => Self::Blend,
            CrossoverArg::SinglePoint => Self::SinglePoint,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of generations
    #[arg(long, default_value_t = 50)]
    epochs: usize,
    /// Episodes played per controller and generation
    #[arg(long, default_value_t = 3)]
    trials: usize,
    #[arg(long, default_value_t = 50)]
    population_size: usize,
    /// Controllers copied unchanged into the next generation
    #[arg(long, default_value_t = 5)]
    elite_count: usize,
    /// Fraction of the ranked population eligible as parents
    #[arg(long, default_value_t = 0.35)]
    survival_rate: f32,
    #[arg(long, default_value_t = 3)]
    tournament_size: usize,
    /// Standard deviation of the mutation noise
    #[arg(long, default_value_t = 0.1)]
    mutation_sigma: f32,
    #[arg(long, value_enum, default_value_t = CrossoverArg::Blend)]
    crossover: CrossoverArg,
    #[arg(long, default_value_t = Architecture::DEFAULT_HIDDEN_SIZE)]
    hidden_size: usize,
    /// Frames after which a surviving episode ends
    #[arg(long, default_value_t = DEFAULT_FRAME_LIMIT)]
    frame_limit: usize,
    /// Random seed (drawn randomly when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Generation log (CSV) path
    #[arg(long)]
    log: Option<PathBuf>,
    /// Output file path for the best controller (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn to_config(&self) -> anyhow::Result<EvolutionConfig> {
        let architecture = Architecture::new(Architecture::DEFAULT.num_features(), self.hidden_size)
            .context("Invalid network shape")?;
        let config = EvolutionConfig {
            population_size: self.population_size,
            epochs: self.epochs,
            trials: self.trials,
            elite_count: self.elite_count,
            survival_rate: self.survival_rate,
            tournament_size: self.tournament_size,
            mutation_sigma: self.mutation_sigma,
            crossover: self.crossover.into(),
            architecture,
        };
        config.validate().context("Invalid training parameters")?;
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.to_config()?;
    let seed = util::seed_or_random(arg.seed);
    let oracle = FlightOracle::new(arg.frame_limit);

    let mut log: Box<dyn GenerationLog> = match &arg.log {
        Some(path) => Box::new(CsvGenerationLog::create(path).with_context(|| {
            format!("Failed to create generation log: {}", path.display())
        })?),
        None => Box::new(Vec::<GenerationRecord>::new()),
    };

    eprintln!("Training {} controllers:", config.architecture);
    eprintln!("  Seed: {seed}");
    eprintln!(
        "  Population: {} ({} elites, {} parents)",
        config.population_size,
        config.elite_count,
        config.survivor_count()
    );
    eprintln!(
        "  Epochs: {}, trials: {}, crossover: {}, mutation sigma: {}",
        config.epochs, config.trials, config.crossover, config.mutation_sigma
    );

    let mut evolution = Evolution::new(config, Pcg32::seed_from_u64(seed))?;
    while !evolution.phase().is_terminated() {
        let epoch = evolution.epoch();
        eprintln!("Generation #{epoch}:");
        evolution
            .evaluate(&oracle)
            .with_context(|| format!("Failed to evaluate generation #{epoch}"))?;
        report_population(evolution.population());

        let record = evolution
            .record(&mut *log)
            .with_context(|| format!("Failed to record generation #{epoch}"))?;
        eprintln!("  Record:");
        eprintln!("    Average: {:.3}", record.average_fitness);
        eprintln!("    Best:    {:.3}", record.best_fitness);
        eprintln!("    Elite:   {:.3}", record.elite_fitness);

        evolution.advance()?;
    }

    let outcome = evolution.into_outcome();
    eprintln!("Final generation:");
    let controllers = outcome.population.controllers();
    for (i, controller) in controllers.iter().take(5).enumerate() {
        eprintln!("  {i:2}: {:.3}", controller.fitness());
    }

    let best = outcome.best.context("No generation was evaluated")?;
    let model = WeightExport::new(&best, best.fitness(), Utc::now());
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    if let Some(path) = &arg.log {
        eprintln!("  Log: {}", path.display());
    }
    eprintln!("  Exported at: {}", model.metadata.export_timestamp);
    eprintln!("  Best fitness: {:.3}", model.fitness);
    eprintln!("  Weights: {}", model.weights.len());

    Ok(())
}

fn report_population(population: &Population) {
    let weight_stats = population.compute_weight_stats();
    #[expect(clippy::cast_precision_loss)]
    let weight_norm_std_dev_mean = weight_stats
        .iter()
        .map(|s| s.normalized_std_dev)
        .sum::<f32>()
        / weight_stats.len().max(1) as f32;

    let weight_min = weight_stats
        .iter()
        .map(|s| s.min)
        .fold(f32::INFINITY, f32::min);
    let weight_max = weight_stats
        .iter()
        .map(|s| s.max)
        .fold(f32::NEG_INFINITY, f32::max);

    eprintln!("  Weights Stats:");
    eprintln!("    Range:      {weight_min:.3} .. {weight_max:.3}");
    eprintln!("    NormStddev: {weight_norm_std_dev_mean:.3} (mean over genes)");

    if let Some(fitness_stats) = population.compute_fitness_stats() {
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:    {:.3}", fitness_stats.min);
        eprintln!("    Max:    {:.3}", fitness_stats.max);
        eprintln!("    Mean:   {:.3}", fitness_stats.mean);
        eprintln!("    Median: {:.3}", fitness_stats.median);
    }
}
