use std::path::PathBuf;

use anyhow::Context as _;
use flapevo_engine::DEFAULT_FRAME_LIMIT;
use flapevo_stats::descriptive::DescriptiveStats;
use flapevo_training::{
    fitness::{FitnessEvaluator, aggregate_scores},
    oracle::FlightOracle,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Exported model file (the sample model when omitted)
    #[arg(long)]
    model: Option<PathBuf>,
    /// Number of episodes to play
    #[arg(long, default_value_t = 3)]
    trials: usize,
    /// Frames after which a surviving episode ends
    #[arg(long, default_value_t = DEFAULT_FRAME_LIMIT)]
    frame_limit: usize,
    /// Random seed (drawn randomly when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.trials > 0, "At least one trial is required");
    let mut controller = util::load_controller(arg.model.as_deref())?;
    let seed = util::seed_or_random(arg.seed);
    let mut rng = Pcg32::seed_from_u64(seed);
    let oracle = FlightOracle::new(arg.frame_limit);

    eprintln!("Evaluating over {} episodes (seed {seed}):", arg.trials);
    let trials = FitnessEvaluator::new(arg.trials)
        .play_trials(&mut controller, &oracle, &mut rng)
        .context("Failed to play evaluation episodes")?;
    for (i, trial) in trials.iter().enumerate() {
        eprintln!(
            "  Test {}: {:.2} (episode {})",
            i + 1,
            trial.score,
            trial.seed
        );
    }

    let scores = trials.iter().map(|t| t.score).collect::<Vec<_>>();
    let stats = DescriptiveStats::from_slice(&scores);
    let stats = stats.context("No episode was played")?;
    eprintln!("Scores:");
    eprintln!("  Mean:       {:.2}", stats.mean);
    eprintln!("  Min:        {:.2}", stats.min);
    eprintln!("  Max:        {:.2}", stats.max);
    eprintln!("  Std dev:    {:.2}", stats.std_dev);
    let fitness = aggregate_scores(&scores);
    eprintln!("  Fitness:    {fitness:.2} (outliers trimmed)");
    Ok(())
}
