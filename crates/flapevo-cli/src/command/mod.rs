use clap::{Parser, Subcommand};

use self::{
    evaluate::EvaluateArg, export_best::ExportBestArg, export_sample::ExportSampleArg,
    probe::ProbeArg, train::TrainArg,
};

mod evaluate;
mod export_best;
mod export_sample;
mod probe;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a controller with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Export the best controller recorded in a training log
    ExportBest(#[clap(flatten)] ExportBestArg),
    /// Play fresh episodes with an exported controller
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Show features, network output and decision for reference states
    Probe(#[clap(flatten)] ProbeArg),
    /// Export the hand-tuned sample controller
    ExportSample(#[clap(flatten)] ExportSampleArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::ExportBest(arg) => export_best::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Probe(arg) => probe::run(&arg)?,
        Mode::ExportSample(arg) => export_sample::run(&arg)?,
    }
    Ok(())
}
