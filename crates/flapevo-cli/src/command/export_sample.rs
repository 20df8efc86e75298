use std::path::PathBuf;

use chrono::Utc;

use crate::{
    model::sample::{self, SAMPLE_FITNESS},
    schema::weights_file::WeightExport,
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportSampleArg {
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ExportSampleArg) -> anyhow::Result<()> {
    let model = WeightExport::new(&sample::sample_controller(), SAMPLE_FITNESS, Utc::now());
    Output::save_json(&model, arg.output.clone())?;
    eprintln!("Sample model exported");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Fitness: {:.2}", model.fitness);
    eprintln!("  Weights: {}", model.weights.len());
    Ok(())
}
