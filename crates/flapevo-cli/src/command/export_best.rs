use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use flapevo_controller::{Architecture, Controller};

use crate::{
    model::sample::{self, SAMPLE_FITNESS},
    schema::{
        ModelFileError,
        generation_log::{self, LogRow},
        weights_file::WeightExport,
    },
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportBestArg {
    /// Generation log (CSV) written by `train --log`
    #[arg(long)]
    log: PathBuf,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Export the sample model when the log is missing or malformed
    #[arg(long)]
    fallback_sample: bool,
}

pub(crate) fn run(arg: &ExportBestArg) -> anyhow::Result<()> {
    eprintln!("Reading training log: {}", arg.log.display());
    let (controller, fitness) = match generation_log::read_generation_log(&arg.log) {
        Ok(rows) => best_controller(&rows)?,
        Err(e @ (ModelFileError::NotFound { .. } | ModelFileError::Log { .. }))
            if arg.fallback_sample =>
        {
            eprintln!("{e}");
            eprintln!("Falling back to the sample weights");
            (sample::sample_controller(), SAMPLE_FITNESS)
        }
        Err(e @ ModelFileError::NotFound { .. }) => {
            return Err(e).context("Run `train --log` first or pass --fallback-sample");
        }
        Err(e) => return Err(e.into()),
    };

    let model = WeightExport::new(&controller, fitness, Utc::now());
    Output::save_json(&model, arg.output.clone())?;
    eprintln!("Best model exported");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Fitness: {:.2}", model.fitness);
    eprintln!("  Weights: {}", model.weights.len());
    Ok(())
}

fn best_controller(rows: &[LogRow]) -> anyhow::Result<(Controller, f32)> {
    let best = generation_log::best_row(rows).context("Training log has no generations")?;
    eprintln!("Found best controller with fitness {:.2}", best.top_fit);
    let controller = Controller::from_weights(Architecture::DEFAULT, best.top_gene.clone())
        .context("Best gene does not fit the default architecture")?;
    Ok((controller, best.top_fit))
}
