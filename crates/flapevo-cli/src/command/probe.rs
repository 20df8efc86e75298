use std::path::PathBuf;

use flapevo_engine::Observation;

use crate::util;

/// `(gap_distance, horizontal_distance, bird_height)` samples covering the
/// typical situations: centered far from a pipe, below the gap close to it,
/// above the gap, and centered right in front of it.
const REFERENCE_STATES: [(f32, f32, f32); 4] = [
    (0.0, 200.0, 256.0),
    (-50.0, 100.0, 200.0),
    (50.0, 150.0, 300.0),
    (0.0, 50.0, 256.0),
];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ProbeArg {
    /// Exported model file (the sample model when omitted)
    #[arg(long)]
    model: Option<PathBuf>,
}

pub(crate) fn run(arg: &ProbeArg) -> anyhow::Result<()> {
    let mut controller = util::load_controller(arg.model.as_deref())?;

    eprintln!("Format: [gap_distance, horizontal_distance, bird_height]");
    for (i, (gap, horizontal, height)) in REFERENCE_STATES.into_iter().enumerate() {
        // every state is probed as the first frame of an episode
        controller.reset_trial_state();
        let inference = controller.infer(&Observation::new(gap, horizontal, height));
        eprintln!("Test {}: [{gap}, {horizontal}, {height}]", i + 1);
        eprintln!("  Features: {:.4?}", inference.features.as_array());
        eprintln!("  Output:   {:.6}", inference.output);
        eprintln!(
            "  Decision: {}",
            if inference.decision { "JUMP" } else { "FALL" }
        );
    }
    Ok(())
}
