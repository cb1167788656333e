use std::path::PathBuf;

use xpstat_analysis::{
    config::AnalysisConfig,
    synth::{self, SynthConfig},
};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateDatasetArg {
    /// Seed for the random generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// JSON file overriding the cohort sizes and outcome names
    #[arg(long)]
    synth_config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateDatasetArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let synth_config = match &arg.synth_config {
        Some(path) => util::read_json_file("synth config", path)?,
        None => SynthConfig {
            professional_limit: config.professional_limit,
            ..SynthConfig::default()
        },
    };
    let dataset = synth::generate(&synth_config, arg.seed);
    tracing::info!(
        "Generated {} participants and {} sessions (seed {})",
        dataset.participants.len(),
        dataset.sessions.len(),
        arg.seed
    );
    Output::save_json(&dataset, arg.output.clone())
}
