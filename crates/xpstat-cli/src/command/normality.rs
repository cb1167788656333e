//! Shapiro-Wilk test of model residuals

use std::path::PathBuf;

use clap::Args;
use xpstat_analysis::{comparison, config::AnalysisConfig, frame::XP_LEVEL};

use crate::{command::compare, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct NormalityArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Numeric outcome variable
    #[arg(long)]
    pub outcome: String,

    /// Column whose groups define the fitted means
    #[arg(long, default_value = XP_LEVEL)]
    pub factor: String,
}

pub(crate) fn run(arg: &NormalityArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let study = util::load_study(&arg.dataset, config)?;
    let check = comparison::check_normality(&study.frame, &arg.outcome, &arg.factor, config)?;

    util::print_heading("Normality of Residuals");
    compare::print_normality(&check);
    Ok(())
}
