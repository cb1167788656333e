use std::{io, path::PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xpstat_analysis::config::AnalysisConfig;

use self::{
    chi_square::ChiSquareArg, compare::CompareArg, correlate::CorrelateArg, describe::DescribeArg,
    generate_dataset::GenerateDatasetArg, normality::NormalityArg, report::ReportArg,
};
use crate::util;

mod chi_square;
mod compare;
mod correlate;
mod describe;
mod generate_dataset;
mod normality;
mod report;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(flatten)]
    global: GlobalArg,

    /// What analysis to run
    #[command(subcommand)]
    mode: Mode,
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Args)]
pub(crate) struct GlobalArg {
    /// JSON file with analysis parameters
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Highest participant id that answered the professional experience question
    #[arg(long, global = true)]
    pub professional_limit: Option<u32>,

    /// Significance level for the assumption checks
    #[arg(long, global = true)]
    pub alpha: Option<f64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArg {
    /// Reads the config file (if any) and applies command-line overrides.
    fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("config", path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(limit) = self.professional_limit {
            config.professional_limit = limit;
        }
        if let Some(alpha) = self.alpha {
            anyhow::ensure!(
                alpha > 0.0 && alpha < 1.0,
                "--alpha must be between 0 and 1, got {alpha}"
            );
            config.alpha = alpha;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Show cohort sizes, stimulus breakdown and descriptive statistics
    Describe(#[clap(flatten)] DescribeArg),
    /// Correlate experience and session time with an outcome
    Correlate(#[clap(flatten)] CorrelateArg),
    /// Compare an outcome across cohorts (normality, Levene, ANOVA)
    Compare(#[clap(flatten)] CompareArg),
    /// Shapiro-Wilk test on the residuals of outcome ~ factor
    Normality(#[clap(flatten)] NormalityArg),
    /// Chi-square test of a categorical outcome against a grouping
    ChiSquare(#[clap(flatten)] ChiSquareArg),
    /// Run every analysis and write a JSON report
    Report(#[clap(flatten)] ReportArg),
    /// Generate a synthetic dataset
    GenerateDataset(#[clap(flatten)] GenerateDatasetArg),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.global.verbose);
    let config = args.global.analysis_config()?;

    match &args.mode {
        Mode::Describe(arg) => describe::run(arg, &config)?,
        Mode::Correlate(arg) => correlate::run(arg, &config)?,
        Mode::Compare(arg) => compare::run(arg, &config)?,
        Mode::Normality(arg) => normality::run(arg, &config)?,
        Mode::ChiSquare(arg) => chi_square::run(arg, &config)?,
        Mode::Report(arg) => report::run(arg, &config)?,
        Mode::GenerateDataset(arg) => generate_dataset::run(arg, &config)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_cli_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_global_overrides() {
        let args = CommandArgs::try_parse_from([
            "xpstat",
            "compare",
            "data.json",
            "--outcome",
            "score",
            "--alpha",
            "0.01",
            "--professional-limit",
            "12",
        ])
        .unwrap();
        let config = args.global.analysis_config().unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.professional_limit, 12);
        assert_eq!(config.min_expected_frequency, 5.0);
    }

    #[test]
    fn test_alpha_out_of_range() {
        let args =
            CommandArgs::try_parse_from(["xpstat", "generate-dataset", "--alpha", "1.5"]).unwrap();
        assert!(args.global.analysis_config().is_err());
    }
}
