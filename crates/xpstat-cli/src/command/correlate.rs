//! Spearman correlation command
//!
//! Correlates each experience metric and the average session time with an
//! outcome, and optionally exports scatter data with the fitted trend line.

use std::path::{Path, PathBuf};

use clap::Args;
use xpstat_analysis::{
    config::AnalysisConfig,
    correlation::{self, CorrelationReport},
};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct CorrelateArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Numeric outcome variable to correlate against
    #[arg(long)]
    pub outcome: String,

    /// Output directory for scatter plot CSV files
    #[arg(long)]
    pub scatter_dir: Option<PathBuf>,
}

pub(crate) fn run(arg: &CorrelateArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let study = util::load_study(&arg.dataset, config)?;

    let mut reports =
        correlation::experience_correlations(&study.data, &study.frame, &arg.outcome)?;
    reports.push(correlation::session_time_correlation(
        &study.frame,
        &arg.outcome,
    )?);

    util::print_heading(&format!("Spearman Correlations with {}", arg.outcome));
    print_table(&reports);
    println!();

    if let Some(dir) = &arg.scatter_dir {
        for report in &reports {
            let path = save_scatter(dir, report)?;
            println!("Scatter data saved to: {}", path.display());
        }
    }

    Ok(())
}

fn print_table(reports: &[CorrelationReport]) {
    println!(
        "  {:<20} {:>4} {:>10} {:>12}  {}",
        "Variable", "N", "rho", "p-value", "Trend"
    );
    println!("  {}", "-".repeat(72));
    for report in reports {
        let (rho, p) = match report.estimate.defined() {
            Some(c) => (format!("{:.4}", c.rho), util::format_p(c.p_value)),
            None => (
                util::format_estimate(&report.estimate, |_| String::new()),
                "-".to_string(),
            ),
        };
        let trend = report.trend.map_or_else(
            || "-".to_string(),
            |fit| format!("y = {:.3} + {:.3}x", fit.intercept, fit.slope),
        );
        println!(
            "  {:<20} {:>4} {:>10} {:>12}  {}",
            report.x, report.n, rho, p, trend
        );
    }
}

/// Writes `<x>_vs_<y>.csv` with one row per plotted participant.
fn save_scatter(dir: &Path, report: &CorrelationReport) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{}_vs_{}.csv", report.x, report.y));
    let output = Output::create(Some(path.clone()))?;
    let rows = report.points.iter().map(|point| {
        let trend = report
            .trend
            .map_or_else(String::new, |fit| fit.predict(point.x).to_string());
        format!(
            "{},{},{},{},{}",
            point.participant_id, point.cohort, point.x, point.y, trend
        )
    });
    output.csv("participant_id,cohort,x,y,trend", rows)?;
    Ok(path)
}
