//! Dataset overview command
//!
//! Prints cohort sizes, the per-stimulus session breakdown, and descriptive
//! statistics of every numeric variable by cohort.

use std::path::PathBuf;

use clap::Args;
use xpstat_analysis::{
    config::AnalysisConfig,
    describe::{self, VariableDescription},
    study::StudyData,
};
use xpstat_stats::descriptive::DescriptiveStats;

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct DescribeArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,
}

pub(crate) fn run(arg: &DescribeArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let study = util::load_study(&arg.dataset, config)?;

    util::print_heading("Cohorts");
    print_cohorts(&study.data);
    println!();

    util::print_heading("Session Time by Stimulus");
    print_stimulus_breakdown(&study.data);
    println!();

    util::print_heading("Variables by Cohort");
    let names = study.frame.numeric_names().collect::<Vec<_>>();
    for name in names {
        let description = describe::describe_by_cohort(&study.frame, name)?;
        print_description(&description);
        println!();
    }

    Ok(())
}

fn print_cohorts(data: &StudyData) {
    let partition = data.partition();
    println!("  {:<15} {:>6}", "Cohort", "Count");
    println!("  {}", "-".repeat(22));
    for (level, ids) in partition.iter() {
        println!("  {:<15} {:>6}", level.to_string(), ids.len());
    }
    println!("  {:<15} {:>6}", "Total", partition.len());
    println!(
        "  (professional experience recorded for ids 1-{})",
        data.professional_limit()
    );
}

fn print_stimulus_breakdown(data: &StudyData) {
    println!(
        "  {:>4} {:<20} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "Id", "Error Type", "Sessions", "Mean", "Std", "Min", "Max"
    );
    println!("  {}", "-".repeat(78));
    for summary in data.stimulus_breakdown() {
        println!(
            "  {:>4} {:<20} {:>8} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
            summary.stimuli_id.to_string(),
            summary.error_type,
            summary.sessions,
            summary.mean,
            summary.std_dev,
            summary.min,
            summary.max,
        );
    }
}

fn print_description(description: &VariableDescription) {
    println!("{}", description.variable);
    println!(
        "  {:<15} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Cohort", "N", "Mean", "Median", "Std", "Min", "Max"
    );
    println!("  {}", "-".repeat(77));
    for cohort in &description.cohorts {
        print_stats_row(&cohort.cohort.to_string(), cohort.stats.as_ref());
    }
    print_stats_row("All", description.overall.as_ref());
}

fn print_stats_row(label: &str, stats: Option<&DescriptiveStats>) {
    let Some(stats) = stats else {
        println!("  {label:<15} {:>6}", 0);
        return;
    };
    let std_dev = stats
        .std_dev
        .map_or_else(|| "N/A".to_string(), |s| format!("{s:.2}"));
    println!(
        "  {:<15} {:>6} {:>10.2} {:>10.2} {:>10} {:>10.2} {:>10.2}",
        label, stats.count, stats.mean, stats.median, std_dev, stats.min, stats.max,
    );
}
