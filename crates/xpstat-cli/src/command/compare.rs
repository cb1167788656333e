//! Cohort comparison command
//!
//! Checks the normality and equal-variance assumptions, then runs a one-way
//! ANOVA of the outcome across the experience cohorts.

use std::path::PathBuf;

use clap::Args;
use xpstat_analysis::{
    comparison::{self, BoxPlotSummary, Caveat, GroupComparison, HomogeneityCheck, NormalityCheck},
    config::AnalysisConfig,
};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Numeric outcome variable to compare
    #[arg(long)]
    pub outcome: String,

    /// Write box plot summaries to this CSV file
    #[arg(long)]
    pub box_plot_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CompareArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let study = util::load_study(&arg.dataset, config)?;
    let result = comparison::compare_groups(&study.frame, &arg.outcome, config)?;

    util::print_heading(&format!("Group Comparison: {}", result.variable));
    println!("alpha = {}", config.alpha);
    println!();

    print_normality(&result.normality);
    print_homogeneity(&result.homogeneity);
    print_anova(&result);
    println!();

    print_box_plots(&result.box_plots);
    println!();

    print_caveats(&result.caveats);

    if let Some(path) = &arg.box_plot_output {
        save_box_plots(path.clone(), &result.box_plots)?;
        println!("\nBox plot summaries saved to: {}", path.display());
    }

    Ok(())
}

pub(super) fn print_normality(check: &NormalityCheck) {
    let result = util::format_estimate(&check.estimate, |sw| {
        format!("W = {:.4}, p = {}", sw.w, util::format_p(sw.p_value))
    });
    println!(
        "Shapiro-Wilk ({} ~ {}, n = {}): {}{}",
        check.variable,
        check.factor,
        check.n,
        result,
        if check.violated { "  [violated]" } else { "" }
    );
}

fn print_homogeneity(check: &HomogeneityCheck) {
    let result = util::format_estimate(&check.estimate, |f| {
        format!("F = {:.4}, p = {}", f.statistic, util::format_p(f.p_value))
    });
    println!(
        "Levene (df = {}, {}): {}{}",
        check.df_between,
        check.df_within,
        result,
        if check.violated { "  [violated]" } else { "" }
    );
}

fn print_anova(result: &GroupComparison) {
    let anova = &result.anova;
    let test = util::format_estimate(&anova.estimate, |f| {
        format!("F = {:.4}, p = {}", f.statistic, util::format_p(f.p_value))
    });
    println!(
        "One-way ANOVA (df = {}, {}): {}",
        anova.df_between, anova.df_within, test
    );
    println!(
        "  SS between = {:.4}, SS within = {:.4}",
        anova.ss_between, anova.ss_within
    );
}

fn print_box_plots(box_plots: &[BoxPlotSummary]) {
    println!(
        "  {:<15} {:>4} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Cohort", "N", "Min", "Q1", "Median", "Q3", "Max", "Mean"
    );
    println!("  {}", "-".repeat(80));
    for b in box_plots {
        println!(
            "  {:<15} {:>4} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
            b.cohort.to_string(),
            b.n,
            b.min,
            b.q1,
            b.median,
            b.q3,
            b.max,
            b.mean
        );
    }
}

fn print_caveats(caveats: &[Caveat]) {
    if caveats.is_empty() {
        println!("Assumptions hold at the chosen alpha.");
        return;
    }
    println!("Caveats:");
    for caveat in caveats {
        match caveat {
            Caveat::NormalityViolated { variable } => {
                println!("  - residuals of {variable} are not normally distributed");
            }
            Caveat::HeterogeneousVariance { variable } => {
                println!("  - variances of {variable} differ between cohorts");
            }
        }
    }
}

fn save_box_plots(path: PathBuf, box_plots: &[BoxPlotSummary]) -> anyhow::Result<()> {
    let output = Output::create(Some(path))?;
    let rows = box_plots.iter().map(|b| {
        format!(
            "{},{},{},{},{},{},{},{}",
            b.cohort, b.n, b.min, b.q1, b.median, b.q3, b.max, b.mean
        )
    });
    output.csv("cohort,n,min,q1,median,q3,max,mean", rows)
}
