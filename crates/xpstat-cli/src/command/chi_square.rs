//! Chi-square test of independence
//!
//! Cross-tabulates a categorical outcome against either the three experience
//! cohorts or the binary expert/novice grouping, then prints the test and the
//! residual tables used for post-hoc reading of the cells.

use std::path::PathBuf;

use clap::Args;
use xpstat_analysis::{
    config::AnalysisConfig,
    contingency::{self, ContingencyReport},
    frame::{EXPERTISE, XP_LEVEL},
};
use xpstat_stats::contingency::ContingencyTable;

use crate::util;

/// Column grouping for the contingency table
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Grouping {
    /// Expert, Python Novice, True Novice
    #[default]
    Cohort,
    /// Expert vs. Novice
    Expertise,
}

impl Grouping {
    fn column(self) -> &'static str {
        match self {
            Self::Cohort => XP_LEVEL,
            Self::Expertise => EXPERTISE,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct ChiSquareArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Categorical outcome variable (rows of the table)
    #[arg(long)]
    pub outcome: String,

    /// Grouping for the columns of the table (cohort or expertise)
    #[arg(long, default_value = "cohort")]
    pub group: Grouping,
}

pub(crate) fn run(arg: &ChiSquareArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let study = util::load_study(&arg.dataset, config)?;
    let report =
        contingency::contingency(&study.frame, &arg.outcome, arg.group.column(), config)?;

    util::print_heading(&format!(
        "Chi-Square: {} by {}",
        report.outcome, report.grouping
    ));
    print_report(&report, config);
    Ok(())
}

fn print_report(report: &ContingencyReport, config: &AnalysisConfig) {
    let table = &report.table;

    println!("Observed:");
    print_matrix(table, table.counts(), |v| format!("{v:.0}"));
    println!();

    println!("Expected:");
    print_matrix(table, &report.test.expected, |v| format!("{v:.2}"));
    println!();

    let test = util::format_estimate(&report.test.estimate, |c| {
        format!(
            "X-squared = {:.4}, p = {}",
            c.statistic,
            util::format_p(c.p_value)
        )
    });
    println!("{test} (df = {})", report.test.dof);
    if report.low_expected_cells > 0 {
        println!(
            "Warning: {} cell(s) have expected frequency below {}; the approximation may be poor",
            report.low_expected_cells, config.min_expected_frequency
        );
    }
    println!();

    let Some(residuals) = report.residuals.defined() else {
        println!(
            "Residuals: {}",
            util::format_estimate(&report.residuals, |_| String::new())
        );
        return;
    };
    if residuals.zeros_shifted {
        println!("(zero cells replaced by 0.5 for residuals)");
    }
    println!("Pearson residuals:");
    print_matrix(table, &residuals.pearson, |v| format!("{v:.3}"));
    println!();
    println!("Standardized residuals:");
    print_matrix(table, &residuals.standardized, |v| format!("{v:.3}"));
    println!();
    println!("Contribution to X-squared:");
    print_matrix(table, &residuals.contributions, |v| format!("{v:.2}"));
}

fn print_matrix<F>(table: &ContingencyTable, values: &[Vec<f64>], f: F)
where
    F: Fn(f64) -> String,
{
    print!("  {:<16}", "");
    for col in table.col_labels() {
        print!(" {col:>14}");
    }
    println!();
    for (label, row) in table.row_labels().iter().zip(values) {
        print!("  {label:<16}");
        for &v in row {
            print!(" {:>14}", f(v));
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_from_str() {
        assert_eq!("cohort".parse::<Grouping>().unwrap(), Grouping::Cohort);
        assert_eq!("expertise".parse::<Grouping>().unwrap(), Grouping::Expertise);
        assert!("gender".parse::<Grouping>().is_err());
        assert_eq!(Grouping::default().column(), XP_LEVEL);
    }
}
