//! Outcome-by-group contingency analysis
//!
//! Cross-tabulates a categorical outcome against a grouping column and runs
//! the Pearson chi-square test of independence, with residuals that show
//! which cells drive a significant result.

use serde::Serialize;
use xpstat_stats::{
    Estimate,
    contingency::{self, ChiSquare, ContingencyTable, Residuals},
};

use crate::{
    config::AnalysisConfig,
    error::AnalysisError,
    frame::{Column, Frame},
};

/// Chi-square analysis of `outcome` (rows) by `grouping` (columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyReport {
    pub outcome: String,
    pub grouping: String,
    pub table: ContingencyTable,
    pub test: ChiSquare,
    pub residuals: Estimate<Residuals>,
    /// Cells with expected frequency below the configured minimum.
    pub low_expected_cells: usize,
}

/// Cross-tabulates `outcome` against `grouping` and tests independence.
///
/// `grouping` must be categorical, typically `xp_level` or `expertise`.
/// A numeric `outcome` is treated as discrete: each distinct value is a
/// category.
///
/// # Errors
///
/// Returns an error if either column is missing, `grouping` is numeric, or
/// the frame has no rows.
pub fn contingency(
    frame: &Frame,
    outcome: &str,
    grouping: &str,
    config: &AnalysisConfig,
) -> Result<ContingencyReport, AnalysisError> {
    let groups = frame.categorical(grouping)?;
    let outcomes = match frame.column(outcome)? {
        Column::Categorical(labels) => labels.clone(),
        Column::Numeric(values) => values.iter().map(ToString::to_string).collect(),
    };

    let table =
        ContingencyTable::from_labels(&outcomes, groups).map_err(AnalysisError::stats(outcome))?;
    let test = contingency::chi_square(&table).map_err(AnalysisError::stats(outcome))?;
    let residuals = contingency::residuals(&table);

    let low_expected_cells = test.cells_below(config.min_expected_frequency);
    if low_expected_cells > 0 {
        tracing::warn!(
            outcome,
            grouping,
            cells = low_expected_cells,
            threshold = config.min_expected_frequency,
            "expected frequencies below threshold, chi-square approximation may be unreliable"
        );
    }
    if let Estimate::Defined(t) = &test.estimate {
        tracing::debug!(
            outcome,
            grouping,
            statistic = t.statistic,
            p_value = t.p_value,
            dof = test.dof,
            "chi-square"
        );
    }

    Ok(ContingencyReport {
        outcome: outcome.to_owned(),
        grouping: grouping.to_owned(),
        table,
        test,
        residuals,
        low_expected_cells,
    })
}

#[cfg(test)]
mod tests {
    use xpstat_stats::UndefinedReason;

    use super::*;
    use crate::{
        cohort::ExperienceLevel,
        frame::{EXPERTISE, XP_LEVEL},
    };

    fn frame(levels: &[ExperienceLevel], found: &[&str]) -> Frame {
        let mut frame = Frame::from_levels(levels.to_vec());
        frame
            .insert(
                "found",
                Column::Categorical(found.iter().map(|&s| s.to_owned()).collect()),
            )
            .unwrap();
        frame
    }

    #[test]
    fn test_crosstab_by_level() {
        use ExperienceLevel::{Expert, PythonNovice, TrueNovice};
        let levels = [Expert, Expert, PythonNovice, TrueNovice, TrueNovice, Expert];
        let found = ["yes", "yes", "no", "no", "yes", "no"];
        let report = contingency(
            &frame(&levels, &found),
            "found",
            XP_LEVEL,
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert_eq!(report.table.row_labels(), ["no", "yes"]);
        assert_eq!(
            report.table.col_labels(),
            ["Expert", "Python Novice", "True Novice"]
        );
        assert_eq!(report.table.counts(), [vec![1.0, 1.0, 1.0], vec![2.0, 0.0, 1.0]]);
        assert_eq!(report.test.dof, 2);
        // every expected count is at most 1.5
        assert_eq!(report.low_expected_cells, 6);
        assert!(report.residuals.defined().unwrap().zeros_shifted);
    }

    #[test]
    fn test_binary_grouping() {
        use ExperienceLevel::{Expert, PythonNovice, TrueNovice};
        let levels = [Expert, PythonNovice, TrueNovice, Expert];
        let report = contingency(
            &frame(&levels, &["yes", "no", "no", "yes"]),
            "found",
            EXPERTISE,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(report.table.col_labels(), ["Expert", "Novice"]);
        assert_eq!(report.table.counts(), [vec![0.0, 2.0], vec![2.0, 0.0]]);
        assert_eq!(report.test.dof, 1);
    }

    #[test]
    fn test_single_outcome_category_is_degenerate() {
        let levels = [ExperienceLevel::Expert, ExperienceLevel::TrueNovice];
        let report = contingency(
            &frame(&levels, &["yes", "yes"]),
            "found",
            XP_LEVEL,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(
            report.test.estimate.reason(),
            Some(UndefinedReason::DegenerateTable)
        );
        assert_eq!(
            report.residuals.reason(),
            Some(UndefinedReason::DegenerateTable)
        );
    }

    #[test]
    fn test_numeric_grouping_is_rejected() {
        let levels = [ExperienceLevel::Expert, ExperienceLevel::TrueNovice];
        let result = contingency(
            &frame(&levels, &["yes", "no"]),
            "found",
            "participant_id",
            &AnalysisConfig::default(),
        );
        assert!(matches!(
            result,
            Err(AnalysisError::WrongColumnKind { .. })
        ));
    }
}
