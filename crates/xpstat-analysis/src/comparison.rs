//! Cohort comparison with assumption checks
//!
//! [`compare_groups`] runs one-way ANOVA of an outcome across the three
//! experience cohorts, together with the two checks its assumptions call for:
//!
//! 1. **Normality**: Shapiro-Wilk on the residuals of `outcome ~ C(xp_level)`
//! 2. **Homogeneity of variance**: Levene's test (median centred)
//! 3. **ANOVA**: one-way F test
//!
//! All three always run. A failed check does not stop the analysis; it adds a
//! [`Caveat`] to the result so the reader can judge the F test accordingly.

use std::collections::BTreeMap;

use serde::Serialize;
use xpstat_stats::{
    Estimate,
    anova::{self, FTest, OneWayAnova},
    descriptive::DescriptiveStats,
    homogeneity,
    normality::{self, ShapiroWilk},
    percentiles::Quartiles,
};

use crate::{
    cohort::ExperienceLevel,
    config::AnalysisConfig,
    error::AnalysisError,
    frame::{Column, Frame, XP_LEVEL},
};

/// An assumption of the F test that the data appear to violate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Caveat {
    #[display("residuals of '{variable}' are not normally distributed")]
    NormalityViolated { variable: String },
    #[display("'{variable}' has unequal variances across cohorts")]
    HeterogeneousVariance { variable: String },
}

/// Shapiro-Wilk test on model residuals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityCheck {
    pub variable: String,
    pub factor: String,
    pub n: usize,
    pub estimate: Estimate<ShapiroWilk>,
    /// `p < alpha`
    pub violated: bool,
}

/// Levene's test across cohorts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomogeneityCheck {
    pub variable: String,
    pub df_between: usize,
    pub df_within: usize,
    pub estimate: Estimate<FTest>,
    /// `p < alpha`
    pub violated: bool,
}

/// Five-number summary plus mean of one cohort, for box plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSummary {
    pub cohort: ExperienceLevel,
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl BoxPlotSummary {
    fn new(cohort: ExperienceLevel, values: &[f64]) -> Option<Self> {
        let stats = DescriptiveStats::new(values.iter().copied())?;
        let quartiles = Quartiles::new(values)?;
        Some(Self {
            cohort,
            n: stats.count,
            min: stats.min,
            q1: quartiles.q1,
            median: quartiles.median,
            q3: quartiles.q3,
            max: stats.max,
            mean: stats.mean,
        })
    }
}

/// Complete comparison of one outcome across cohorts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub variable: String,
    pub normality: NormalityCheck,
    pub homogeneity: HomogeneityCheck,
    /// One entry per cohort in [`ExperienceLevel::ALL`] order.
    pub box_plots: Vec<BoxPlotSummary>,
    pub anova: OneWayAnova,
    pub caveats: Vec<Caveat>,
}

/// Compares `outcome` across the experience cohorts.
///
/// # Errors
///
/// - [`AnalysisError::InsufficientGroupData`] if a cohort has no
///   observations of `outcome`
/// - [`AnalysisError::UnknownVariable`] / [`AnalysisError::WrongColumnKind`]
///   if `outcome` is not a numeric column
pub fn compare_groups(
    frame: &Frame,
    outcome: &str,
    config: &AnalysisConfig,
) -> Result<GroupComparison, AnalysisError> {
    let samples = cohort_samples(frame, outcome)?;
    let sample_refs = samples.iter().map(|(_, s)| s.as_slice()).collect::<Vec<_>>();

    let normality = check_normality(frame, outcome, XP_LEVEL, config)?;

    let levene = homogeneity::levene(&sample_refs).map_err(AnalysisError::stats(outcome))?;
    let homogeneity = HomogeneityCheck {
        variable: outcome.to_owned(),
        df_between: levene.df_between,
        df_within: levene.df_within,
        violated: levene
            .estimate
            .defined()
            .is_some_and(|t| t.p_value < config.alpha),
        estimate: levene.estimate,
    };
    if homogeneity.violated {
        tracing::warn!(variable = outcome, "homogeneity of variance violated (Levene)");
    }

    let box_plots = samples
        .iter()
        .filter_map(|(cohort, values)| BoxPlotSummary::new(*cohort, values))
        .collect();

    let anova = anova::one_way(&sample_refs).map_err(AnalysisError::stats(outcome))?;
    match &anova.estimate {
        Estimate::Defined(f) => {
            tracing::debug!(
                variable = outcome,
                statistic = f.statistic,
                p_value = f.p_value,
                "one-way anova"
            );
        }
        Estimate::Undefined { reason } => {
            tracing::debug!(variable = outcome, %reason, "one-way anova undefined");
        }
    }

    let mut caveats = vec![];
    if normality.violated {
        caveats.push(Caveat::NormalityViolated {
            variable: outcome.to_owned(),
        });
    }
    if homogeneity.violated {
        caveats.push(Caveat::HeterogeneousVariance {
            variable: outcome.to_owned(),
        });
    }

    Ok(GroupComparison {
        variable: outcome.to_owned(),
        normality,
        homogeneity,
        box_plots,
        anova,
        caveats,
    })
}

/// Runs Shapiro-Wilk on the residuals of `outcome ~ C(factor)`.
///
/// `factor` may be categorical or numeric; each distinct value forms a group
/// and the residual of an observation is its distance from its group mean.
/// Rows where either variable is `NaN` are skipped.
///
/// # Errors
///
/// Returns an error if `outcome` is not numeric or `factor` does not exist.
pub fn check_normality(
    frame: &Frame,
    outcome: &str,
    factor: &str,
    config: &AnalysisConfig,
) -> Result<NormalityCheck, AnalysisError> {
    let values = frame.numeric(outcome)?;
    let groups = factor_groups(frame.column(factor)?);

    let mut sums = BTreeMap::<usize, (f64, usize)>::new();
    let rows = (0..frame.len())
        .filter_map(|row| Some((groups[row]?, values[row])))
        .filter(|(_, v)| !v.is_nan())
        .collect::<Vec<_>>();
    for &(group, value) in &rows {
        let (sum, count) = sums.entry(group).or_insert((0.0, 0));
        *sum += value;
        *count += 1;
    }
    #[expect(clippy::cast_precision_loss)]
    let residuals = rows
        .iter()
        .map(|&(group, value)| {
            let (sum, count) = sums[&group];
            value - sum / count as f64
        })
        .collect::<Vec<_>>();

    let estimate = normality::shapiro_wilk(&residuals).map_err(AnalysisError::stats(outcome))?;
    let violated = estimate
        .defined()
        .is_some_and(|t| t.p_value < config.alpha);
    if violated {
        tracing::warn!(
            variable = outcome,
            factor,
            "normality of residuals violated (Shapiro-Wilk)"
        );
    }

    Ok(NormalityCheck {
        variable: outcome.to_owned(),
        factor: factor.to_owned(),
        n: residuals.len(),
        estimate,
        violated,
    })
}

/// Splits a numeric column by cohort, in [`ExperienceLevel::ALL`] order.
fn cohort_samples(
    frame: &Frame,
    outcome: &str,
) -> Result<Vec<(ExperienceLevel, Vec<f64>)>, AnalysisError> {
    let values = frame.numeric(outcome)?;
    ExperienceLevel::ALL
        .into_iter()
        .map(|cohort| {
            let sample = values
                .iter()
                .zip(frame.levels())
                .filter(|&(v, level)| *level == cohort && !v.is_nan())
                .map(|(v, _)| *v)
                .collect::<Vec<_>>();
            if sample.is_empty() {
                return Err(AnalysisError::InsufficientGroupData {
                    variable: outcome.to_owned(),
                    cohort: cohort.to_string(),
                });
            }
            Ok((cohort, sample))
        })
        .collect()
}

/// Maps each row to a group index by distinct column value, `None` for `NaN`.
fn factor_groups(column: &Column) -> Vec<Option<usize>> {
    match column {
        Column::Categorical(labels) => {
            let mut index = BTreeMap::new();
            labels
                .iter()
                .map(|label| {
                    let next = index.len();
                    Some(*index.entry(label.as_str()).or_insert(next))
                })
                .collect()
        }
        Column::Numeric(values) => {
            let mut index = BTreeMap::new();
            values
                .iter()
                .map(|v| {
                    if v.is_nan() {
                        return None;
                    }
                    let next = index.len();
                    // +0.0 and -0.0 are the same level
                    let key = (v + 0.0).to_bits();
                    Some(*index.entry(key).or_insert(next))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::iter;

    use xpstat_stats::UndefinedReason;

    use super::*;

    fn frame_with(levels: &[ExperienceLevel], outcome: Vec<f64>) -> Frame {
        let mut frame = Frame::from_levels(levels.to_vec());
        frame.insert("score", Column::Numeric(outcome)).unwrap();
        frame
    }

    fn reference_frame() -> Frame {
        // scipy.stats.levene documentation samples, one per cohort
        let a = [8.88, 9.12, 9.04, 8.98, 9.00, 9.08, 9.01, 8.85, 9.06, 8.99];
        let b = [8.88, 8.95, 9.29, 9.44, 9.15, 9.58, 8.36, 9.18, 8.67, 9.05];
        let c = [8.95, 9.12, 8.95, 8.85, 9.03, 8.84, 9.07, 8.98, 8.86, 8.98];
        let levels = ExperienceLevel::ALL
            .iter()
            .flat_map(|&level| [level; 10])
            .collect::<Vec<_>>();
        let values = a.iter().chain(&b).chain(&c).copied().collect();
        frame_with(&levels, values)
    }

    #[test]
    fn test_levene_violation_is_a_caveat() {
        let frame = reference_frame();
        let result = compare_groups(&frame, "score", &AnalysisConfig::default()).unwrap();

        let levene = result.homogeneity.estimate.defined().unwrap();
        assert!((levene.statistic - 7.584_952_754_501_659).abs() < 1e-6);
        assert!(result.homogeneity.violated);
        assert!(result.caveats.contains(&Caveat::HeterogeneousVariance {
            variable: "score".to_owned()
        }));

        assert_eq!(result.anova.df_between, 2);
        assert_eq!(result.anova.df_within, 27);
        assert_eq!(result.normality.n, 30);
        assert_eq!(result.box_plots.len(), 3);
        assert_eq!(result.box_plots[0].cohort, ExperienceLevel::Expert);
    }

    #[test]
    fn test_constant_outcome() {
        let levels = iter::repeat_n(ExperienceLevel::Expert, 20)
            .chain(iter::repeat_n(ExperienceLevel::PythonNovice, 9))
            .chain(iter::repeat_n(ExperienceLevel::TrueNovice, 11))
            .collect::<Vec<_>>();
        let frame = frame_with(&levels, vec![1.0; 40]);
        let result = compare_groups(&frame, "score", &AnalysisConfig::default()).unwrap();

        assert_eq!(
            result.anova.estimate.reason(),
            Some(UndefinedReason::ZeroWithinGroupVariance)
        );
        let shapiro = result.normality.estimate.defined().unwrap();
        assert!(shapiro.zero_range);
        assert_eq!(shapiro.p_value, 1.0);
        assert!(result.caveats.is_empty());
        assert_eq!(
            result.box_plots.iter().map(|b| b.n).collect::<Vec<_>>(),
            [20, 9, 11]
        );
    }

    #[test]
    fn test_empty_cohort() {
        let levels = [ExperienceLevel::Expert, ExperienceLevel::TrueNovice];
        let frame = frame_with(&levels, vec![1.0, 2.0]);
        assert_eq!(
            compare_groups(&frame, "score", &AnalysisConfig::default()).unwrap_err(),
            AnalysisError::InsufficientGroupData {
                variable: "score".to_owned(),
                cohort: "Python Novice".to_owned(),
            }
        );
    }

    #[test]
    fn test_box_plot_quartiles() {
        let summary =
            BoxPlotSummary::new(ExperienceLevel::Expert, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.mean, 3.0);
    }

    #[test]
    fn test_normality_with_numeric_factor() {
        let levels = [ExperienceLevel::Expert; 6];
        let mut frame = frame_with(&levels, vec![1.0, 3.0, 10.0, 12.0, 20.0, 23.0]);
        frame
            .insert("dose", Column::Numeric(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]))
            .unwrap();
        let check =
            check_normality(&frame, "score", "dose", &AnalysisConfig::default()).unwrap();
        assert_eq!(check.n, 6);
        assert_eq!(check.factor, "dose");
        // residuals are -1, 1, -1, 1, -1.5, 1.5
        let test = check.estimate.defined().unwrap();
        assert!(test.w > 0.0 && test.w <= 1.0);
    }

    #[test]
    fn test_factor_groups() {
        let column = Column::Categorical(vec!["b".into(), "a".into(), "b".into()]);
        assert_eq!(factor_groups(&column), [Some(0), Some(1), Some(0)]);
        let column = Column::Numeric(vec![1.0, f64::NAN, -0.0, 0.0]);
        assert_eq!(factor_groups(&column), [Some(0), None, Some(1), Some(1)]);
    }
}
