//! Levene's test for equality of variances.
//!
//! Uses the median-centred variant (Brown-Forsythe): each observation is
//! replaced by its absolute deviation from its group median, and a one-way
//! ANOVA is run on the deviations. This is robust to non-normal data.

use serde::Serialize;

use crate::{
    Estimate, StatsError,
    anova::{self, FTest},
    descriptive,
};

/// Result of Levene's test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Levene {
    pub df_between: usize,
    pub df_within: usize,
    pub estimate: Estimate<FTest>,
}

/// Runs Levene's test across independent samples.
///
/// # Errors
///
/// Returns [`StatsError::EmptySample`] if any group is empty.
///
/// If every observation equals its group median the statistic is undefined
/// ([`crate::UndefinedReason::ZeroWithinGroupVariance`]).
///
/// ```
/// use xpstat_stats::homogeneity::levene;
///
/// let a = [8.88, 9.12, 9.04, 8.98, 9.00, 9.08, 9.01, 8.85, 9.06, 8.99];
/// let b = [8.88, 8.95, 9.29, 9.44, 9.15, 9.58, 8.36, 9.18, 8.67, 9.05];
/// let c = [8.95, 9.12, 8.95, 8.85, 9.03, 8.84, 9.07, 8.98, 8.86, 8.98];
/// let result = levene(&[&a, &b, &c]).unwrap();
/// let test = result.estimate.defined().unwrap();
/// assert!(test.p_value < 0.01);
/// ```
pub fn levene(groups: &[&[f64]]) -> Result<Levene, StatsError> {
    let deviations = groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let center = descriptive::median(group).ok_or(StatsError::EmptySample { index })?;
            Ok(group.iter().map(|v| (v - center).abs()).collect::<Vec<_>>())
        })
        .collect::<Result<Vec<_>, StatsError>>()?;
    let deviation_refs = deviations.iter().map(Vec::as_slice).collect::<Vec<_>>();

    let anova = anova::one_way(&deviation_refs)?;
    Ok(Levene {
        df_between: anova.df_between,
        df_within: anova.df_within,
        estimate: anova.estimate,
    })
}
