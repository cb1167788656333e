//! One-way analysis of variance.

use serde::Serialize;

use crate::{Estimate, StatsError, UndefinedReason, distribution};

/// An F statistic with its upper-tail p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FTest {
    pub statistic: f64,
    pub p_value: f64,
}

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneWayAnova {
    /// Number of groups compared.
    pub groups: usize,
    /// Total number of observations.
    pub n: usize,
    /// Between-group sum of squares.
    pub ss_between: f64,
    /// Within-group sum of squares.
    pub ss_within: f64,
    /// Between-group degrees of freedom (`k - 1`).
    pub df_between: usize,
    /// Within-group degrees of freedom (`N - k`).
    pub df_within: usize,
    pub estimate: Estimate<FTest>,
}

/// Performs a one-way ANOVA F test across independent samples.
///
/// # Errors
///
/// Returns [`StatsError::EmptySample`] if any group is empty.
///
/// Fewer than two groups, or no within-group degrees of freedom, yields
/// [`UndefinedReason::TooFewObservations`]. If every group is internally
/// constant the F ratio is undefined and
/// [`UndefinedReason::ZeroWithinGroupVariance`] is reported.
///
/// ```
/// use xpstat_stats::anova::one_way;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [1.0, 2.0, 3.0];
/// let result = one_way(&[&a, &b]).unwrap();
/// assert_eq!(result.estimate.defined().unwrap().statistic, 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn one_way(groups: &[&[f64]]) -> Result<OneWayAnova, StatsError> {
    if let Some(index) = groups.iter().position(|g| g.is_empty()) {
        return Err(StatsError::EmptySample { index });
    }

    let k = groups.len();
    let n = groups.iter().map(|g| g.len()).sum::<usize>();
    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let mean = group.iter().sum::<f64>() / group.len() as f64;
        ss_between += group.len() as f64 * (mean - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    }

    let df_between = k.saturating_sub(1);
    let df_within = n.saturating_sub(k);
    let mut result = OneWayAnova {
        groups: k,
        n,
        ss_between,
        ss_within,
        df_between,
        df_within,
        estimate: Estimate::undefined(UndefinedReason::TooFewObservations),
    };
    if k < 2 || df_within == 0 {
        return Ok(result);
    }
    if ss_within == 0.0 {
        result.estimate = Estimate::undefined(UndefinedReason::ZeroWithinGroupVariance);
        return Ok(result);
    }

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let statistic = ms_between / ms_within;
    let p_value = distribution::fisher_snedecor_sf(statistic, df_between as f64, df_within as f64)?;
    result.estimate = Estimate::Defined(FTest { statistic, p_value });
    Ok(result)
}
