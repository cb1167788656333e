//! Rank correlation.
//!
//! Spearman's rho is the Pearson correlation coefficient of the average ranks
//! of both sequences. Significance is assessed two-tailed against the null
//! hypothesis of no monotonic association using
//! `t = rho * sqrt((n - 2) / (1 - rho^2))` with `n - 2` degrees of freedom.

use serde::Serialize;

use crate::{Estimate, StatsError, UndefinedReason, distribution, rank::average_ranks};

/// A correlation coefficient and its two-tailed p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    /// Correlation coefficient in `[-1, 1]`.
    pub rho: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
}

/// Result of a Spearman rank correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpearmanResult {
    /// Number of paired observations.
    pub n: usize,
    pub estimate: Estimate<Correlation>,
}

/// Computes Spearman's rank correlation between `x` and `y`.
///
/// # Errors
///
/// Returns [`StatsError::DimensionMismatch`] if the sequences differ in length.
///
/// A constant sequence yields [`UndefinedReason::ConstantInput`], and fewer
/// than three pairs yields [`UndefinedReason::TooFewObservations`].
///
/// ```
/// use xpstat_stats::{UndefinedReason, correlation::spearman};
///
/// let result = spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(result.estimate.reason(), Some(UndefinedReason::ConstantInput));
///
/// assert!(spearman(&[1.0, 2.0], &[1.0]).is_err());
/// ```
pub fn spearman(x: &[f64], y: &[f64]) -> Result<SpearmanResult, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::DimensionMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 3 {
        return Ok(SpearmanResult {
            n,
            estimate: Estimate::undefined(UndefinedReason::TooFewObservations),
        });
    }

    let rx = average_ranks(x);
    let ry = average_ranks(y);
    let Some(rho) = pearson_coefficient(&rx, &ry) else {
        return Ok(SpearmanResult {
            n,
            estimate: Estimate::undefined(UndefinedReason::ConstantInput),
        });
    };

    let p_value = rank_correlation_p_value(rho, n)?;
    Ok(SpearmanResult {
        n,
        estimate: Estimate::Defined(Correlation { rho, p_value }),
    })
}

/// Pearson product-moment correlation coefficient, `None` if either
/// sequence has zero variance.
///
/// Both slices must have the same length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson_coefficient(x: &[f64], y: &[f64]) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[expect(clippy::cast_precision_loss)]
fn rank_correlation_p_value(rho: f64, n: usize) -> Result<f64, StatsError> {
    let dof = (n - 2) as f64;
    let denom = 1.0 - rho * rho;
    if denom <= 0.0 {
        return Ok(0.0);
    }
    let t = rho * (dof / denom).sqrt();
    distribution::students_t_two_tailed(t, dof)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined(x: &[f64], y: &[f64]) -> Correlation {
        *spearman(x, y).unwrap().estimate.defined().unwrap()
    }

    #[test]
    fn test_reference_value() {
        // scipy.stats.spearmanr([1, 2, 3, 4, 5], [5, 6, 7, 8, 7])
        let corr = defined(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 6.0, 7.0, 8.0, 7.0]);
        assert!((corr.rho - 0.820_782_681_668_123_3).abs() < 1e-12);
        assert!((corr.p_value - 0.088_587_005_313_543_81).abs() < 1e-6);
    }

    #[test]
    fn test_self_correlation_is_one() {
        let x = [3.0, 1.5, 8.0, 2.0, 9.5, 4.0];
        let corr = defined(&x, &x);
        assert!((corr.rho - 1.0).abs() < 1e-12);
        assert!(corr.p_value < 1e-10);
    }

    #[test]
    fn test_negation_is_minus_one() {
        let x = [3.0, 1.5, 8.0, 2.0, 9.5, 4.0];
        let neg = x.map(|v| -v);
        let corr = defined(&x, &neg);
        assert!((corr.rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let x = vec![1.0; 40];
        let y = vec![1.0; 39];
        assert_eq!(
            spearman(&x, &y),
            Err(StatsError::DimensionMismatch {
                left: 40,
                right: 39
            })
        );
    }

    #[test]
    fn test_constant_outcome_is_undefined() {
        let result = spearman(&[1.0, 2.0, 3.0, 4.0], &[5.0; 4]).unwrap();
        assert_eq!(result.n, 4);
        assert_eq!(
            result.estimate.reason(),
            Some(UndefinedReason::ConstantInput)
        );
    }

    #[test]
    fn test_too_few_observations() {
        let result = spearman(&[1.0, 2.0], &[2.0, 1.0]).unwrap();
        assert_eq!(
            result.estimate.reason(),
            Some(UndefinedReason::TooFewObservations)
        );
    }

    #[test]
    fn test_monotonic_transform_invariance() {
        let x = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0];
        let y = [2.0, 3.0, 1.0, 9.0, 4.0, 4.0];
        let transformed = x.map(f64::exp);
        let a = defined(&x, &y);
        let b = defined(&transformed, &y);
        assert!((a.rho - b.rho).abs() < 1e-12);
        assert!((a.p_value - b.p_value).abs() < 1e-12);
    }
}
