//! Shapiro-Wilk test for normality.
//!
//! The implementation follows Royston's algorithm (Applied Statistics
//! algorithm AS R94, 1995): the coefficients of the W statistic are
//! approximated from expected normal order statistics, and the null
//! distribution of `ln(1 - W)` is approximated by a normal distribution whose
//! mean and standard deviation are polynomials in `n` (or `ln n`).
//!
//! Valid sample sizes are 3 to 5000.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_3, PI};

use serde::Serialize;

use crate::{Estimate, StatsError, UndefinedReason, distribution};

/// Largest sample size supported by the approximation.
pub const MAX_SAMPLE_SIZE: usize = 5000;

const SMALL: f64 = 1e-19;

const G: [f64; 2] = [-2.273, 0.459];
const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_19, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];

/// Result of a Shapiro-Wilk test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    /// The W statistic in `(0, 1]`.
    pub w: f64,
    pub p_value: f64,
    /// The sample has zero range; W and p are reported as 1.
    pub zero_range: bool,
}

/// Runs the Shapiro-Wilk test on `values`.
///
/// A sample whose values are all equal has no evidence against normality and
/// reports `W = 1`, `p = 1` with [`ShapiroWilk::zero_range`] set.
///
/// Fewer than three values, or more than [`MAX_SAMPLE_SIZE`], yields
/// [`UndefinedReason::TooFewObservations`] (the approximation has no
/// coefficients outside that range).
///
/// ```
/// use xpstat_stats::normality::shapiro_wilk;
///
/// let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
/// let test = result.defined().unwrap();
/// assert!((test.w - 1.0).abs() < 1e-9);
/// assert!(test.p_value > 0.99);
/// ```
pub fn shapiro_wilk(values: &[f64]) -> Result<Estimate<ShapiroWilk>, StatsError> {
    let n = values.len();
    if !(3..=MAX_SAMPLE_SIZE).contains(&n) {
        return Ok(Estimate::undefined(UndefinedReason::TooFewObservations));
    }

    let mut x = values.to_vec();
    x.sort_by(f64::total_cmp);
    // Shift by a central value to limit cancellation in the sums below.
    let shift = x[n / 2];
    for v in &mut x {
        *v -= shift;
    }

    let range = x[n - 1] - x[0];
    if range < SMALL {
        return Ok(Estimate::Defined(ShapiroWilk {
            w: 1.0,
            p_value: 1.0,
            zero_range: true,
        }));
    }

    let a = coefficients(n)?;
    let w = w_statistic(&x, &a, range);
    let p_value = p_value(w, n)?;
    Ok(Estimate::Defined(ShapiroWilk {
        w,
        p_value,
        zero_range: false,
    }))
}

/// Evaluates `cc[0] + cc[1] x + cc[2] x^2 + ...`.
fn poly(cc: &[f64], x: f64) -> f64 {
    cc.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Computes the antisymmetric coefficients `a_1..a_{n/2}` for the upper half
/// of the ordered sample.
#[expect(clippy::cast_precision_loss)]
fn coefficients(n: usize) -> Result<Vec<f64>, StatsError> {
    let nn2 = n / 2;
    if n == 3 {
        return Ok(vec![FRAC_1_SQRT_2]);
    }

    let an = n as f64;
    let an25 = an + 0.25;
    let m = (1..=nn2)
        .map(|i| distribution::normal_quantile((i as f64 - 0.375) / an25))
        .collect::<Result<Vec<_>, _>>()?;
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; nn2];
    a[0] = a1;
    let first_scaled = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        2
    } else {
        1
    };
    let fac = if first_scaled == 2 {
        ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a[0] * a[0] - 2.0 * a[1] * a[1]))
            .sqrt()
    } else {
        ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a[0] * a[0])).sqrt()
    };
    for i in first_scaled..nn2 {
        a[i] = -m[i] / fac;
    }
    Ok(a)
}

/// W as the squared correlation between the ordered sample and the full
/// coefficient vector, computed as `1 - (1 - r^2)` for precision near 1.
#[expect(clippy::cast_precision_loss)]
fn w_statistic(sorted: &[f64], a: &[f64], range: f64) -> f64 {
    let n = sorted.len();
    let coef = |i: usize| -> f64 {
        let j = n - 1 - i;
        match i.cmp(&j) {
            std::cmp::Ordering::Less => -a[i],
            std::cmp::Ordering::Greater => a[j],
            std::cmp::Ordering::Equal => 0.0,
        }
    };

    let an = n as f64;
    let sa = (0..n).map(coef).sum::<f64>() / an;
    let sx = sorted.iter().map(|v| v / range).sum::<f64>() / an;

    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (i, v) in sorted.iter().enumerate() {
        let asa = coef(i) - sa;
        let xsx = v / range - sx;
        ssa += asa * asa;
        ssx += xsx * xsx;
        sax += asa * xsx;
    }

    let ssassx = (ssa * ssx).sqrt();
    let w1 = (ssassx - sax) * (ssassx + sax) / (ssa * ssx);
    (1.0 - w1).clamp(0.0, 1.0)
}

#[expect(clippy::cast_precision_loss)]
fn p_value(w: f64, n: usize) -> Result<f64, StatsError> {
    if n == 3 {
        let pi6 = 6.0 / PI;
        return Ok((pi6 * (w.sqrt().asin() - FRAC_PI_3)).clamp(0.0, 1.0));
    }

    let an = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return Ok(1.0);
    }
    let mut y = w1.ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return Ok(1e-99);
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };
    distribution::normal_sf((y - m) / s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(values: &[f64]) -> ShapiroWilk {
        *shapiro_wilk(values).unwrap().defined().unwrap()
    }

    #[test]
    fn test_poly_horner() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(poly(&[4.0], 10.0), 4.0);
    }

    #[test]
    fn test_too_few_observations() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]).unwrap().reason(),
            Some(UndefinedReason::TooFewObservations)
        );
    }

    #[test]
    fn test_constant_sample_has_high_p_value() {
        let result = run(&[5.0; 40]);
        assert!(result.zero_range);
        assert_eq!(result.w, 1.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_coefficients_are_normalised() {
        for n in [4, 5, 6, 11, 12, 40, 200] {
            let a = coefficients(n).unwrap();
            let sum_sq = 2.0 * a.iter().map(|v| v * v).sum::<f64>();
            assert!((sum_sq - 1.0).abs() < 1e-3, "n={n} sum={sum_sq}");
            assert!(a.windows(2).all(|w| w[0] >= w[1]), "n={n} {a:?}");
        }
    }

    #[test]
    fn test_symmetric_sample_is_not_rejected() {
        // Expected normal order statistics for n = 20 are as normal as it gets.
        let values = (1..=20)
            .map(|i| distribution::normal_quantile((f64::from(i) - 0.375) / 20.25).unwrap())
            .collect::<Vec<_>>();
        let result = run(&values);
        assert!(result.w > 0.98, "w={}", result.w);
        assert!(result.p_value > 0.5, "p={}", result.p_value);
    }

    #[test]
    fn test_skewed_sample_is_rejected() {
        let values = [
            1.0, 1.0, 1.0, 1.0, 1.2, 1.1, 1.3, 1.0, 1.4, 1.2, 1.1, 1.0, 1.5, 2.0, 40.0,
        ];
        let result = run(&values);
        assert!(result.w < 0.6, "w={}", result.w);
        assert!(result.p_value < 0.01, "p={}", result.p_value);
    }

    #[test]
    fn test_reference_value() {
        let values = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let result = run(&values);
        assert!((result.w - 0.788_81).abs() < 1e-4, "w={}", result.w);
        assert!((result.p_value - 0.006_704).abs() < 1e-4, "p={}", result.p_value);
    }

    #[test]
    fn test_small_sample_branch() {
        let result = run(&[2.1, 3.4, 1.9, 5.6, 4.4, 3.0, 2.8]);
        assert!(result.w > 0.0 && result.w <= 1.0);
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_order_invariant() {
        let a = run(&[3.0, 1.0, 4.0, 1.5, 5.0, 9.0, 2.6]);
        let b = run(&[9.0, 5.0, 4.0, 3.0, 2.6, 1.5, 1.0]);
        assert!((a.w - b.w).abs() < 1e-12);
    }
}
