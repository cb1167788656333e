//! Ordinary least-squares line fitting.

use serde::Serialize;

use crate::StatsError;

/// A fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// Fits a degree-1 polynomial to the points by least squares.
    ///
    /// Returns `Ok(None)` when the fit is not identifiable (fewer than two
    /// points or constant `x`).
    ///
    /// ```
    /// use xpstat_stats::regression::LinearFit;
    ///
    /// let fit = LinearFit::fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap().unwrap();
    /// assert!((fit.slope - 2.0).abs() < 1e-12);
    /// assert!((fit.intercept - 1.0).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Option<Self>, StatsError> {
        if x.len() != y.len() {
            return Err(StatsError::DimensionMismatch {
                left: x.len(),
                right: y.len(),
            });
        }
        if x.len() < 2 {
            return Ok(None);
        }
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let sxx = x.iter().map(|xi| (xi - mean_x).powi(2)).sum::<f64>();
        if sxx == 0.0 {
            return Ok(None);
        }
        let sxy = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
            .sum::<f64>();
        let slope = sxy / sxx;
        Ok(Some(Self {
            intercept: mean_y - slope * mean_x,
            slope,
        }))
    }

    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}
