use serde::Serialize;

/// Lower quartile, median and upper quartile of a sample.
///
/// Quartiles use linear interpolation between order statistics, so they
/// agree with the default box-plot definition of most plotting tools.
///
/// # Examples
///
/// ```
/// use xpstat_stats::percentiles::Quartiles;
///
/// let values = [7.0, 1.0, 4.0, 10.0, 2.0, 9.0, 3.0, 8.0, 6.0, 5.0];
/// let quartiles = Quartiles::new(&values).unwrap();
///
/// assert_eq!(quartiles.q1, 3.25);
/// assert_eq!(quartiles.median, 5.5);
/// assert_eq!(quartiles.q3, 7.75);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    /// Returns `None` for an empty sample.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        if sorted_values.is_empty() {
            return None;
        }
        Some(Self {
            q1: quantile(sorted_values, 0.25),
            median: quantile(sorted_values, 0.5),
            q3: quantile(sorted_values, 0.75),
        })
    }

    #[must_use]
    pub fn new(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Distance between the upper and lower quartiles.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// The `q`-quantile (`0.0..=1.0`) of sorted data, interpolated at
/// fractional position `(n - 1) * q`.
///
/// Returns `f64::NAN` if the input is empty.
///
/// ```
/// use xpstat_stats::percentiles::quantile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile(&values, 0.5), 2.5);
/// assert_eq!(quantile(&values, 0.0), 1.0);
/// assert_eq!(quantile(&values, 1.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn quantile(sorted_values: &[f64], q: f64) -> f64 {
    let Some(last) = sorted_values.len().checked_sub(1) else {
        return f64::NAN;
    };
    let position = last as f64 * q.clamp(0.0, 1.0);
    let below = (position.floor() as usize).min(last);
    let above = (below + 1).min(last);
    let weight = position - below as f64;
    sorted_values[below] + (sorted_values[above] - sorted_values[below]) * weight
}
