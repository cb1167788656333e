use serde::Serialize;

/// Location and spread of a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Mean of the two middle values for even counts.
    pub median: f64,
    /// The sample variance (`n - 1` denominator), `None` for a single value.
    pub variance: Option<f64>,
    /// The sample standard deviation, `None` for a single value.
    pub std_dev: Option<f64>,
    /// The population standard deviation (`n` denominator).
    pub population_std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes unsorted values, or returns `None` for an empty sample.
    ///
    /// # Examples
    ///
    /// ```
    /// # use xpstat_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, Some(2.5));
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = median_of_sorted(sorted_values);
        let sum_sq = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>();
        let variance = (count > 1).then(|| sum_sq / (n - 1.0));

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.map(f64::sqrt),
            population_std_dev: (sum_sq / n).sqrt(),
        })
    }
}

/// Arithmetic mean, `None` for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of unsorted values, `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(median_of_sorted(&sorted))
}

fn median_of_sorted(sorted_values: &[f64]) -> f64 {
    let mid = sorted_values.len() / 2;
    if sorted_values.len() % 2 == 0 {
        f64::midpoint(sorted_values[mid - 1], sorted_values[mid])
    } else {
        sorted_values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(DescriptiveStats::new([]).is_none());
        assert!(mean(&[]).is_none());
        assert!(median(&[]).is_none());
    }

    #[test]
    fn test_single_value_has_no_sample_variance() {
        let stats = DescriptiveStats::new([7.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.variance, None);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.population_std_dev, 0.0);
    }

    #[test]
    fn test_even_median() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_population_std_dev() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((stats.population_std_dev - 2.0).abs() < 1e-12);
        assert!((stats.std_dev.unwrap() - 2.138_089_935_299_395).abs() < 1e-12);
    }
}
