//! Contingency tables and the Pearson chi-square test of independence.
//!
//! The test statistic is the uncorrected Pearson chi-square, whatever the
//! table shape. Expected frequencies below 5 are not guarded against; callers
//! can inspect [`ChiSquare::cells_below`] and decide how to report them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Estimate, StatsError, UndefinedReason, distribution};

/// A two-way table of observed counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<Vec<f64>>,
}

impl ContingencyTable {
    /// Cross-tabulates two parallel label sequences.
    ///
    /// Row and column categories are the distinct labels in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::DimensionMismatch`] if the sequences differ in
    /// length, or [`StatsError::MalformedTable`] if they are empty.
    ///
    /// ```
    /// use xpstat_stats::contingency::ContingencyTable;
    ///
    /// let table = ContingencyTable::from_labels(
    ///     &["yes", "no", "yes", "yes"],
    ///     &["Expert", "Novice", "Novice", "Expert"],
    /// )
    /// .unwrap();
    /// assert_eq!(table.row_labels(), ["no", "yes"]);
    /// assert_eq!(table.count(1, 0), 2.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn from_labels<R, C>(rows: &[R], cols: &[C]) -> Result<Self, StatsError>
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        if rows.len() != cols.len() {
            return Err(StatsError::DimensionMismatch {
                left: rows.len(),
                right: cols.len(),
            });
        }
        if rows.is_empty() {
            return Err(StatsError::MalformedTable {
                reason: "no observations".to_owned(),
            });
        }

        let mut cells = BTreeMap::<(&str, &str), usize>::new();
        for (row, col) in rows.iter().zip(cols) {
            *cells.entry((row.as_ref(), col.as_ref())).or_insert(0) += 1;
        }
        let row_labels = sorted_unique(rows.iter().map(AsRef::as_ref));
        let col_labels = sorted_unique(cols.iter().map(AsRef::as_ref));
        let counts = row_labels
            .iter()
            .map(|r| {
                col_labels
                    .iter()
                    .map(|c| cells.get(&(r.as_str(), c.as_str())).copied().unwrap_or(0) as f64)
                    .collect()
            })
            .collect();

        Ok(Self {
            row_labels,
            col_labels,
            counts,
        })
    }

    /// Builds a table from explicit counts (`counts[row][col]`).
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::MalformedTable`] if the shape does not match the
    /// labels, a count is negative or not finite, or a row or column sums to
    /// zero.
    pub fn from_counts(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        counts: Vec<Vec<f64>>,
    ) -> Result<Self, StatsError> {
        let malformed = |reason: String| StatsError::MalformedTable { reason };
        if row_labels.is_empty() || col_labels.is_empty() {
            return Err(malformed("table has no rows or columns".to_owned()));
        }
        if counts.len() != row_labels.len() || counts.iter().any(|r| r.len() != col_labels.len())
        {
            return Err(malformed(format!(
                "expected {}x{} counts",
                row_labels.len(),
                col_labels.len()
            )));
        }
        if counts.iter().flatten().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(malformed("counts must be finite and non-negative".to_owned()));
        }

        let table = Self {
            row_labels,
            col_labels,
            counts,
        };
        if let Some(i) = table.row_totals().iter().position(|t| *t == 0.0) {
            return Err(malformed(format!("row '{}' is empty", table.row_labels[i])));
        }
        if let Some(j) = table.col_totals().iter().position(|t| *t == 0.0) {
            return Err(malformed(format!("column '{}' is empty", table.col_labels[j])));
        }
        Ok(table)
    }

    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    #[must_use]
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Observed counts, `counts()[row][col]`.
    #[must_use]
    pub fn counts(&self) -> &[Vec<f64>] {
        &self.counts
    }

    #[must_use]
    pub fn count(&self, row: usize, col: usize) -> f64 {
        self.counts[row][col]
    }

    #[must_use]
    pub fn row_totals(&self) -> Vec<f64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    #[must_use]
    pub fn col_totals(&self) -> Vec<f64> {
        (0..self.col_labels.len())
            .map(|j| self.counts.iter().map(|r| r[j]).sum())
            .collect()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }

    /// Degrees of freedom of the independence test, `(r - 1)(c - 1)`.
    #[must_use]
    pub fn dof(&self) -> usize {
        (self.row_labels.len() - 1) * (self.col_labels.len() - 1)
    }

    /// Expected counts under independence: `row_total * col_total / total`.
    #[must_use]
    pub fn expected(&self) -> Vec<Vec<f64>> {
        independence_fit(&self.counts)
    }
}

fn sorted_unique<'a, I>(labels: I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut unique = labels.map(str::to_owned).collect::<Vec<_>>();
    unique.sort();
    unique.dedup();
    unique
}

fn independence_fit(counts: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let row_totals = counts.iter().map(|r| r.iter().sum::<f64>()).collect::<Vec<_>>();
    let cols = counts.first().map_or(0, Vec::len);
    let col_totals = (0..cols)
        .map(|j| counts.iter().map(|r| r[j]).sum::<f64>())
        .collect::<Vec<_>>();
    let total = row_totals.iter().sum::<f64>();
    row_totals
        .iter()
        .map(|rt| col_totals.iter().map(|ct| rt * ct / total).collect())
        .collect()
}

/// A chi-square statistic with its upper-tail p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

/// Result of a Pearson chi-square test of independence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquare {
    pub dof: usize,
    /// Expected frequencies under independence, `expected[row][col]`.
    pub expected: Vec<Vec<f64>>,
    pub estimate: Estimate<ChiSquareStatistic>,
}

impl ChiSquare {
    /// Number of cells whose expected frequency is below `threshold`.
    #[must_use]
    pub fn cells_below(&self, threshold: f64) -> usize {
        self.expected
            .iter()
            .flatten()
            .filter(|e| **e < threshold)
            .count()
    }
}

/// Runs the Pearson chi-square test of independence on `table`.
///
/// A table with a single row or column has no degrees of freedom and yields
/// [`UndefinedReason::DegenerateTable`].
pub fn chi_square(table: &ContingencyTable) -> Result<ChiSquare, StatsError> {
    let expected = table.expected();
    let dof = table.dof();
    if dof == 0 {
        return Ok(ChiSquare {
            dof,
            expected,
            estimate: Estimate::undefined(UndefinedReason::DegenerateTable),
        });
    }

    let statistic = table
        .counts
        .iter()
        .flatten()
        .zip(expected.iter().flatten())
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum::<f64>();
    #[expect(clippy::cast_precision_loss)]
    let p_value = distribution::chi_squared_sf(statistic, dof as f64)?;
    Ok(ChiSquare {
        dof,
        expected,
        estimate: Estimate::Defined(ChiSquareStatistic { statistic, p_value }),
    })
}

/// Cell-level diagnostics of a contingency table, `[row][col]` layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Residuals {
    /// Whether zero cells were replaced by 0.5 before fitting.
    pub zeros_shifted: bool,
    /// `(O - E) / sqrt(E)`.
    pub pearson: Vec<Vec<f64>>,
    /// Pearson residuals divided by `sqrt((1 - row share)(1 - column share))`.
    pub standardized: Vec<Vec<f64>>,
    /// Per-cell contribution to the chi-square statistic (Pearson residual squared).
    pub contributions: Vec<Vec<f64>>,
}

/// Computes Pearson residuals, standardized residuals and chi-square
/// contributions.
///
/// When any observed cell is zero, every zero cell is replaced by 0.5 before
/// the independence model is fitted, so that residuals stay finite on the
/// log-linear scale; [`Residuals::zeros_shifted`] records this.
///
/// A table with a single row or column yields
/// [`UndefinedReason::DegenerateTable`] (the standardizing factor is zero).
#[must_use]
pub fn residuals(table: &ContingencyTable) -> Estimate<Residuals> {
    if table.dof() == 0 {
        return Estimate::undefined(UndefinedReason::DegenerateTable);
    }

    let zeros_shifted = table.counts.iter().flatten().any(|c| *c == 0.0);
    let counts = if zeros_shifted {
        table
            .counts
            .iter()
            .map(|r| r.iter().map(|&c| if c == 0.0 { 0.5 } else { c }).collect())
            .collect::<Vec<Vec<f64>>>()
    } else {
        table.counts.clone()
    };

    let fitted = independence_fit(&counts);
    let total = counts.iter().flatten().sum::<f64>();
    let row_share = counts
        .iter()
        .map(|r| r.iter().sum::<f64>() / total)
        .collect::<Vec<_>>();
    let col_share = (0..table.col_labels.len())
        .map(|j| counts.iter().map(|r| r[j]).sum::<f64>() / total)
        .collect::<Vec<_>>();

    let pearson = counts
        .iter()
        .zip(&fitted)
        .map(|(obs, fit)| {
            obs.iter()
                .zip(fit)
                .map(|(o, e)| (o - e) / e.sqrt())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let standardized = pearson
        .iter()
        .zip(&row_share)
        .map(|(row, rs)| {
            row.iter()
                .zip(&col_share)
                .map(|(r, cs)| r / ((1.0 - rs) * (1.0 - cs)).sqrt())
                .collect()
        })
        .collect();
    let contributions = pearson
        .iter()
        .map(|row| row.iter().map(|r| r * r).collect())
        .collect();

    Estimate::Defined(Residuals {
        zeros_shifted,
        pearson,
        standardized,
        contributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn reference_table() -> ContingencyTable {
        ContingencyTable::from_counts(
            labels(&["a", "b"]),
            labels(&["x", "y", "z"]),
            vec![vec![10.0, 10.0, 20.0], vec![20.0, 20.0, 20.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_reference_value() {
        // scipy.stats.chi2_contingency documentation example
        let result = chi_square(&reference_table()).unwrap();
        let stat = result.estimate.defined().unwrap();
        assert_eq!(result.dof, 2);
        assert!((stat.statistic - 2.777_777_777_777_777_7).abs() < 1e-12);
        assert!((stat.p_value - 0.249_352_208_777_296_2).abs() < 1e-9);
        assert_eq!(
            result.expected,
            vec![vec![12.0, 12.0, 16.0], vec![18.0, 18.0, 24.0]]
        );
        assert_eq!(result.cells_below(5.0), 0);
        assert_eq!(result.cells_below(13.0), 2);
    }

    #[test]
    fn test_contributions_sum_to_statistic() {
        let table = reference_table();
        let stat = chi_square(&table).unwrap().estimate.into_defined().unwrap();
        let res = residuals(&table).into_defined().unwrap();
        assert!(!res.zeros_shifted);
        let sum = res.contributions.iter().flatten().sum::<f64>();
        assert!((sum - stat.statistic).abs() < 1e-12);
        // (10 - 12) / sqrt(12)
        assert!((res.pearson[0][0] + 2.0 / 12f64.sqrt()).abs() < 1e-12);
        // divided by sqrt((1 - 0.4)(1 - 0.3))
        let expected = res.pearson[0][0] / (0.6f64 * 0.7).sqrt();
        assert!((res.standardized[0][0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_proportional_rows_are_independent() {
        let table = ContingencyTable::from_counts(
            labels(&["a", "b", "c"]),
            labels(&["x", "y"]),
            vec![vec![2.0, 4.0], vec![5.0, 10.0], vec![1.0, 2.0]],
        )
        .unwrap();
        let stat = chi_square(&table).unwrap().estimate.into_defined().unwrap();
        assert!(stat.statistic.abs() < 1e-12);
        assert!((stat.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_column_is_degenerate() {
        let table = ContingencyTable::from_labels(&["a", "b", "a"], &["x", "x", "x"]).unwrap();
        let result = chi_square(&table).unwrap();
        assert_eq!(result.dof, 0);
        assert_eq!(
            result.estimate.reason(),
            Some(UndefinedReason::DegenerateTable)
        );
        assert!(residuals(&table).is_undefined());
    }

    #[test]
    fn test_zero_cells_are_shifted_for_residuals() {
        let table =
            ContingencyTable::from_labels(&["a", "a", "b", "b"], &["x", "x", "y", "y"]).unwrap();
        assert_eq!(table.counts(), [vec![2.0, 0.0], vec![0.0, 2.0]]);
        let res = residuals(&table).into_defined().unwrap();
        assert!(res.zeros_shifted);
        assert!(res.pearson.iter().flatten().all(|r| r.is_finite()));
    }

    #[test]
    fn test_from_labels_mismatch() {
        assert_eq!(
            ContingencyTable::from_labels(&["a"], &["x", "y"]),
            Err(StatsError::DimensionMismatch { left: 1, right: 2 })
        );
    }

    #[test]
    fn test_from_counts_rejects_empty_margin() {
        let err = ContingencyTable::from_counts(
            labels(&["a", "b"]),
            labels(&["x", "y"]),
            vec![vec![1.0, 0.0], vec![3.0, 0.0]],
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::MalformedTable { .. }));
    }
}
