//! Statistical procedures for the xpstat study analysis.
//!
//! This crate provides the numeric core used by the analysis engines:
//!
//! - **Descriptive statistics**: count, mean, median, sample variance, extremes
//! - **Quartiles**: linear-interpolated quartiles for box-plot summaries
//! - **Rank correlation**: Spearman's rho with a two-tailed significance test
//! - **Linear regression**: least-squares trend lines for scatter plots
//! - **One-way ANOVA**: F test across independent groups
//! - **Normality**: Shapiro-Wilk W test (Royston's algorithm)
//! - **Homogeneity of variance**: Levene's test (median centred)
//! - **Contingency analysis**: Pearson chi-square test of independence with
//!   residual diagnostics
//!
//! Everything here works on plain `f64` slices and knows nothing about
//! participants or cohorts.
//!
//! # Undefined results
//!
//! Degenerate inputs (constant samples, zero within-group variance, a
//! single-row contingency table) are not errors. Procedures return an
//! [`Estimate`], which is either [`Estimate::Defined`] or
//! [`Estimate::Undefined`] with an [`UndefinedReason`]. Errors are reserved
//! for malformed input such as sequences of unequal length.
//!
//! # Examples
//!
//! ## Rank correlation
//!
//! ```
//! use xpstat_stats::correlation::spearman;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [5.0, 6.0, 7.0, 8.0, 7.0];
//! let result = spearman(&x, &y).unwrap();
//! let corr = result.estimate.defined().unwrap();
//! assert!((corr.rho - 0.820_782_681_668_123_3).abs() < 1e-12);
//! ```
//!
//! ## Chi-square test of independence
//!
//! ```
//! use xpstat_stats::contingency::{ContingencyTable, chi_square};
//!
//! let table = ContingencyTable::from_counts(
//!     vec!["a".into(), "b".into()],
//!     vec!["x".into(), "y".into(), "z".into()],
//!     vec![vec![10.0, 10.0, 20.0], vec![20.0, 20.0, 20.0]],
//! )
//! .unwrap();
//! let test = chi_square(&table).unwrap();
//! assert_eq!(test.dof, 2);
//! ```

pub use self::estimate::{Estimate, UndefinedReason};

pub mod anova;
pub mod contingency;
pub mod correlation;
pub mod descriptive;
mod distribution;
mod estimate;
pub mod homogeneity;
pub mod normality;
pub mod percentiles;
pub mod rank;
pub mod regression;

/// Errors raised for malformed input to a statistical procedure.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    #[display("input sequences have different lengths ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
    #[display("sample {index} is empty")]
    EmptySample { index: usize },
    #[display("contingency table is malformed: {reason}")]
    MalformedTable { reason: String },
    #[display("invalid {name} distribution parameters")]
    Distribution { name: &'static str },
}
