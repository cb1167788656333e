//! Analysis of the programming-experience debugging study
//!
//! This crate turns raw study records into the statistical results of the
//! study: how experience relates to debugging outcomes, whether the three
//! experience cohorts differ, and whether categorical outcomes depend on
//! cohort membership.
//!
//! # Overview
//!
//! ## Loading
//!
//! 1. **Data Source** ([`source::DataSource`]): Provides participant, session,
//!    stimulus, and outcome tables ([`source::JsonDataSource`] reads a file,
//!    [`dataset::Dataset`] is an in-memory snapshot)
//! 2. **Study Snapshot** ([`study::StudyData`]): Loads and cross-checks every
//!    table once
//! 3. **Analysis Frame** ([`frame::Frame`]): Participant-aligned numeric and
//!    categorical columns addressed by name
//!
//! ## Analyses
//!
//! - **Cohorts** ([`cohort`]): Three-way experience levels and the binary
//!   expert / novice grouping
//! - **Correlation** ([`correlation`]): Spearman correlation of experience
//!   measures and session time with an outcome, with scatter data
//! - **Group Comparison** ([`comparison`]): One-way ANOVA across cohorts with
//!   Shapiro-Wilk and Levene assumption checks and box-plot summaries
//! - **Contingency** ([`contingency`]): Chi-square test of a categorical
//!   outcome against a grouping, with residuals
//! - **Description** ([`describe`]): Descriptive statistics per cohort
//!
//! Statistical procedures themselves live in `xpstat_stats`.
//!
//! # Examples
//!
//! ```
//! use xpstat_analysis::{
//!     comparison, config::AnalysisConfig, frame::Frame, study::StudyData,
//!     synth::{self, SynthConfig},
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let config = AnalysisConfig::default();
//! let dataset = synth::generate(&SynthConfig::default(), 1);
//!
//! let data = StudyData::load(&dataset, &config)?;
//! let frame = Frame::from_study(&data)?;
//! let comparison = comparison::compare_groups(&frame, "bugs_fixed", &config)?;
//!
//! assert_eq!(comparison.box_plots.len(), 3);
//! # Ok(())
//! # }
//! ```

pub use self::error::{AnalysisError, DataError};

pub mod cohort;
pub mod comparison;
pub mod config;
pub mod contingency;
pub mod correlation;
pub mod dataset;
pub mod describe;
mod error;
pub mod frame;
pub mod source;
pub mod study;
pub mod synth;
