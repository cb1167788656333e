//! Experience-vs-outcome rank correlations
//!
//! Each report pairs a Spearman estimate with the data a plotting layer needs
//! to draw it: one point per participant, tagged with its cohort, and a
//! least-squares trend line.

use serde::Serialize;
use xpstat_stats::{
    Estimate,
    correlation::{self, Correlation},
    regression::LinearFit,
};

use crate::{
    cohort::ExperienceLevel,
    dataset::ParticipantId,
    error::AnalysisError,
    frame::{AVG_SESSION_TIME, Frame},
    study::{ExperienceMetric, StudyData},
};

/// One participant in a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub participant_id: ParticipantId,
    pub cohort: ExperienceLevel,
    pub x: f64,
    pub y: f64,
}

/// Spearman correlation between two frame variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub x: String,
    pub y: String,
    pub n: usize,
    pub estimate: Estimate<Correlation>,
    /// Points grouped by cohort in [`ExperienceLevel::PLOT_ORDER`], ids
    /// ascending within a cohort.
    pub points: Vec<ScatterPoint>,
    /// Least-squares line of `y` on `x`, `None` when `x` is constant.
    pub trend: Option<LinearFit>,
}

/// Correlates two numeric variables.
///
/// With `subset`, only the listed participants are used. Rows where either
/// value is `NaN` are skipped.
///
/// # Errors
///
/// Returns an error if either variable is unknown or not numeric, or if a
/// participant in `subset` is not part of the study.
pub fn correlate(
    frame: &Frame,
    x: &str,
    y: &str,
    subset: Option<&[ParticipantId]>,
) -> Result<CorrelationReport, AnalysisError> {
    let xs = frame.numeric(x)?;
    let ys = frame.numeric(y)?;

    let rows = match subset {
        Some(ids) => ids
            .iter()
            .map(|&participant_id| {
                let index = participant_id
                    .0
                    .checked_sub(1)
                    .map(|i| i as usize)
                    .filter(|&i| i < frame.len())
                    .ok_or(AnalysisError::InvalidParticipant { participant_id })?;
                Ok(index)
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?,
        None => (0..frame.len()).collect(),
    };

    let mut points = rows
        .into_iter()
        .filter(|&row| !xs[row].is_nan() && !ys[row].is_nan())
        .map(|row| ScatterPoint {
            participant_id: ParticipantId::from_index(row),
            cohort: frame.levels()[row],
            x: xs[row],
            y: ys[row],
        })
        .collect::<Vec<_>>();
    points.sort_by_key(|p| {
        let order = ExperienceLevel::PLOT_ORDER
            .iter()
            .position(|&level| level == p.cohort);
        (order, p.participant_id)
    });

    let x_values = points.iter().map(|p| p.x).collect::<Vec<_>>();
    let y_values = points.iter().map(|p| p.y).collect::<Vec<_>>();
    let result = correlation::spearman(&x_values, &y_values).map_err(AnalysisError::stats(y))?;
    let trend = LinearFit::fit(&x_values, &y_values).map_err(AnalysisError::stats(y))?;

    match &result.estimate {
        Estimate::Defined(c) => {
            tracing::debug!(x, y, n = result.n, rho = c.rho, p_value = c.p_value, "spearman");
        }
        Estimate::Undefined { reason } => {
            tracing::debug!(x, y, n = result.n, %reason, "spearman undefined");
        }
    }

    Ok(CorrelationReport {
        x: x.to_owned(),
        y: y.to_owned(),
        n: result.n,
        estimate: result.estimate,
        points,
        trend,
    })
}

/// Correlates each experience metric with `outcome`.
///
/// Programming and Python experience use every participant; professional
/// experience uses only participants within the professional boundary.
///
/// # Errors
///
/// Returns an error if `outcome` is unknown or not numeric.
pub fn experience_correlations(
    data: &StudyData,
    frame: &Frame,
    outcome: &str,
) -> Result<Vec<CorrelationReport>, AnalysisError> {
    ExperienceMetric::ALL
        .into_iter()
        .map(|metric| {
            let subset = data
                .experience(metric)
                .into_iter()
                .map(|(participant_id, _)| participant_id)
                .collect::<Vec<_>>();
            correlate(frame, metric.column(), outcome, Some(subset.as_slice()))
        })
        .collect()
}

/// Correlates average session time with `outcome`.
///
/// # Errors
///
/// Returns an error if `outcome` is unknown or not numeric.
pub fn session_time_correlation(
    frame: &Frame,
    outcome: &str,
) -> Result<CorrelationReport, AnalysisError> {
    correlate(frame, AVG_SESSION_TIME, outcome, None)
}
