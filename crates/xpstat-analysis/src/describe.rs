//! Descriptive statistics per cohort

use serde::Serialize;
use xpstat_stats::descriptive::DescriptiveStats;

use crate::{cohort::ExperienceLevel, error::AnalysisError, frame::Frame};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortStats {
    pub cohort: ExperienceLevel,
    /// `None` if the cohort has no observations.
    pub stats: Option<DescriptiveStats>,
}

/// Summary of one numeric variable, overall and by cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDescription {
    pub variable: String,
    pub overall: Option<DescriptiveStats>,
    pub cohorts: Vec<CohortStats>,
}

/// Describes a numeric variable overall and within each cohort.
///
/// `NaN` entries (such as professional experience outside the professional
/// boundary) are left out.
///
/// # Errors
///
/// Returns an error if `variable` is unknown or not numeric.
pub fn describe_by_cohort(frame: &Frame, variable: &str) -> Result<VariableDescription, AnalysisError> {
    let values = frame.numeric(variable)?;
    let observed = || {
        values
            .iter()
            .zip(frame.levels())
            .filter(|(v, _)| !v.is_nan())
    };

    let overall = DescriptiveStats::new(observed().map(|(v, _)| *v));
    let cohorts = ExperienceLevel::ALL
        .into_iter()
        .map(|cohort| CohortStats {
            cohort,
            stats: DescriptiveStats::new(
                observed()
                    .filter(|(_, level)| **level == cohort)
                    .map(|(v, _)| *v),
            ),
        })
        .collect();

    Ok(VariableDescription {
        variable: variable.to_owned(),
        overall,
        cohorts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    #[test]
    fn test_describe_by_cohort() {
        use ExperienceLevel::{Expert, TrueNovice};
        let mut frame = Frame::from_levels(vec![Expert, TrueNovice, Expert, TrueNovice]);
        frame
            .insert("score", Column::Numeric(vec![4.0, 1.0, 6.0, f64::NAN]))
            .unwrap();

        let description = describe_by_cohort(&frame, "score").unwrap();
        let overall = description.overall.unwrap();
        assert_eq!(overall.count, 3);
        assert!((overall.mean - 11.0 / 3.0).abs() < 1e-12);

        let expert = description.cohorts[0].stats.as_ref().unwrap();
        assert_eq!(description.cohorts[0].cohort, Expert);
        assert_eq!(expert.mean, 5.0);
        assert_eq!(expert.variance, Some(2.0));

        assert!(description.cohorts[1].stats.is_none());

        let novice = description.cohorts[2].stats.as_ref().unwrap();
        assert_eq!(novice.count, 1);
        assert_eq!(novice.variance, None);
    }
}
