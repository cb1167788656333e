//! Full analysis runs over in-memory datasets

use xpstat_analysis::{
    comparison, contingency, correlation,
    config::AnalysisConfig,
    dataset::{Dataset, OutcomeRecord, OutcomeValue, ParticipantId},
    describe,
    frame::{EXPERTISE, Frame, XP_LEVEL},
    study::StudyData,
    synth::{self, SynthConfig},
};
use xpstat_stats::UndefinedReason;

fn with_outcome(mut dataset: Dataset, variable: &str, values: &[f64]) -> Dataset {
    dataset.outcomes.retain(|o| o.variable != variable);
    dataset
        .outcomes
        .extend(values.iter().enumerate().map(|(index, &v)| OutcomeRecord {
            participant_id: ParticipantId::from_index(index),
            variable: variable.to_owned(),
            value: OutcomeValue::Number(v),
        }));
    dataset
}

#[test]
fn test_synthetic_study() {
    let config = AnalysisConfig::default();
    let dataset = synth::generate(&SynthConfig::default(), 2024);
    let data = StudyData::load(&dataset, &config).unwrap();
    let frame = Frame::from_study(&data).unwrap();

    let partition = data.partition();
    assert_eq!(partition.len(), 40);

    let correlations = correlation::experience_correlations(&data, &frame, "bugs_fixed").unwrap();
    assert_eq!(correlations.len(), 3);
    assert_eq!(correlations[0].n, 40);
    assert_eq!(correlations[2].n, 20);

    let session = correlation::session_time_correlation(&frame, "bugs_fixed").unwrap();
    assert_eq!(session.points.len(), 40);

    let comparison = comparison::compare_groups(&frame, "bugs_fixed", &config).unwrap();
    assert_eq!(comparison.anova.df_between, 2);
    assert_eq!(comparison.anova.df_within, 37);

    for grouping in [XP_LEVEL, EXPERTISE] {
        let report = contingency::contingency(&frame, "found_bug", grouping, &config).unwrap();
        assert_eq!(report.table.total(), 40.0);
    }

    let description = describe::describe_by_cohort(&frame, "avg_session_time").unwrap();
    assert_eq!(description.overall.unwrap().count, 40);
}

#[test]
fn test_constant_outcome_across_cohorts() {
    let config = AnalysisConfig::default();
    let dataset = with_outcome(
        synth::generate(&SynthConfig::default(), 5),
        "score",
        &[1.0; 40],
    );
    let data = StudyData::load(&dataset, &config).unwrap();
    let frame = Frame::from_study(&data).unwrap();

    let comparison = comparison::compare_groups(&frame, "score", &config).unwrap();
    assert_eq!(
        comparison.anova.estimate.reason(),
        Some(UndefinedReason::ZeroWithinGroupVariance)
    );
    let normality = comparison.normality.estimate.defined().unwrap();
    assert_eq!(normality.p_value, 1.0);
    assert!(!comparison.normality.violated);
    assert!(comparison.caveats.is_empty());

    let correlation = correlation::correlate(&frame, "programming_xp", "score", None).unwrap();
    assert_eq!(
        correlation.estimate.reason(),
        Some(UndefinedReason::ConstantInput)
    );
}

#[test]
fn test_missing_outcome_is_reported() {
    let config = AnalysisConfig::default();
    let dataset = with_outcome(
        synth::generate(&SynthConfig::default(), 9),
        "score",
        &[2.0; 39],
    );
    let data = StudyData::load(&dataset, &config).unwrap();
    let err = Frame::from_study(&data).unwrap_err();
    assert_eq!(
        err.to_string(),
        "participant 40 has no value for 'score'"
    );
}
