//! Full JSON report
//!
//! Runs every analysis over the dataset and writes the results as one JSON
//! document. Outcome variables default to every outcome in the dataset, split
//! by column kind.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Args;
use xpstat_analysis::{
    comparison,
    config::AnalysisConfig,
    contingency, correlation, describe,
    frame::{ColumnKind, EXPERTISE, XP_LEVEL},
};

use crate::{
    schema::report::{CohortSize, Report},
    util::{self, Output, Study},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Numeric outcomes to analyze (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub outcome: Vec<String>,

    /// Categorical outcomes to cross-tabulate (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub categorical: Vec<String>,

    /// Output file path (default: stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReportArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let study = util::load_study(&arg.dataset, config)?;
    let report = build_report(&study, &arg.dataset, config, &arg.outcome, &arg.categorical)?;
    Output::save_json(&report, arg.output.clone())?;
    if let Some(path) = &arg.output {
        tracing::info!("Report saved to {}", path.display());
    }
    Ok(())
}

fn build_report(
    study: &Study,
    dataset: &Path,
    config: &AnalysisConfig,
    outcomes: &[String],
    categoricals: &[String],
) -> anyhow::Result<Report> {
    let frame = &study.frame;
    let outcomes = select_outcomes(study, outcomes, ColumnKind::Numeric)?;
    let categoricals = select_outcomes(study, categoricals, ColumnKind::Categorical)?;
    tracing::debug!(
        numeric = outcomes.len(),
        categorical = categoricals.len(),
        "building report"
    );

    let cohort_sizes = study
        .data
        .partition()
        .iter()
        .map(|(cohort, ids)| CohortSize {
            cohort,
            count: ids.len(),
        })
        .collect();

    let descriptions = frame
        .numeric_names()
        .map(|name| describe::describe_by_cohort(frame, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut correlations = Vec::new();
    let mut comparisons = Vec::new();
    for outcome in &outcomes {
        correlations.extend(correlation::experience_correlations(
            &study.data,
            frame,
            outcome,
        )?);
        correlations.push(correlation::session_time_correlation(frame, outcome)?);
        comparisons.push(comparison::compare_groups(frame, outcome, config)?);
    }

    let mut contingencies = Vec::new();
    for outcome in &categoricals {
        for grouping in [XP_LEVEL, EXPERTISE] {
            contingencies.push(contingency::contingency(frame, outcome, grouping, config)?);
        }
    }

    Ok(Report {
        generated_at: Utc::now(),
        dataset: dataset.to_path_buf(),
        config: config.clone(),
        cohort_sizes,
        stimulus_breakdown: study.data.stimulus_breakdown(),
        descriptions,
        correlations,
        comparisons,
        contingencies,
    })
}

/// Returns `requested`, or every outcome of `kind` when nothing was requested.
fn select_outcomes(
    study: &Study,
    requested: &[String],
    kind: ColumnKind,
) -> anyhow::Result<Vec<String>> {
    if !requested.is_empty() {
        for name in requested {
            let actual = study.frame.column(name)?.kind();
            anyhow::ensure!(actual == kind, "{name} is {actual}, expected {kind}");
        }
        return Ok(requested.to_vec());
    }
    let mut selected = Vec::new();
    for name in study.data.outcome_variables() {
        if study.frame.column(name)?.kind() == kind {
            selected.push(name.to_owned());
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use xpstat_analysis::{
        frame::Frame,
        study::StudyData,
        synth::{self, SynthConfig},
    };

    use super::*;

    fn synthetic_study(config: &AnalysisConfig) -> Study {
        let dataset = synth::generate(&SynthConfig::default(), 11);
        let data = StudyData::load(&dataset, config).unwrap();
        let frame = Frame::from_study(&data).unwrap();
        Study { data, frame }
    }

    #[test]
    fn test_build_report_defaults_to_all_outcomes() {
        let config = AnalysisConfig::default();
        let study = synthetic_study(&config);
        let report = build_report(&study, Path::new("data.json"), &config, &[], &[]).unwrap();

        assert_eq!(report.cohort_sizes.len(), 3);
        assert_eq!(
            report.cohort_sizes.iter().map(|c| c.count).sum::<usize>(),
            40
        );
        // bugs_fixed: three experience metrics plus session time
        assert_eq!(report.correlations.len(), 4);
        assert_eq!(report.comparisons.len(), 1);
        // found_bug by cohort and by expertise
        assert_eq!(report.contingencies.len(), 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dataset"], "data.json");
        assert_eq!(json["config"]["professional_limit"], 20);
        assert_eq!(json["comparisons"][0]["variable"], "bugs_fixed");
    }

    #[test]
    fn test_build_report_rejects_wrong_kind() {
        let config = AnalysisConfig::default();
        let study = synthetic_study(&config);
        let outcomes = vec!["found_bug".to_owned()];
        let err = build_report(&study, Path::new("data.json"), &config, &outcomes, &[])
            .unwrap_err();
        assert!(err.to_string().contains("expected numeric"));
    }
}
