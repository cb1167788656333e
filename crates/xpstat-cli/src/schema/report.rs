use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use xpstat_analysis::{
    cohort::ExperienceLevel, comparison::GroupComparison, config::AnalysisConfig,
    contingency::ContingencyReport, correlation::CorrelationReport, describe::VariableDescription,
    study::StimulusSummary,
};

/// Every analysis of one dataset, as written by the `report` command
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub dataset: PathBuf,
    pub config: AnalysisConfig,
    pub cohort_sizes: Vec<CohortSize>,
    pub stimulus_breakdown: Vec<StimulusSummary>,
    pub descriptions: Vec<VariableDescription>,
    pub correlations: Vec<CorrelationReport>,
    pub comparisons: Vec<GroupComparison>,
    pub contingencies: Vec<ContingencyReport>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CohortSize {
    pub cohort: ExperienceLevel,
    pub count: usize,
}
