use xpstat_stats::StatsError;

use crate::{dataset::ParticipantId, frame::ColumnKind};

/// Errors raised while loading or validating study records.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DataError {
    #[display("{table} data unavailable: {reason}")]
    DataUnavailable { table: &'static str, reason: String },
    #[display("participant {participant_id} is not part of the study")]
    InvalidParticipant { participant_id: ParticipantId },
    #[display("invalid {table} record: {reason}")]
    InvalidRecord { table: &'static str, reason: String },
}

/// Errors raised by the analysis engines.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("{_0}")]
    Data(#[error(source)] DataError),
    #[display("statistics for '{variable}' failed: {source}")]
    #[from(ignore)]
    Stats {
        variable: String,
        source: StatsError,
    },
    #[display("'{x}' has {left} values but '{y}' has {right}")]
    #[from(ignore)]
    DimensionMismatch {
        x: String,
        y: String,
        left: usize,
        right: usize,
    },
    #[display("participant {participant_id} is not part of the study")]
    #[from(ignore)]
    InvalidParticipant { participant_id: ParticipantId },
    #[display("'{variable}' has no observations in the {cohort} cohort")]
    #[from(ignore)]
    InsufficientGroupData { variable: String, cohort: String },
    #[display("unknown variable '{name}'")]
    #[from(ignore)]
    UnknownVariable { name: String },
    #[display("variable '{name}' is not {expected}")]
    #[from(ignore)]
    WrongColumnKind { name: String, expected: ColumnKind },
    #[display("participant {participant_id} has no value for '{variable}'")]
    #[from(ignore)]
    MissingOutcome {
        variable: String,
        participant_id: ParticipantId,
    },
    #[display("variable '{variable}' mixes numeric and categorical values")]
    #[from(ignore)]
    MixedOutcome { variable: String },
    #[display("outcome '{name}' collides with a built-in column")]
    #[from(ignore)]
    ReservedVariable { name: String },
}

impl AnalysisError {
    pub(crate) fn stats(variable: impl Into<String>) -> impl FnOnce(StatsError) -> Self {
        let variable = variable.into();
        move |source| Self::Stats { variable, source }
    }
}
