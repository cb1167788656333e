//! Participant-aligned analysis columns
//!
//! A [`Frame`] is a small column store with one row per participant (row `i`
//! belongs to participant `i + 1`). The engines address variables by name, so
//! built-in attributes and outcome measures are looked up the same way.
//!
//! # Columns
//!
//! | name               | kind        | source                                |
//! |--------------------|-------------|---------------------------------------|
//! | `participant_id`   | numeric     | participant record                    |
//! | `programming_xp`   | numeric     | participant record                    |
//! | `python_xp`        | numeric     | participant record                    |
//! | `professional_xp`  | numeric     | participant record                    |
//! | `avg_session_time` | numeric     | mean session duration                 |
//! | `xp_level`         | categorical | three-way cohort label                |
//! | `expertise`        | categorical | binary `Expert` / `Novice` grouping   |
//! | *outcome name*     | either      | outcome records with that variable    |

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    cohort::ExperienceLevel,
    dataset::{OutcomeValue, ParticipantId},
    error::AnalysisError,
    study::{ExperienceMetric, StudyData},
};

pub const PARTICIPANT_ID: &str = "participant_id";
pub const AVG_SESSION_TIME: &str = "avg_session_time";
pub const XP_LEVEL: &str = "xp_level";
pub const EXPERTISE: &str = "expertise";

/// Whether a column holds numbers or labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[display("numeric")]
    Numeric,
    #[display("categorical")]
    Categorical,
}

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Categorical(_) => ColumnKind::Categorical,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named columns aligned by participant.
#[derive(Debug, Clone)]
pub struct Frame {
    levels: Vec<ExperienceLevel>,
    columns: BTreeMap<String, Column>,
}

impl Frame {
    /// Builds the built-in columns and one column per outcome variable.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::MixedOutcome`] if an outcome variable has both
    ///   numeric and categorical values
    /// - [`AnalysisError::MissingOutcome`] if a participant has no value for
    ///   an outcome variable
    /// - [`AnalysisError::ReservedVariable`] if an outcome variable has the
    ///   name of a built-in column
    pub fn from_study(data: &StudyData) -> Result<Self, AnalysisError> {
        let mut frame = Self::from_levels(data.participants().iter().map(|p| p.xp_level).collect());
        for metric in ExperienceMetric::ALL {
            let values = data.experience_column(metric);
            frame.columns.insert(metric.column().to_owned(), Column::Numeric(values));
        }
        frame.columns.insert(
            AVG_SESSION_TIME.to_owned(),
            Column::Numeric(data.average_session_times()),
        );

        for variable in data.outcome_variables() {
            if frame.columns.contains_key(variable) {
                return Err(AnalysisError::ReservedVariable {
                    name: variable.to_owned(),
                });
            }
            let column = outcome_column(data, variable)?;
            frame.columns.insert(variable.to_owned(), column);
        }

        tracing::debug!(
            rows = frame.len(),
            columns = frame.columns.len(),
            "built analysis frame"
        );
        Ok(frame)
    }

    /// Builds a frame holding only the id and cohort columns, one row per
    /// entry of `levels`.
    #[must_use]
    pub fn from_levels(levels: Vec<ExperienceLevel>) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(
            PARTICIPANT_ID.to_owned(),
            Column::Numeric(
                (0..levels.len())
                    .map(|index| f64::from(ParticipantId::from_index(index).0))
                    .collect(),
            ),
        );
        columns.insert(
            XP_LEVEL.to_owned(),
            Column::Categorical(levels.iter().map(ToString::to_string).collect()),
        );
        columns.insert(
            EXPERTISE.to_owned(),
            Column::Categorical(
                levels
                    .iter()
                    .map(|level| level.expertise().to_string())
                    .collect(),
            ),
        );
        Self { levels, columns }
    }

    /// Number of rows (participants).
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Cohort label of each row.
    #[must_use]
    pub fn levels(&self) -> &[ExperienceLevel] {
        &self.levels
    }

    /// Column names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Names of the numeric columns, excluding `participant_id`.
    pub fn numeric_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|(name, column)| column.is_numeric() && *name != PARTICIPANT_ID)
            .map(|(name, _)| name.as_str())
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownVariable`] if no such column exists.
    pub fn column(&self, name: &str) -> Result<&Column, AnalysisError> {
        self.columns
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownVariable {
                name: name.to_owned(),
            })
    }

    /// Looks up a numeric column by name.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownVariable`] or
    /// [`AnalysisError::WrongColumnKind`].
    pub fn numeric(&self, name: &str) -> Result<&[f64], AnalysisError> {
        match self.column(name)? {
            Column::Numeric(values) => Ok(values),
            Column::Categorical(_) => Err(AnalysisError::WrongColumnKind {
                name: name.to_owned(),
                expected: ColumnKind::Numeric,
            }),
        }
    }

    /// Looks up a categorical column by name.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownVariable`] or
    /// [`AnalysisError::WrongColumnKind`].
    pub fn categorical(&self, name: &str) -> Result<&[String], AnalysisError> {
        match self.column(name)? {
            Column::Categorical(values) => Ok(values),
            Column::Numeric(_) => Err(AnalysisError::WrongColumnKind {
                name: name.to_owned(),
                expected: ColumnKind::Categorical,
            }),
        }
    }

    /// Adds or replaces a column.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DimensionMismatch`] if the column length
    /// differs from the number of rows.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<(), AnalysisError> {
        let name = name.into();
        if column.len() != self.len() {
            return Err(AnalysisError::DimensionMismatch {
                x: name,
                y: PARTICIPANT_ID.to_owned(),
                left: column.len(),
                right: self.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }
}

fn outcome_column(data: &StudyData, variable: &str) -> Result<Column, AnalysisError> {
    let mut values = vec![None; data.participants().len()];
    for record in data.outcomes().iter().filter(|r| r.variable == variable) {
        values[record.participant_id.index()] = Some(&record.value);
    }

    let missing = |index: usize| AnalysisError::MissingOutcome {
        variable: variable.to_owned(),
        participant_id: ParticipantId::from_index(index),
    };
    let mixed = || AnalysisError::MixedOutcome {
        variable: variable.to_owned(),
    };

    match values.first().copied().flatten() {
        Some(OutcomeValue::Number(_)) => values
            .iter()
            .enumerate()
            .map(|(index, value)| match value {
                Some(OutcomeValue::Number(v)) => Ok(*v),
                Some(OutcomeValue::Label(_)) => Err(mixed()),
                None => Err(missing(index)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Column::Numeric),
        Some(OutcomeValue::Label(_)) => values
            .iter()
            .enumerate()
            .map(|(index, value)| match value {
                Some(OutcomeValue::Label(v)) => Ok(v.clone()),
                Some(OutcomeValue::Number(_)) => Err(mixed()),
                None => Err(missing(index)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Column::Categorical),
        None => Err(missing(0)),
    }
}
