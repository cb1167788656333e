//! Loading and validating a study snapshot
//!
//! [`StudyData::load`] pulls every table from a [`DataSource`] once, checks
//! that the tables agree with each other, and keeps the records in memory for
//! the rest of the run.
//!
//! # Validation
//!
//! - participants, sessions, and stimuli must be non-empty
//! - participant ids are unique and contiguous from 1
//! - experience values and session durations are finite and non-negative;
//!   professional experience is only checked inside the professional boundary
//! - sessions and outcomes reference known participants, sessions reference
//!   known stimuli
//! - a participant has at most one value per outcome variable

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use xpstat_stats::descriptive::DescriptiveStats;

use crate::{
    cohort::{Classifier, CohortPartition, ExperienceLevel},
    config::AnalysisConfig,
    dataset::{
        Dataset, OutcomeRecord, OutcomeValue, Participant, ParticipantId, Session, Stimulus,
        StimulusId,
    },
    error::DataError,
    source::DataSource,
};

/// Which experience answer to read from a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceMetric {
    #[display("programming_xp")]
    Programming,
    #[display("python_xp")]
    Python,
    #[display("professional_xp")]
    Professional,
}

impl ExperienceMetric {
    pub const ALL: [Self; 3] = [Self::Programming, Self::Python, Self::Professional];

    /// Name of the frame column holding this metric.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Programming => "programming_xp",
            Self::Python => "python_xp",
            Self::Professional => "professional_xp",
        }
    }

    fn value(self, participant: &Participant) -> Option<f64> {
        match self {
            Self::Programming => Some(participant.programming_xp),
            Self::Python => Some(participant.python_xp),
            Self::Professional => participant.professional_xp,
        }
    }
}

/// Session durations for one stimulus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StimulusSummary {
    pub stimuli_id: StimulusId,
    pub error_type: String,
    pub sessions: usize,
    pub mean: f64,
    /// Population standard deviation (`n` denominator)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// A validated, in-memory snapshot of the study.
#[derive(Debug, Clone)]
pub struct StudyData {
    participants: Vec<Participant>,
    sessions: Vec<Session>,
    stimuli: Vec<Stimulus>,
    outcomes: Vec<OutcomeRecord>,
    professional_limit: u32,
}

impl StudyData {
    /// Reads and validates every table of `source`.
    ///
    /// # Errors
    ///
    /// - [`DataError::DataUnavailable`] if a table cannot be read or one of the
    ///   participants, sessions, or stimuli tables is empty
    /// - [`DataError::InvalidParticipant`] if a session or outcome references
    ///   an unknown participant
    /// - [`DataError::InvalidRecord`] for any other consistency violation
    pub fn load<S>(source: &S, config: &AnalysisConfig) -> Result<Self, DataError>
    where
        S: DataSource + ?Sized,
    {
        let Dataset {
            participants,
            sessions,
            stimuli,
            outcomes,
        } = source.snapshot()?;
        let mut participants = non_empty("participants", participants)?;
        let sessions = non_empty("sessions", sessions)?;
        let stimuli = non_empty("stimuli", stimuli)?;

        participants.sort_by_key(|p| p.participant_id);
        validate_participants(&participants, config.professional_limit)?;
        validate_stimuli(&stimuli)?;

        let known = |participant_id: ParticipantId| {
            (1..=participants.len()).contains(&(participant_id.0 as usize))
        };
        validate_sessions(&sessions, &stimuli, known)?;
        validate_outcomes(&outcomes, known)?;

        tracing::debug!(
            participants = participants.len(),
            sessions = sessions.len(),
            stimuli = stimuli.len(),
            outcomes = outcomes.len(),
            "loaded study data"
        );

        Ok(Self {
            participants,
            sessions,
            stimuli,
            outcomes,
            professional_limit: config.professional_limit,
        })
    }

    /// Participants ordered by id.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    #[must_use]
    pub fn stimuli(&self) -> &[Stimulus] {
        &self.stimuli
    }

    #[must_use]
    pub fn outcomes(&self) -> &[OutcomeRecord] {
        &self.outcomes
    }

    #[must_use]
    pub fn professional_limit(&self) -> u32 {
        self.professional_limit
    }

    #[must_use]
    pub fn classifier(&self) -> Classifier {
        Classifier::new(&self.participants)
    }

    #[must_use]
    pub fn partition(&self) -> CohortPartition {
        self.classifier().partition()
    }

    /// Participants labelled with `level`, ordered by id.
    pub fn participants_in(&self, level: ExperienceLevel) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(move |p| p.xp_level == level)
    }

    /// Names of the outcome variables present in the dataset, sorted.
    #[must_use]
    pub fn outcome_variables(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .map(|o| o.variable.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Mean session duration of each participant, indexed by
    /// [`ParticipantId::index`].
    ///
    /// Participants without sessions get `0.0`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_session_times(&self) -> Vec<f64> {
        let mut totals = vec![(0.0, 0_usize); self.participants.len()];
        for session in &self.sessions {
            let (sum, count) = &mut totals[session.participant_id.index()];
            *sum += session.total_time;
            *count += 1;
        }
        totals
            .into_iter()
            .map(|(sum, count)| if count == 0 { 0.0 } else { sum / count as f64 })
            .collect()
    }

    /// Experience values for `metric`.
    ///
    /// Programming and Python experience cover all participants. Professional
    /// experience covers only ids up to the professional boundary.
    #[must_use]
    pub fn experience(&self, metric: ExperienceMetric) -> Vec<(ParticipantId, f64)> {
        self.participants
            .iter()
            .filter(|p| {
                metric != ExperienceMetric::Professional || p.participant_id.0 <= self.professional_limit
            })
            .filter_map(|p| Some((p.participant_id, metric.value(p)?)))
            .collect()
    }

    /// Experience values for every participant, with professional experience
    /// outside the boundary reported as `NaN`.
    pub(crate) fn experience_column(&self, metric: ExperienceMetric) -> Vec<f64> {
        let mut values = vec![f64::NAN; self.participants.len()];
        for (participant_id, value) in self.experience(metric) {
            values[participant_id.index()] = value;
        }
        values
    }

    /// Duration statistics per stimulus, for stimuli with at least one
    /// session, ordered by stimulus id.
    #[must_use]
    pub fn stimulus_breakdown(&self) -> Vec<StimulusSummary> {
        let mut durations = BTreeMap::<StimulusId, Vec<f64>>::new();
        for session in &self.sessions {
            durations
                .entry(session.stimuli_id)
                .or_default()
                .push(session.total_time);
        }

        self.stimuli
            .iter()
            .filter_map(|stimulus| {
                let stats = DescriptiveStats::new(durations.get(&stimulus.stimuli_id)?.iter().copied())?;
                let summary = StimulusSummary {
                    stimuli_id: stimulus.stimuli_id,
                    error_type: stimulus.error_type.clone(),
                    sessions: stats.count,
                    mean: stats.mean,
                    std_dev: stats.population_std_dev,
                    min: stats.min,
                    max: stats.max,
                };
                Some((stimulus.stimuli_id, summary))
            })
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .collect()
    }
}

fn non_empty<T>(table: &'static str, records: Vec<T>) -> Result<Vec<T>, DataError> {
    if records.is_empty() {
        return Err(DataError::DataUnavailable {
            table,
            reason: "no records".to_owned(),
        });
    }
    Ok(records)
}

fn invalid(table: &'static str, reason: String) -> DataError {
    DataError::InvalidRecord { table, reason }
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn validate_participants(sorted: &[Participant], professional_limit: u32) -> Result<(), DataError> {
    for (index, participant) in sorted.iter().enumerate() {
        let id = participant.participant_id;
        if id.0 as usize != index + 1 {
            let reason = if index > 0 && sorted[index - 1].participant_id == id {
                format!("duplicate participant id {id}")
            } else {
                format!(
                    "participant ids must be contiguous from 1, expected {} but found {id}",
                    index + 1
                )
            };
            return Err(invalid("participants", reason));
        }
        for metric in ExperienceMetric::ALL {
            // professional experience is not collected past the boundary
            if metric == ExperienceMetric::Professional && id.0 > professional_limit {
                continue;
            }
            match metric.value(participant) {
                Some(value) if is_valid_amount(value) => {}
                Some(value) => {
                    return Err(invalid(
                        "participants",
                        format!("participant {id} has invalid {metric} {value}"),
                    ));
                }
                None => {
                    return Err(invalid(
                        "participants",
                        format!("participant {id} has no {metric}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_stimuli(stimuli: &[Stimulus]) -> Result<(), DataError> {
    let mut seen = HashSet::new();
    for stimulus in stimuli {
        if !seen.insert(stimulus.stimuli_id) {
            return Err(invalid(
                "stimuli",
                format!("duplicate stimulus id {}", stimulus.stimuli_id),
            ));
        }
    }
    Ok(())
}

fn validate_sessions<F>(sessions: &[Session], stimuli: &[Stimulus], known: F) -> Result<(), DataError>
where
    F: Fn(ParticipantId) -> bool,
{
    let stimulus_ids = stimuli.iter().map(|s| s.stimuli_id).collect::<HashSet<_>>();
    for session in sessions {
        if !known(session.participant_id) {
            return Err(DataError::InvalidParticipant {
                participant_id: session.participant_id,
            });
        }
        if !stimulus_ids.contains(&session.stimuli_id) {
            return Err(invalid(
                "sessions",
                format!("unknown stimulus id {}", session.stimuli_id),
            ));
        }
        if !is_valid_amount(session.total_time) {
            return Err(invalid(
                "sessions",
                format!(
                    "participant {} has invalid duration {} on stimulus {}",
                    session.participant_id, session.total_time, session.stimuli_id
                ),
            ));
        }
    }
    Ok(())
}

fn validate_outcomes<F>(outcomes: &[OutcomeRecord], known: F) -> Result<(), DataError>
where
    F: Fn(ParticipantId) -> bool,
{
    let mut seen = HashSet::new();
    for outcome in outcomes {
        if !known(outcome.participant_id) {
            return Err(DataError::InvalidParticipant {
                participant_id: outcome.participant_id,
            });
        }
        if !seen.insert((outcome.participant_id, outcome.variable.as_str())) {
            return Err(invalid(
                "outcomes",
                format!(
                    "participant {} has more than one value for '{}'",
                    outcome.participant_id, outcome.variable
                ),
            ));
        }
        if let OutcomeValue::Number(value) = outcome.value
            && !value.is_finite()
        {
            return Err(invalid(
                "outcomes",
                format!(
                    "participant {} has non-finite '{}'",
                    outcome.participant_id, outcome.variable
                ),
            ));
        }
    }
    Ok(())
}
