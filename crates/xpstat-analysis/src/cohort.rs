//! Experience cohorts
//!
//! Every participant carries exactly one [`ExperienceLevel`] label, so the
//! labels partition the participant set into three disjoint cohorts. Some
//! analyses use a coarser [`ExpertiseGroup`] that folds both novice cohorts
//! into one.
//!
//! Cohort sizes are whatever the data says; nothing here assumes a fixed
//! number of participants per cohort.

use serde::{Deserialize, Serialize};

use crate::{
    dataset::{Participant, ParticipantId},
    error::AnalysisError,
};

/// Three-way experience classification of a participant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum ExperienceLevel {
    #[display("Expert")]
    Expert,
    #[serde(rename = "Python Novice")]
    #[display("Python Novice")]
    PythonNovice,
    #[serde(rename = "True Novice")]
    #[display("True Novice")]
    TrueNovice,
}

impl ExperienceLevel {
    pub const ALL: [Self; 3] = [Self::Expert, Self::PythonNovice, Self::TrueNovice];

    /// Order in which cohorts are drawn in scatter plots.
    pub const PLOT_ORDER: [Self; 3] = [Self::TrueNovice, Self::PythonNovice, Self::Expert];

    fn index(self) -> usize {
        match self {
            Self::Expert => 0,
            Self::PythonNovice => 1,
            Self::TrueNovice => 2,
        }
    }

    /// Binary grouping: anything that is not `Expert` is a novice.
    #[must_use]
    pub fn expertise(self) -> ExpertiseGroup {
        match self {
            Self::Expert => ExpertiseGroup::Expert,
            Self::PythonNovice | Self::TrueNovice => ExpertiseGroup::Novice,
        }
    }
}

/// Two-way experience classification of a participant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum ExpertiseGroup {
    Expert,
    Novice,
}

/// Looks up the cohort of a participant.
#[derive(Debug, Clone)]
pub struct Classifier {
    // indexed by `ParticipantId::index`
    levels: Vec<ExperienceLevel>,
}

impl Classifier {
    /// Builds a classifier from participants ordered by id.
    #[must_use]
    pub fn new(participants: &[Participant]) -> Self {
        let levels = participants.iter().map(|p| p.xp_level).collect();
        Self { levels }
    }

    /// Number of participants known to the classifier.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the experience level of a participant.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParticipant`] if the id is not part of
    /// the study.
    pub fn classify(&self, participant_id: ParticipantId) -> Result<ExperienceLevel, AnalysisError> {
        participant_id
            .0
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
            .copied()
            .ok_or(AnalysisError::InvalidParticipant { participant_id })
    }

    /// Returns the binary expertise group of a participant.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParticipant`] if the id is not part of
    /// the study.
    pub fn classify_binary(
        &self,
        participant_id: ParticipantId,
    ) -> Result<ExpertiseGroup, AnalysisError> {
        self.classify(participant_id).map(ExperienceLevel::expertise)
    }

    /// Splits all known participants into cohorts.
    #[must_use]
    pub fn partition(&self) -> CohortPartition {
        let mut cohorts: [Vec<ParticipantId>; 3] = Default::default();
        for (index, level) in self.levels.iter().enumerate() {
            cohorts[level.index()].push(ParticipantId::from_index(index));
        }
        CohortPartition { cohorts }
    }
}

/// The participant set split by [`ExperienceLevel`].
///
/// Each cohort lists ids in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CohortPartition {
    cohorts: [Vec<ParticipantId>; 3],
}

impl CohortPartition {
    #[must_use]
    pub fn cohort(&self, level: ExperienceLevel) -> &[ParticipantId] {
        &self.cohorts[level.index()]
    }

    /// Iterates over cohorts in [`ExperienceLevel::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ExperienceLevel, &[ParticipantId])> + '_ {
        ExperienceLevel::ALL
            .into_iter()
            .map(|level| (level, self.cohort(level)))
    }

    /// Total number of participants across cohorts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cohorts.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: u32, xp_level: ExperienceLevel) -> Participant {
        Participant {
            participant_id: ParticipantId(id),
            programming_xp: 1.0,
            python_xp: 1.0,
            professional_xp: Some(0.0),
            xp_level,
        }
    }

    fn classifier() -> Classifier {
        use ExperienceLevel::{Expert, PythonNovice, TrueNovice};
        let participants = [Expert, TrueNovice, PythonNovice, Expert, TrueNovice]
            .into_iter()
            .zip(1..)
            .map(|(level, id)| participant(id, level))
            .collect::<Vec<_>>();
        Classifier::new(&participants)
    }

    #[test]
    fn test_classify() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify(ParticipantId(3)).unwrap(),
            ExperienceLevel::PythonNovice
        );
        assert_eq!(
            classifier.classify_binary(ParticipantId(3)).unwrap(),
            ExpertiseGroup::Novice
        );
        assert_eq!(
            classifier.classify_binary(ParticipantId(4)).unwrap(),
            ExpertiseGroup::Expert
        );
    }

    #[test]
    fn test_unknown_participant() {
        let classifier = classifier();
        for id in [0, 6, 99] {
            assert_eq!(
                classifier.classify(ParticipantId(id)),
                Err(AnalysisError::InvalidParticipant {
                    participant_id: ParticipantId(id)
                })
            );
        }
    }

    #[test]
    fn test_partition() {
        let partition = classifier().partition();
        assert_eq!(
            partition.cohort(ExperienceLevel::Expert),
            [ParticipantId(1), ParticipantId(4)]
        );
        assert_eq!(
            partition.cohort(ExperienceLevel::TrueNovice),
            [ParticipantId(2), ParticipantId(5)]
        );
        assert_eq!(partition.cohort(ExperienceLevel::PythonNovice), [ParticipantId(3)]);
        assert_eq!(partition.len(), 5);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(ExperienceLevel::PythonNovice.to_string(), "Python Novice");
        assert_eq!(
            serde_json::to_string(&ExperienceLevel::TrueNovice).unwrap(),
            r#""True Novice""#
        );
        assert_eq!(ExpertiseGroup::Novice.to_string(), "Novice");
    }
}
