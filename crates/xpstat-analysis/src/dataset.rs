//! Study records as stored in the experiment database
//!
//! This module defines the record shapes the analysis reads: participants,
//! debugging sessions, stimuli, and per-participant outcome measures.
//!
//! # Data Structure
//!
//! ```text
//! Dataset
//! ├─ participants: Vec<Participant>   (id, experience in years, xp_level)
//! ├─ sessions: Vec<Session>           (participant, stimulus, total_time)
//! ├─ stimuli: Vec<Stimulus>           (id, error_type)
//! └─ outcomes: Vec<OutcomeRecord>     (participant, variable, value)
//! ```
//!
//! # Serialization
//!
//! All types implement `serde` traits. A dataset file looks like:
//!
//! ```json
//! {
//!   "participants": [
//!     {"participant_id": 1, "programming_xp": 12.0, "python_xp": 6.0,
//!      "professional_xp": 8.0, "xp_level": "Expert"}
//!   ],
//!   "sessions": [{"participant_id": 1, "stimuli_id": 1, "total_time": 143.2}],
//!   "stimuli": [{"stimuli_id": 1, "error_type": "off-by-one"}],
//!   "outcomes": [{"participant_id": 1, "variable": "found_bug", "value": "yes"}]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::cohort::ExperienceLevel;

/// Participant identifier, 1-based and contiguous within a study.
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
    derive_more::From,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// Zero-based row index of this participant in id-aligned columns.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Participant id for a zero-based row index.
    ///
    /// # Panics
    ///
    /// Panics if `index + 1` does not fit in a `u32`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index + 1).expect("participant index out of range"))
    }
}

/// Stimulus (debugging task) identifier.
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
#[serde(transparent)]
pub struct StimulusId(pub u32);

/// A study participant and their self-reported experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: ParticipantId,
    /// Years of programming experience
    pub programming_xp: f64,
    /// Years of Python experience
    pub python_xp: f64,
    /// Years of professional development experience
    ///
    /// Only collected for participants inside the professional boundary;
    /// `null` or absent elsewhere.
    #[serde(default)]
    pub professional_xp: Option<f64>,
    pub xp_level: ExperienceLevel,
}

/// One participant working on one stimulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub participant_id: ParticipantId,
    pub stimuli_id: StimulusId,
    /// Session duration in seconds
    pub total_time: f64,
}

/// A debugging task shown to participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stimulus {
    pub stimuli_id: StimulusId,
    /// Kind of error planted in the stimulus
    pub error_type: String,
}

/// A measured value of an outcome variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(untagged)]
pub enum OutcomeValue {
    Number(f64),
    Label(String),
}

/// One outcome measurement for one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub participant_id: ParticipantId,
    pub variable: String,
    pub value: OutcomeValue,
}

/// A complete in-memory snapshot of the study tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub participants: Vec<Participant>,
    pub sessions: Vec<Session>,
    pub stimuli: Vec<Stimulus>,
    #[serde(default)]
    pub outcomes: Vec<OutcomeRecord>,
}
