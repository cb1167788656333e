//! Synthetic study data
//!
//! Generates a dataset with the shape of the real study (cohort sizes,
//! professional boundary, one session per participant and stimulus, a numeric
//! and a categorical outcome) for demos and end-to-end tests. Output is fully
//! determined by the seed.
//!
//! # Example
//!
//! ```
//! use xpstat_analysis::synth::{self, SynthConfig};
//!
//! let dataset = synth::generate(&SynthConfig::default(), 42);
//! assert_eq!(dataset.participants.len(), 40);
//! assert_eq!(dataset, synth::generate(&SynthConfig::default(), 42));
//! ```

use rand::{Rng, SeedableRng as _, seq::SliceRandom};
use rand_distr::StandardNormal;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    cohort::ExperienceLevel,
    dataset::{
        Dataset, OutcomeRecord, OutcomeValue, Participant, ParticipantId, Session, Stimulus,
        StimulusId,
    },
};

/// Shape of the generated study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub experts: usize,
    pub python_novices: usize,
    pub true_novices: usize,
    /// Participants above this id get no professional experience.
    pub professional_limit: u32,
    /// Error type of each stimulus, one stimulus per entry.
    pub error_types: Vec<String>,
    /// Name of the numeric outcome (stimuli solved).
    pub numeric_outcome: String,
    /// Name of the categorical outcome (`yes` / `no`).
    pub categorical_outcome: String,
    /// Spread cohorts randomly over ids instead of assigning contiguous id
    /// blocks (Expert, then Python Novice, then True Novice).
    pub shuffle: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            experts: 20,
            python_novices: 9,
            true_novices: 11,
            professional_limit: 20,
            error_types: ["off-by-one", "wrong-operator", "missing-return", "type-mismatch"]
                .map(str::to_owned)
                .to_vec(),
            numeric_outcome: "bugs_fixed".to_owned(),
            categorical_outcome: "found_bug".to_owned(),
            shuffle: false,
        }
    }
}

/// Per-cohort generation parameters.
struct Profile {
    programming: (f64, f64),
    python: (f64, f64),
    professional: (f64, f64),
    session_time: f64,
    solve_rate: f64,
}

impl Profile {
    fn of(level: ExperienceLevel) -> Self {
        match level {
            ExperienceLevel::Expert => Self {
                programming: (10.0, 3.0),
                python: (5.0, 2.0),
                professional: (6.0, 2.5),
                session_time: 120.0,
                solve_rate: 0.8,
            },
            ExperienceLevel::PythonNovice => Self {
                programming: (4.0, 1.5),
                python: (0.5, 0.3),
                professional: (1.0, 0.8),
                session_time: 180.0,
                solve_rate: 0.55,
            },
            ExperienceLevel::TrueNovice => Self {
                programming: (0.8, 0.5),
                python: (0.3, 0.2),
                professional: (0.0, 0.0),
                session_time: 240.0,
                solve_rate: 0.35,
            },
        }
    }
}

/// Draws from `N(mean, sd)`, clamped at zero and rounded to one decimal.
fn years<R>(rng: &mut R, (mean, sd): (f64, f64)) -> f64
where
    R: Rng + ?Sized,
{
    let z: f64 = rng.sample(StandardNormal);
    ((mean + sd * z).max(0.0) * 10.0).round() / 10.0
}

/// Generates a dataset from `config` and `seed`.
#[must_use]
pub fn generate(config: &SynthConfig, seed: u64) -> Dataset {
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut levels = [
        (ExperienceLevel::Expert, config.experts),
        (ExperienceLevel::PythonNovice, config.python_novices),
        (ExperienceLevel::TrueNovice, config.true_novices),
    ]
    .into_iter()
    .flat_map(|(level, count)| std::iter::repeat_n(level, count))
    .collect::<Vec<_>>();
    if config.shuffle {
        levels.shuffle(&mut rng);
    }

    let stimuli = config
        .error_types
        .iter()
        .zip(1..)
        .map(|(error_type, id)| Stimulus {
            stimuli_id: StimulusId(id),
            error_type: error_type.clone(),
        })
        .collect::<Vec<_>>();

    let mut dataset = Dataset {
        stimuli,
        ..Dataset::default()
    };
    for (index, level) in levels.into_iter().enumerate() {
        let participant_id = ParticipantId::from_index(index);
        let profile = Profile::of(level);
        let professional_xp = (participant_id.0 <= config.professional_limit)
            .then(|| years(&mut rng, profile.professional));
        dataset.participants.push(Participant {
            participant_id,
            programming_xp: years(&mut rng, profile.programming),
            python_xp: years(&mut rng, profile.python),
            professional_xp,
            xp_level: level,
        });

        let mut solved = 0_u32;
        for stimulus in &dataset.stimuli {
            let z: f64 = rng.sample(StandardNormal);
            let total_time = (profile.session_time * (0.3 * z).exp() * 10.0).round() / 10.0;
            dataset.sessions.push(Session {
                participant_id,
                stimuli_id: stimulus.stimuli_id,
                total_time,
            });
            if rng.random_bool(profile.solve_rate) {
                solved += 1;
            }
        }

        let found = if rng.random_bool(profile.solve_rate) {
            "yes"
        } else {
            "no"
        };
        dataset.outcomes.push(OutcomeRecord {
            participant_id,
            variable: config.numeric_outcome.clone(),
            value: OutcomeValue::Number(f64::from(solved)),
        });
        dataset.outcomes.push(OutcomeRecord {
            participant_id,
            variable: config.categorical_outcome.clone(),
            value: OutcomeValue::Label(found.to_owned()),
        });
    }

    tracing::debug!(
        seed,
        participants = dataset.participants.len(),
        sessions = dataset.sessions.len(),
        "generated synthetic dataset"
    );
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_sizes() {
        let dataset = generate(&SynthConfig::default(), 7);
        let count = |level| {
            dataset
                .participants
                .iter()
                .filter(|p| p.xp_level == level)
                .count()
        };
        assert_eq!(count(ExperienceLevel::Expert), 20);
        assert_eq!(count(ExperienceLevel::PythonNovice), 9);
        assert_eq!(count(ExperienceLevel::TrueNovice), 11);
        assert_eq!(dataset.sessions.len(), 40 * 4);
        assert_eq!(dataset.outcomes.len(), 40 * 2);
    }

    #[test]
    fn test_cohorts_in_contiguous_id_blocks() {
        let config = SynthConfig::default();
        let dataset = generate(&config, 42);
        let levels = dataset
            .participants
            .iter()
            .map(|p| (p.participant_id.0, p.xp_level))
            .collect::<Vec<_>>();
        for (id, level) in levels {
            let expected = match id {
                1..=20 => ExperienceLevel::Expert,
                21..=29 => ExperienceLevel::PythonNovice,
                _ => ExperienceLevel::TrueNovice,
            };
            assert_eq!(level, expected, "participant {id}");
        }
        assert!(
            dataset
                .participants
                .iter()
                .filter(|p| p.participant_id.0 <= config.professional_limit)
                .all(|p| p.xp_level == ExperienceLevel::Expert)
        );
    }

    #[test]
    fn test_shuffle_keeps_cohort_sizes() {
        let config = SynthConfig {
            shuffle: true,
            ..SynthConfig::default()
        };
        let dataset = generate(&config, 42);
        let experts = dataset
            .participants
            .iter()
            .filter(|p| p.xp_level == ExperienceLevel::Expert)
            .count();
        assert_eq!(experts, 20);
        assert_ne!(dataset, generate(&SynthConfig::default(), 42));
    }

    #[test]
    fn test_deterministic_by_seed() {
        let config = SynthConfig::default();
        assert_eq!(generate(&config, 1), generate(&config, 1));
        assert_ne!(generate(&config, 1), generate(&config, 2));
    }

    #[test]
    fn test_values_in_range() {
        let dataset = generate(&SynthConfig::default(), 3);
        for participant in &dataset.participants {
            assert!(participant.programming_xp >= 0.0);
            assert!(participant.python_xp >= 0.0);
            if participant.participant_id.0 > 20 {
                assert_eq!(participant.professional_xp, None);
            } else {
                assert!(participant.professional_xp.is_some_and(|v| v >= 0.0));
            }
        }
        assert!(dataset.sessions.iter().all(|s| s.total_time > 0.0));
        for outcome in dataset.outcomes.iter().filter(|o| o.variable == "bugs_fixed") {
            let OutcomeValue::Number(v) = outcome.value else {
                panic!("bugs_fixed must be numeric");
            };
            assert!((0.0..=4.0).contains(&v));
        }
    }
}
