//! Analysis parameters
//!
//! [`AnalysisConfig`] collects the knobs that were fixed constants in the
//! first version of the study scripts. Every field has a serde default, so a
//! config file may set any subset:
//!
//! ```json
//! { "professional_limit": 20, "alpha": 0.01 }
//! ```

use serde::{Deserialize, Serialize};

use crate::dataset::ParticipantId;

/// Parameters shared by the analysis engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Participants with an id up to this value answered the professional
    /// experience question.
    pub professional_limit: u32,
    /// Significance level for the normality and homogeneity checks.
    pub alpha: f64,
    /// Expected cell frequency below which chi-square results are flagged.
    pub min_expected_frequency: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            professional_limit: 20,
            alpha: 0.05,
            min_expected_frequency: 5.0,
        }
    }
}

impl AnalysisConfig {
    /// Returns `true` if the participant's professional experience is usable.
    #[must_use]
    pub fn has_professional_xp(&self, participant_id: ParticipantId) -> bool {
        participant_id.0 <= self.professional_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"alpha": 0.01}"#).unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.professional_limit, 20);
        assert_eq!(config.min_expected_frequency, 5.0);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(serde_json::from_str::<AnalysisConfig>(r#"{"alhpa": 0.01}"#).is_err());
    }

    #[test]
    fn test_professional_boundary_is_inclusive() {
        let config = AnalysisConfig::default();
        assert!(config.has_professional_xp(ParticipantId(20)));
        assert!(!config.has_professional_xp(ParticipantId(21)));
    }
}
