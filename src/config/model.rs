//! Model configuration: the fixed constants of the skill model

use serde::{Deserialize, Serialize};

/// How roster entries outside the trained universe enter the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownPlayerPolicy {
    /// All unknown players share one learned catch-all skill
    #[default]
    Shared,
    /// The catch-all skill is pinned to zero and contributes nothing
    FixedZero,
    /// Every unknown appearance is an independent draw from the skill prior
    Independent,
}

impl UnknownPlayerPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "shared" => Some(Self::Shared),
            "fixed-zero" | "fixed_zero" | "zero" => Some(Self::FixedZero),
            "independent" => Some(Self::Independent),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnknownPlayerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::FixedZero => write!(f, "fixed-zero"),
            Self::Independent => write!(f, "independent"),
        }
    }
}

/// Priors and noise of the good-vs-evil performance model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Variance of the per-game performance noise
    pub noise_variance: f64,
    pub skill_prior_mean: f64,
    pub skill_prior_variance: f64,
    pub bias_prior_mean: f64,
    pub bias_prior_variance: f64,
    /// Prior probability that the model (rather than nothing) explains the log
    pub evidence_prior: f64,
    pub unknown_player_policy: UnknownPlayerPolicy,
    /// Name of the catch-all player at index 0
    pub catch_all_name: String,
    /// Players with fewer roster appearances fold into the catch-all
    pub min_appearances: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            noise_variance: 3.23,
            skill_prior_mean: 0.0,
            skill_prior_variance: 1.0,
            bias_prior_mean: 0.0,
            bias_prior_variance: 1.0,
            evidence_prior: 0.5,
            unknown_player_policy: UnknownPlayerPolicy::Shared,
            catch_all_name: "other".to_string(),
            min_appearances: 1,
        }
    }
}

impl ModelConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        let positive = [
            ("Noise variance", self.noise_variance),
            ("Skill prior variance", self.skill_prior_variance),
            ("Bias prior variance", self.bias_prior_variance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(crate::error::RatingError::ConfigurationError {
                    message: format!("{} must be positive and finite", name),
                }
                .into());
            }
        }

        if !(self.skill_prior_mean.is_finite() && self.bias_prior_mean.is_finite()) {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "Prior means must be finite".to_string(),
            }
            .into());
        }

        if !(self.evidence_prior > 0.0 && self.evidence_prior < 1.0) {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "Evidence prior must be strictly between 0 and 1".to_string(),
            }
            .into());
        }

        if self.catch_all_name.is_empty() {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "Catch-all player name cannot be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
