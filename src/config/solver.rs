//! Solver and display configuration

use serde::{Deserialize, Serialize};

/// Expectation Propagation sweep settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum number of full sweeps over the games
    pub max_iterations: usize,
    /// Convergence threshold on the largest belief change across a sweep
    pub tolerance: f64,
    /// Damping in [0, 1); fraction of the previous message kept on update
    pub damping: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            damping: 0.0,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_iterations == 0 {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "max_iterations must be > 0".to_string(),
            }
            .into());
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "tolerance must be finite and > 0".to_string(),
            }
            .into());
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "damping must be in [0, 1)".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Presentation scale for skill ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub scale: f64,
    pub offset: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: 15.0,
            offset: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_config_validation() {
        assert!(SolverConfig::default().validate().is_ok());

        let mut config = SolverConfig::default();
        config.max_iterations = 0;
        assert!(config.validate().is_err());

        config = SolverConfig::default();
        config.damping = 1.0;
        assert!(config.validate().is_err());

        config = SolverConfig::default();
        config.tolerance = -1.0;
        assert!(config.validate().is_err());
    }
}
