//! Main application configuration
//!
//! This module defines the primary configuration structures for the grimoire
//! rating tool, including file and environment variable loading and validation.

use crate::config::model::{ModelConfig, UnknownPlayerPolicy};
use crate::config::solver::{DisplayConfig, SolverConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub model: ModelConfig,
    pub solver: SolverConfig,
    pub display: DisplayConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in logs
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "grimoire".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Model settings
        if let Ok(noise) = env::var("NOISE_VARIANCE") {
            self.model.noise_variance = noise
                .parse()
                .map_err(|_| anyhow!("Invalid NOISE_VARIANCE value: {}", noise))?;
        }
        if let Ok(variance) = env::var("SKILL_PRIOR_VARIANCE") {
            self.model.skill_prior_variance = variance
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_PRIOR_VARIANCE value: {}", variance))?;
        }
        if let Ok(prior) = env::var("EVIDENCE_PRIOR") {
            self.model.evidence_prior = prior
                .parse()
                .map_err(|_| anyhow!("Invalid EVIDENCE_PRIOR value: {}", prior))?;
        }
        if let Ok(policy) = env::var("UNKNOWN_PLAYER_POLICY") {
            self.model.unknown_player_policy = UnknownPlayerPolicy::parse(&policy)
                .ok_or_else(|| anyhow!("Invalid UNKNOWN_PLAYER_POLICY value: {}", policy))?;
        }
        if let Ok(min) = env::var("MIN_APPEARANCES") {
            self.model.min_appearances = min
                .parse()
                .map_err(|_| anyhow!("Invalid MIN_APPEARANCES value: {}", min))?;
        }

        // Solver settings
        if let Ok(iterations) = env::var("MAX_ITERATIONS") {
            self.solver.max_iterations = iterations
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_ITERATIONS value: {}", iterations))?;
        }
        if let Ok(tolerance) = env::var("CONVERGENCE_TOLERANCE") {
            self.solver.tolerance = tolerance
                .parse()
                .map_err(|_| anyhow!("Invalid CONVERGENCE_TOLERANCE value: {}", tolerance))?;
        }
        if let Ok(damping) = env::var("DAMPING") {
            self.solver.damping = damping
                .parse()
                .map_err(|_| anyhow!("Invalid DAMPING value: {}", damping))?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.model.validate()?;
    config.solver.validate()?;

    if !(config.display.scale.is_finite() && config.display.scale > 0.0) {
        return Err(anyhow!("Display scale must be positive"));
    }
    if !config.display.offset.is_finite() {
        return Err(anyhow!("Display offset must be finite"));
    }

    Ok(())
}
