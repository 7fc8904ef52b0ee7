//! Error types for the rating engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid game #{game} (storyteller {storyteller:?}): {reason}")]
    InvalidGame {
        game: usize,
        storyteller: String,
        reason: String,
    },

    #[error("Failed to load games from {source_name}: {message}")]
    LoadFailed {
        source_name: String,
        message: String,
    },

    #[error("Numerical failure during inference: {reason}")]
    NumericalFailure { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl RatingError {
    /// Shorthand for a validation failure tied to one game of the log
    pub fn invalid_game(game: usize, storyteller: &str, reason: impl Into<String>) -> Self {
        RatingError::InvalidGame {
            game,
            storyteller: storyteller.to_string(),
            reason: reason.into(),
        }
    }
}
