//! Rating report types and their plain-text rendering

use crate::inference::SolverDiagnostics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean and standard deviation of a raw posterior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSummary {
    pub mean: f64,
    pub std_dev: f64,
}

/// One row of the rating table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub name: String,
    /// Display-scale posterior mean
    pub rating: f64,
    /// Display-scale posterior standard deviation
    pub uncertainty: f64,
    /// Roster appearances attributed to this entry
    pub appearances: usize,
}

/// Everything a run reports about a game log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingReport {
    pub generated_at: DateTime<Utc>,
    pub games: usize,
    pub players: usize,
    /// Bayes factor of the model against a coin flip per game
    pub evidence_score: f64,
    /// `ln` of `evidence_score`, finite even when the score overflows
    pub log_evidence_score: f64,
    /// `ln p(outcomes | model)`
    pub log_evidence: f64,
    /// Posterior probability of the evidence gate
    pub evidence_probability: f64,
    /// Geometric mean of the predicted probability of each recorded winner
    pub likelihood: f64,
    /// Fraction of games whose recorded winner was predicted with p > 0.5
    pub accuracy: f64,
    pub bias: PosteriorSummary,
    /// Descending by rating
    pub ratings: Vec<PlayerRating>,
    pub diagnostics: SolverDiagnostics,
}

impl RatingReport {
    pub fn rating_of(&self, name: &str) -> Option<&PlayerRating> {
        self.ratings.iter().find(|rating| rating.name == name)
    }

    /// Position of a player in the table, 0 being the highest rated
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.ratings.iter().position(|rating| rating.name == name)
    }
}

impl fmt::Display for RatingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evidence: {}", self.evidence_score)?;
        writeln!(f, "Likelihood: {:.4}", self.likelihood)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(
            f,
            "Bias: Gaussian({:.4}, {:.4})",
            self.bias.mean,
            self.bias.std_dev * self.bias.std_dev
        )?;
        if !self.diagnostics.converged {
            writeln!(
                f,
                "Warning: not converged after {} iterations",
                self.diagnostics.iterations
            )?;
        }
        writeln!(f)?;
        for rating in &self.ratings {
            writeln!(
                f,
                "{}: {:.1} ± {:.1}",
                rating.name, rating.rating, rating.uncertainty
            )?;
        }
        Ok(())
    }
}
