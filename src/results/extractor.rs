//! Result extraction: posteriors to evidence, calibration and ratings

use crate::config::DisplayConfig;
use crate::inference::{Bernoulli, Solution};
use crate::model::SkillModel;
use crate::results::display::DisplayScale;
use crate::results::report::{PlayerRating, PosteriorSummary, RatingReport};
use chrono::Utc;
use std::f64::consts::LN_2;
use tracing::info;

/// Reads a [`Solution`] back against its [`SkillModel`]
#[derive(Debug, Clone, Default)]
pub struct ResultExtractor {
    scale: DisplayScale,
}

impl ResultExtractor {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            scale: DisplayScale::new(config.scale, config.offset),
        }
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    pub fn extract(&self, model: &SkillModel, solution: &Solution) -> RatingReport {
        let outcomes: Vec<bool> = model.games().iter().map(|game| game.outcome()).collect();
        let log_score =
            log_evidence_score(solution.evidence(), solution.evidence_prior(), outcomes.len());

        let universe = model.universe();
        let mut ratings: Vec<PlayerRating> = solution
            .skills()
            .iter()
            .enumerate()
            .map(|(index, skill)| {
                let display = self.scale.apply(*skill);
                PlayerRating {
                    name: universe.name(index).unwrap_or_default().to_string(),
                    rating: display.rating,
                    uncertainty: display.uncertainty,
                    appearances: universe.appearances(index),
                }
            })
            .collect();
        ratings.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| a.name.cmp(&b.name))
        });

        let bias = solution.bias();
        let report = RatingReport {
            generated_at: Utc::now(),
            games: outcomes.len(),
            players: universe.len(),
            evidence_score: log_score.exp(),
            log_evidence_score: log_score,
            log_evidence: solution.log_evidence(),
            evidence_probability: solution.evidence().prob_true(),
            likelihood: likelihood(solution.predictions(), &outcomes),
            accuracy: accuracy(solution.predictions(), &outcomes),
            bias: PosteriorSummary {
                mean: bias.mean(),
                std_dev: bias.std_dev(),
            },
            ratings,
            diagnostics: *solution.diagnostics(),
        };

        info!(
            "Report: evidence {:.4e}, likelihood {:.4}, accuracy {:.4}",
            report.evidence_score, report.likelihood, report.accuracy
        );
        report
    }
}

/// Gate log-odds gained over the prior, measured against `games` fair coin
/// flips: `ln(odds_post / odds_prior) - games * ln 0.5`
pub fn log_evidence_score(posterior: Bernoulli, prior: Bernoulli, games: usize) -> f64 {
    posterior.log_odds() - prior.log_odds() + games as f64 * LN_2
}

/// `exp(mean ln P(recorded outcome))`; 1 for an empty log
pub fn likelihood(predictions: &[Bernoulli], outcomes: &[bool]) -> f64 {
    if outcomes.is_empty() {
        return 1.0;
    }
    let total: f64 = predictions
        .iter()
        .zip(outcomes)
        .map(|(prediction, &outcome)| prediction.log_prob_of(outcome))
        .sum();
    (total / outcomes.len() as f64).exp()
}

/// Fraction of games whose recorded winner got more than even odds; 1 for an
/// empty log
pub fn accuracy(predictions: &[Bernoulli], outcomes: &[bool]) -> f64 {
    if outcomes.is_empty() {
        return 1.0;
    }
    let hits = predictions
        .iter()
        .zip(outcomes)
        .filter(|(prediction, outcome)| prediction.prob_of(**outcome) > 0.5)
        .count();
    hits as f64 / outcomes.len() as f64
}
