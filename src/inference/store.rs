//! Belief store: current marginals and the last message on every factor edge

use crate::inference::distributions::{Bernoulli, Gaussian};
use crate::model::SkillModel;

/// Mutable inference state for one [`SkillModel`]
///
/// Real variables are addressed by the model's dense slots (skills then bias).
/// Game edges are addressed by `(game, term)`, aligned with
/// [`GameFactor::terms`](crate::model::GameFactor).
#[derive(Debug, Clone)]
pub struct BeliefStore {
    beliefs: Vec<Gaussian>,
    messages: Vec<Vec<Gaussian>>,
    performances: Vec<Gaussian>,
    predictions: Vec<Bernoulli>,
    bias_slot: usize,
}

impl BeliefStore {
    /// Every belief starts at its prior, every edge message flat
    pub fn new(model: &SkillModel) -> Self {
        let beliefs = (0..model.num_variables())
            .map(|slot| model.prior(model.variable_at(slot)).message())
            .collect();
        let messages = model
            .games()
            .iter()
            .map(|game| vec![Gaussian::uniform(); game.terms.len()])
            .collect();

        Self {
            beliefs,
            messages,
            performances: vec![Gaussian::uniform(); model.games().len()],
            predictions: vec![Bernoulli::uniform(); model.games().len()],
            bias_slot: model.num_players(),
        }
    }

    pub fn belief(&self, slot: usize) -> Gaussian {
        self.beliefs[slot]
    }

    pub fn beliefs(&self) -> &[Gaussian] {
        &self.beliefs
    }

    pub fn bias_slot(&self) -> usize {
        self.bias_slot
    }

    pub fn message(&self, game: usize, term: usize) -> Gaussian {
        self.messages[game][term]
    }

    /// Belief of `slot` without the contribution of edge `(game, term)`
    pub fn cavity(&self, slot: usize, game: usize, term: usize) -> Gaussian {
        (self.beliefs[slot] / self.messages[game][term]).clipped()
    }

    /// Swap the message on an edge: compose the new one into the belief and
    /// divide the old one out
    pub fn replace_message(&mut self, slot: usize, game: usize, term: usize, message: Gaussian) {
        let cavity = self.cavity(slot, game, term);
        self.beliefs[slot] = (cavity * message).clipped();
        self.messages[game][term] = message;
    }

    /// Posterior of a game's performance difference
    pub fn performance(&self, game: usize) -> Gaussian {
        self.performances[game]
    }

    pub fn set_performance(&mut self, game: usize, performance: Gaussian) {
        self.performances[game] = performance;
    }

    /// Belief of a game's unclamped prediction node
    pub fn prediction(&self, game: usize) -> Bernoulli {
        self.predictions[game]
    }

    pub fn predictions(&self) -> &[Bernoulli] {
        &self.predictions
    }

    pub fn set_prediction(&mut self, game: usize, prediction: Bernoulli) {
        self.predictions[game] = prediction;
    }
}
