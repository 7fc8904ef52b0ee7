//! The immutable factor graph handed to the solver

use crate::config::{ModelConfig, UnknownPlayerPolicy};
use crate::inference::factors::{EvidenceGate, GaussianNoise, PriorFactor};
use crate::model::universe::{PlayerUniverse, CATCH_ALL_INDEX};
use crate::types::{PlayerIndex, Team};

/// A real-valued latent variable of the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableId {
    Skill(PlayerIndex),
    Bias,
}

/// One weighted term of a game's linear performance predictor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub variable: VariableId,
    pub weight: f64,
}

/// Factor chain for one game: team averages, difference, noise, outcome and
/// prediction thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFactor {
    /// Position in the game log
    pub index: usize,
    pub storyteller: String,
    pub edition: String,
    /// Resolved rosters, in log order
    pub good: Vec<PlayerIndex>,
    pub evil: Vec<PlayerIndex>,
    pub winner: Team,
    /// `sqrt(1/|good| + 1/|evil|)`
    pub noise_factor: f64,
    /// Distinct variables feeding the performance difference, with their
    /// composed team-average and difference weights
    pub terms: Vec<Term>,
    /// Constant part of the performance difference
    pub offset: f64,
    /// Variance of integrated-out unknown appearances
    pub marginalised_variance: f64,
}

impl GameFactor {
    /// Whether the good team won, i.e. the clamped value of the outcome node
    pub fn outcome(&self) -> bool {
        self.winner == Team::Good
    }
}

/// The complete latent-variable model for one game log
#[derive(Debug, Clone)]
pub struct SkillModel {
    config: ModelConfig,
    universe: PlayerUniverse,
    games: Vec<GameFactor>,
}

impl SkillModel {
    pub(crate) fn new(
        config: ModelConfig,
        universe: PlayerUniverse,
        games: Vec<GameFactor>,
    ) -> Self {
        Self {
            config,
            universe,
            games,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn universe(&self) -> &PlayerUniverse {
        &self.universe
    }

    pub fn games(&self) -> &[GameFactor] {
        &self.games
    }

    pub fn num_players(&self) -> usize {
        self.universe.len()
    }

    /// Skills plus the bias
    pub fn num_variables(&self) -> usize {
        self.universe.len() + 1
    }

    /// Dense slot of a variable in the belief store
    pub fn slot(&self, variable: VariableId) -> usize {
        match variable {
            VariableId::Skill(index) => index,
            VariableId::Bias => self.universe.len(),
        }
    }

    pub fn variable_at(&self, slot: usize) -> VariableId {
        if slot == self.universe.len() {
            VariableId::Bias
        } else {
            VariableId::Skill(slot)
        }
    }

    /// Prior factor of a variable. A catch-all pinned at zero gets a point mass.
    pub fn prior(&self, variable: VariableId) -> PriorFactor {
        match variable {
            VariableId::Bias => {
                PriorFactor::new(self.config.bias_prior_mean, self.config.bias_prior_variance)
            }
            VariableId::Skill(CATCH_ALL_INDEX)
                if self.config.unknown_player_policy == UnknownPlayerPolicy::FixedZero =>
            {
                PriorFactor::new(0.0, 0.0)
            }
            VariableId::Skill(_) => PriorFactor::new(
                self.config.skill_prior_mean,
                self.config.skill_prior_variance,
            ),
        }
    }

    pub fn performance_noise(&self) -> GaussianNoise {
        GaussianNoise::new(self.config.noise_variance)
    }

    pub fn evidence_gate(&self) -> EvidenceGate {
        EvidenceGate::new(self.config.evidence_prior)
    }
}
