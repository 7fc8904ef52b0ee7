//! Model builder: game log and player universe to factor graph

use crate::config::{ModelConfig, UnknownPlayerPolicy};
use crate::error::{RatingError, Result};
use crate::model::graph::{GameFactor, SkillModel, Term, VariableId};
use crate::model::universe::{PlayerUniverse, CATCH_ALL_INDEX};
use crate::types::{GameRecord, PlayerIndex, Team};
use tracing::{debug, info};

/// `sqrt(1/|good| + 1/|evil|)`: rescales the difference of team averages as if
/// performances were summed per player
pub fn noise_factor(good_size: usize, evil_size: usize) -> f64 {
    (1.0 / good_size as f64 + 1.0 / evil_size as f64).sqrt()
}

/// Team-average factor: each distinct member weighted by its share of the roster
#[derive(Debug, Clone, PartialEq)]
pub struct TeamAverage {
    size: usize,
    members: Vec<(PlayerIndex, usize)>,
}

impl TeamAverage {
    pub fn new(roster: &[PlayerIndex]) -> Self {
        let mut members: Vec<(PlayerIndex, usize)> = Vec::new();
        for &player in roster {
            match members.iter_mut().find(|(index, _)| *index == player) {
                Some((_, count)) => *count += 1,
                None => members.push((player, 1)),
            }
        }
        Self {
            size: roster.len(),
            members,
        }
    }

    /// Distinct members with their number of roster slots
    pub fn members(&self) -> &[(PlayerIndex, usize)] {
        &self.members
    }

    /// Weight of one roster slot in the average
    pub fn slot_weight(&self) -> f64 {
        1.0 / self.size as f64
    }
}

/// Builds [`SkillModel`]s from game logs under a fixed [`ModelConfig`]
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    config: ModelConfig,
}

impl ModelBuilder {
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Derive the player universe from the log and build the model
    pub fn build(&self, games: &[GameRecord]) -> Result<SkillModel> {
        let universe = PlayerUniverse::from_games(
            games,
            &self.config.catch_all_name,
            self.config.min_appearances,
        );
        self.build_with_universe(games, universe)
    }

    /// Build against an existing universe; names outside it resolve to the catch-all
    pub fn build_with_universe(
        &self,
        games: &[GameRecord],
        universe: PlayerUniverse,
    ) -> Result<SkillModel> {
        let factors = games
            .iter()
            .enumerate()
            .map(|(index, record)| self.build_game(index, record, &universe))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Built model: {} players, {} games, unknown players {}",
            universe.len(),
            factors.len(),
            self.config.unknown_player_policy
        );

        Ok(SkillModel::new(self.config.clone(), universe, factors))
    }

    fn build_game(
        &self,
        index: usize,
        record: &GameRecord,
        universe: &PlayerUniverse,
    ) -> Result<GameFactor> {
        if record.good.is_empty() {
            return Err(
                RatingError::invalid_game(index, &record.storyteller, "good team is empty").into(),
            );
        }
        if record.evil.is_empty() {
            return Err(
                RatingError::invalid_game(index, &record.storyteller, "evil team is empty").into(),
            );
        }
        let winner = Team::parse(&record.winner).ok_or_else(|| {
            RatingError::invalid_game(
                index,
                &record.storyteller,
                format!("unknown winner label {:?}", record.winner),
            )
        })?;

        let resolve = |roster: &[String]| -> Vec<PlayerIndex> {
            roster.iter().map(|name| universe.resolve(name)).collect()
        };
        let good = resolve(&record.good);
        let evil = resolve(&record.evil);
        let noise_factor = noise_factor(good.len(), evil.len());

        let mut terms: Vec<Term> = Vec::new();
        let mut offset = 0.0;
        let mut marginalised_variance = 0.0;

        for (roster, sign) in [(&good, 1.0), (&evil, -1.0)] {
            let average = TeamAverage::new(roster);
            let slot_weight = sign * noise_factor * average.slot_weight();

            for &(player, count) in average.members() {
                if player != CATCH_ALL_INDEX {
                    add_term(&mut terms, VariableId::Skill(player), slot_weight * count as f64);
                    continue;
                }
                match self.config.unknown_player_policy {
                    UnknownPlayerPolicy::Shared => {
                        add_term(&mut terms, VariableId::Skill(player), slot_weight * count as f64)
                    }
                    UnknownPlayerPolicy::FixedZero => {}
                    UnknownPlayerPolicy::Independent => {
                        offset += slot_weight * count as f64 * self.config.skill_prior_mean;
                        marginalised_variance += slot_weight
                            * slot_weight
                            * count as f64
                            * self.config.skill_prior_variance;
                    }
                }
            }
        }
        add_term(&mut terms, VariableId::Bias, noise_factor);

        // A player on both sides with equal weight cancels out of the difference
        terms.retain(|term| term.weight != 0.0);

        debug!(
            "Game {}: {} vs {}, {} terms, winner {}",
            index,
            good.len(),
            evil.len(),
            terms.len(),
            winner
        );

        Ok(GameFactor {
            index,
            storyteller: record.storyteller.clone(),
            edition: record.edition.clone(),
            good,
            evil,
            winner,
            noise_factor,
            terms,
            offset,
            marginalised_variance,
        })
    }
}

fn add_term(terms: &mut Vec<Term>, variable: VariableId, weight: f64) {
    match terms.iter_mut().find(|term| term.variable == variable) {
        Some(term) => term.weight += weight,
        None => terms.push(Term { variable, weight }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(policy: UnknownPlayerPolicy) -> ModelBuilder {
        ModelBuilder::new(ModelConfig {
            unknown_player_policy: policy,
            ..ModelConfig::default()
        })
        .unwrap()
    }

    fn weight_of(game: &GameFactor, variable: VariableId) -> Option<f64> {
        game.terms
            .iter()
            .find(|term| term.variable == variable)
            .map(|term| term.weight)
    }

    #[test]
    fn test_noise_factor() {
        assert_eq!(noise_factor(1, 1), 2.0f64.sqrt());
        assert_eq!(noise_factor(5, 3), (1.0 / 5.0 + 1.0 / 3.0f64).sqrt());
    }

    #[test]
    fn test_team_average_merges_repeats() {
        let average = TeamAverage::new(&[3, 0, 3, 0, 1]);
        assert_eq!(average.members(), [(3, 2), (0, 2), (1, 1)]);
        assert_eq!(average.slot_weight(), 0.2);
    }

    #[test]
    fn test_build_weights() {
        let games = vec![GameRecord::new("st", &["a", "b"], &["c"], Team::Good)];
        let model = builder(UnknownPlayerPolicy::Shared).build(&games).unwrap();
        let game = &model.games()[0];

        let f = noise_factor(2, 1);
        assert_eq!(game.noise_factor, f);
        assert_eq!(weight_of(game, VariableId::Skill(1)), Some(f / 2.0));
        assert_eq!(weight_of(game, VariableId::Skill(2)), Some(f / 2.0));
        assert_eq!(weight_of(game, VariableId::Skill(3)), Some(-f));
        assert_eq!(weight_of(game, VariableId::Bias), Some(f));
        assert!(game.outcome());
        assert_eq!(game.offset, 0.0);
    }

    #[test]
    fn test_empty_team_rejected_with_game_named() {
        let games = vec![
            GameRecord::new("st", &["a"], &["b"], Team::Good),
            GameRecord::new("sarah", &["a"], &[], Team::Evil),
        ];
        let err = builder(UnknownPlayerPolicy::Shared).build(&games).unwrap_err();
        match err.downcast_ref::<RatingError>() {
            Some(RatingError::InvalidGame {
                game, storyteller, ..
            }) => {
                assert_eq!(*game, 1);
                assert_eq!(storyteller, "sarah");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_winner_rejected() {
        let mut record = GameRecord::new("st", &["a"], &["b"], Team::Good);
        record.winner = "draw".to_string();
        assert!(builder(UnknownPlayerPolicy::Shared).build(&[record]).is_err());
    }

    #[test]
    fn test_unknown_resolves_to_catch_all() {
        let train = vec![GameRecord::new("st", &["a"], &["b"], Team::Good)];
        let universe = PlayerUniverse::from_games(&train, "other", 1);
        let test = vec![GameRecord::new("st", &["a", "zed"], &["b"], Team::Evil)];

        let model = builder(UnknownPlayerPolicy::Shared)
            .build_with_universe(&test, universe)
            .unwrap();
        assert_eq!(model.games()[0].good, vec![1, CATCH_ALL_INDEX]);
        assert!(weight_of(&model.games()[0], VariableId::Skill(CATCH_ALL_INDEX)).is_some());
    }

    #[test]
    fn test_catch_all_cancels_when_on_both_sides() {
        let games = vec![GameRecord::new("st", &["other"], &["other"], Team::Good)];
        let model = builder(UnknownPlayerPolicy::Shared).build(&games).unwrap();
        let game = &model.games()[0];
        assert_eq!(game.terms.len(), 1);
        assert_eq!(game.terms[0].variable, VariableId::Bias);
    }

    #[test]
    fn test_fixed_zero_policy_drops_catch_all() {
        let games = vec![GameRecord::new("st", &["a", "other"], &["b"], Team::Good)];
        let model = builder(UnknownPlayerPolicy::FixedZero).build(&games).unwrap();
        let game = &model.games()[0];
        assert!(weight_of(game, VariableId::Skill(CATCH_ALL_INDEX)).is_none());
        assert_eq!(game.marginalised_variance, 0.0);
        assert_eq!(model.prior(VariableId::Skill(CATCH_ALL_INDEX)).message().mean(), 0.0);
    }

    #[test]
    fn test_independent_policy_marginalises_each_appearance() {
        let games = vec![GameRecord::new("st", &["other", "other"], &["b"], Team::Good)];
        let model = builder(UnknownPlayerPolicy::Independent).build(&games).unwrap();
        let game = &model.games()[0];
        let f = noise_factor(2, 1);

        assert!(weight_of(game, VariableId::Skill(CATCH_ALL_INDEX)).is_none());
        // Two independent draws, each weighted f/2 with unit prior variance
        let expected = 2.0 * (f / 2.0) * (f / 2.0);
        assert!((game.marginalised_variance - expected).abs() < 1e-12);
        assert_eq!(game.offset, 0.0);
    }

    #[test]
    fn test_slots() {
        let games = vec![GameRecord::new("st", &["a"], &["b"], Team::Good)];
        let model = builder(UnknownPlayerPolicy::Shared).build(&games).unwrap();
        assert_eq!(model.num_variables(), 4);
        assert_eq!(model.slot(VariableId::Bias), 3);
        assert_eq!(model.variable_at(3), VariableId::Bias);
        assert_eq!(model.variable_at(2), VariableId::Skill(2));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ModelConfig {
            noise_variance: -1.0,
            ..ModelConfig::default()
        };
        assert!(ModelBuilder::new(config).is_err());
    }
}
