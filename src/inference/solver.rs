//! Expectation Propagation driver
//!
//! One sweep visits every game in log order. For each game the cavities of
//! the players and the bias are pushed forward through the team averages, the
//! difference and the performance noise onto the outcome threshold, which is
//! clamped to the recorded winner. The moment-matched result flows back to
//! every variable. The unclamped prediction node hangs off the same
//! performance difference: it reads the posterior but sends back a flat
//! message, so predictions never leak the observed outcome.
//!
//! After the sweeps have settled the log evidence of the model is assembled
//! from the per-game normalisers and fed through the evidence gate.

use crate::config::SolverConfig;
use crate::error::{RatingError, Result};
use crate::inference::distributions::{Bernoulli, Gaussian};
use crate::inference::factors::{GaussianNoise, Threshold, WeightedSum};
use crate::inference::store::BeliefStore;
use crate::model::{GameFactor, SkillModel, VariableId};
use crate::types::PlayerIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How a solve ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverDiagnostics {
    pub iterations: usize,
    pub max_iterations: usize,
    pub converged: bool,
    /// Largest belief change during the last sweep
    pub final_delta: f64,
}

/// Converged (or last) beliefs and the model evidence
#[derive(Debug, Clone)]
pub struct Solution {
    store: BeliefStore,
    evidence: Bernoulli,
    evidence_prior: Bernoulli,
    log_evidence: f64,
    diagnostics: SolverDiagnostics,
}

impl Solution {
    /// Skill posterior of a player under the active model
    pub fn skill(&self, player: PlayerIndex) -> Gaussian {
        self.store.belief(player)
    }

    pub fn bias(&self) -> Gaussian {
        self.store.belief(self.store.bias_slot())
    }

    /// Skill posteriors indexed like the player universe
    pub fn skills(&self) -> &[Gaussian] {
        &self.store.beliefs()[..self.store.bias_slot()]
    }

    /// Predictive belief of each game's unclamped outcome
    pub fn predictions(&self) -> &[Bernoulli] {
        self.store.predictions()
    }

    pub fn prediction(&self, game: usize) -> Bernoulli {
        self.store.prediction(game)
    }

    /// Posterior of a game's performance difference
    pub fn performance(&self, game: usize) -> Gaussian {
        self.store.performance(game)
    }

    /// Posterior of the evidence gate
    pub fn evidence(&self) -> Bernoulli {
        self.evidence
    }

    pub fn evidence_prior(&self) -> Bernoulli {
        self.evidence_prior
    }

    /// `ln p(outcomes | model)`
    pub fn log_evidence(&self) -> f64 {
        self.log_evidence
    }

    pub fn diagnostics(&self) -> &SolverDiagnostics {
        &self.diagnostics
    }

    /// Skill marginal mixed over the gate: the active posterior weighted by
    /// the gate posterior, the prior otherwise
    pub fn gated_skill(&self, model: &SkillModel, player: PlayerIndex) -> Gaussian {
        let prior = model.prior(VariableId::Skill(player)).message();
        model
            .evidence_gate()
            .blend(self.evidence, self.skill(player), prior)
    }
}

/// Expectation Propagation over a [`SkillModel`]
#[derive(Debug, Clone)]
pub struct EpSolver {
    config: SolverConfig,
}

impl EpSolver {
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run sweeps until the beliefs settle or the iteration cap is hit.
    ///
    /// Hitting the cap is not an error: the last beliefs are returned and the
    /// diagnostics report `converged: false`.
    pub fn solve(&self, model: &SkillModel) -> Result<Solution> {
        let mut store = BeliefStore::new(model);
        let mut diagnostics = SolverDiagnostics {
            iterations: 0,
            max_iterations: self.config.max_iterations,
            converged: model.games().is_empty(),
            final_delta: 0.0,
        };

        info!(
            "Solving: {} players, {} games",
            model.num_players(),
            model.games().len()
        );

        while !diagnostics.converged && diagnostics.iterations < self.config.max_iterations {
            let before = store.beliefs().to_vec();
            for game in model.games() {
                self.update_game(model, &mut store, game);
            }
            diagnostics.iterations += 1;

            let delta = before
                .iter()
                .zip(store.beliefs())
                .map(|(old, new)| old.max_delta(new))
                .fold(0.0, f64::max);
            diagnostics.final_delta = delta;
            diagnostics.converged = delta < self.config.tolerance;

            debug!(
                "Sweep {}: max belief change {:.3e}",
                diagnostics.iterations, delta
            );
        }

        refresh_predictions(model, &mut store);

        if !diagnostics.converged {
            warn!(
                "EP did not converge after {} sweeps (last change {:.3e}), using last beliefs",
                diagnostics.iterations, diagnostics.final_delta
            );
        }

        for (slot, belief) in store.beliefs().iter().enumerate() {
            if !belief.is_proper() {
                return Err(RatingError::NumericalFailure {
                    reason: format!("belief of {:?} is {}", model.variable_at(slot), belief),
                }
                .into());
            }
        }

        let log_evidence = log_evidence(model, &store);
        if !log_evidence.is_finite() {
            return Err(RatingError::NumericalFailure {
                reason: format!("log evidence is {}", log_evidence),
            }
            .into());
        }

        let gate = model.evidence_gate();
        let evidence = gate.posterior(log_evidence, 0.0);

        info!(
            "Solved in {} sweeps: log evidence {:.4}, bias {}",
            diagnostics.iterations,
            log_evidence,
            store.belief(store.bias_slot())
        );

        Ok(Solution {
            store,
            evidence,
            evidence_prior: gate.prior(),
            log_evidence,
            diagnostics,
        })
    }

    fn update_game(&self, model: &SkillModel, store: &mut BeliefStore, game: &GameFactor) {
        let noise = model.performance_noise();
        let unknowns = GaussianNoise::new(game.marginalised_variance);
        let state = GameState::read(model, store, game);

        // Prediction branch: reads the posterior, returns nothing
        let prediction_cavity = noise.forward(state.performance);
        let prediction = Threshold::indicator_message(prediction_cavity);
        let from_prediction =
            noise.backward(Threshold::real_message(prediction_cavity, Bernoulli::uniform()));

        let to_linear = unknowns.backward(state.from_outcome * from_prediction);
        for (k, term) in game.terms.iter().enumerate() {
            let slot = model.slot(term.variable);
            let old = store.message(game.index, k);
            let message = WeightedSum::backward(&state.cavities, game.offset, k, to_linear)
                .damped(old, self.config.damping);
            store.replace_message(slot, game.index, k, message);
        }

        store.set_performance(game.index, state.performance);
        store.set_prediction(game.index, prediction);
    }
}

/// One game's view of the current beliefs
struct GameState {
    cavities: Vec<(f64, Gaussian)>,
    /// Message from the clamped outcome back to the performance difference
    from_outcome: Gaussian,
    performance: Gaussian,
}

impl GameState {
    fn read(model: &SkillModel, store: &BeliefStore, game: &GameFactor) -> Self {
        let noise = model.performance_noise();
        let cavities = game_cavities(model, store, game);
        let linear = WeightedSum::forward(&cavities, game.offset);
        let performance_cavity = GaussianNoise::new(game.marginalised_variance).forward(linear);

        // Outcome branch: clamped to the recorded winner
        let outcome_cavity = noise.forward(performance_cavity);
        let clamp = Threshold::real_message(outcome_cavity, Bernoulli::point(game.outcome()));
        let from_outcome = noise.backward(clamp);

        Self {
            cavities,
            from_outcome,
            performance: performance_cavity * from_outcome,
        }
    }
}

/// Recompute every game's performance and prediction from the final beliefs.
///
/// A sweep records each game's prediction when that game is visited, before
/// later games have moved the shared skills. Messages are left untouched.
fn refresh_predictions(model: &SkillModel, store: &mut BeliefStore) {
    let noise = model.performance_noise();
    for game in model.games() {
        let state = GameState::read(model, store, game);
        let prediction = Threshold::indicator_message(noise.forward(state.performance));
        store.set_performance(game.index, state.performance);
        store.set_prediction(game.index, prediction);
    }
}

/// `(weight, cavity)` for every term of a game
fn game_cavities(
    model: &SkillModel,
    store: &BeliefStore,
    game: &GameFactor,
) -> Vec<(f64, Gaussian)> {
    game.terms
        .iter()
        .enumerate()
        .map(|(k, term)| {
            let slot = model.slot(term.variable);
            (term.weight, store.cavity(slot, game.index, k))
        })
        .collect()
}

/// EP estimate of `ln p(outcomes | model)`
///
/// Each game contributes the log normaliser of its clamped threshold under
/// its cavity, corrected for the overlap between its messages and the final
/// beliefs. The unclamped prediction nodes normalise to one and drop out.
fn log_evidence(model: &SkillModel, store: &BeliefStore) -> f64 {
    let noise = model.performance_noise();
    let mut total = 0.0;

    for game in model.games() {
        let cavities = game_cavities(model, store, game);
        let performance_cavity = GaussianNoise::new(game.marginalised_variance)
            .forward(WeightedSum::forward(&cavities, game.offset));
        let clamped = Threshold::observed(noise.forward(performance_cavity), game.outcome());
        total += clamped.log_normalizer;

        for (term, (_, cavity)) in game.terms.iter().zip(&cavities) {
            let belief = store.belief(model.slot(term.variable));
            total -= belief.log_normalizer() - cavity.log_normalizer();
        }
    }

    for slot in 0..model.num_variables() {
        let prior = model.prior(model.variable_at(slot)).message();
        total += store.belief(slot).log_normalizer() - prior.log_normalizer();
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::model::ModelBuilder;
    use crate::types::{GameRecord, Team};

    fn solve(games: &[GameRecord]) -> (SkillModel, Solution) {
        let model = ModelBuilder::new(ModelConfig::default())
            .unwrap()
            .build(games)
            .unwrap();
        let solution = EpSolver::new(SolverConfig::default())
            .unwrap()
            .solve(&model)
            .unwrap();
        (model, solution)
    }

    #[test]
    fn test_no_games_leaves_priors() {
        let (model, solution) = solve(&[]);
        assert_eq!(model.num_players(), 1);
        assert_eq!(solution.skill(0), Gaussian::from_mean_variance(0.0, 1.0));
        assert_eq!(solution.bias(), Gaussian::from_mean_variance(0.0, 1.0));
        assert_eq!(solution.log_evidence(), 0.0);
        assert_eq!(solution.evidence(), solution.evidence_prior());
        assert!(solution.diagnostics().converged);
        assert_eq!(solution.diagnostics().iterations, 0);
    }

    #[test]
    fn test_single_game_evidence_is_exact() {
        // One game is a single probit factor on a Gaussian: EP is exact there
        let games = vec![GameRecord::new("st", &["a"], &["b"], Team::Good)];
        let (_, solution) = solve(&games);
        assert!(solution.diagnostics().converged);

        // d = f (a - b + bias) + noise has zero prior mean: P(d > 0) = 1/2
        assert!((solution.log_evidence() - 0.5f64.ln()).abs() < 1e-6);

        assert!(solution.skill(1).mean() > 0.0);
        assert!(solution.skill(2).mean() < 0.0);
        assert!(solution.bias().mean() > 0.0);
        assert!(solution.skill(1).variance() < 1.0);
        // The untouched catch-all stays at its prior
        assert_eq!(solution.skill(0), Gaussian::from_mean_variance(0.0, 1.0));
    }

    #[test]
    fn test_prediction_is_not_the_observation() {
        let games = vec![GameRecord::new("st", &["a"], &["b"], Team::Good)];
        let (_, solution) = solve(&games);
        let p = solution.prediction(0).prob_true();
        assert!(p > 0.5);
        assert!(p < 0.9);
        assert!(solution.performance(0).mean() > 0.0);
    }

    #[test]
    fn test_deterministic() {
        let games = vec![
            GameRecord::new("st", &["a", "b"], &["c"], Team::Good),
            GameRecord::new("st", &["c", "a"], &["b"], Team::Evil),
            GameRecord::new("st", &["b"], &["a", "c"], Team::Good),
        ];
        let (_, first) = solve(&games);
        let (_, second) = solve(&games);
        assert_eq!(first.skills(), second.skills());
        assert_eq!(first.bias(), second.bias());
        assert_eq!(first.log_evidence(), second.log_evidence());
        assert_eq!(first.predictions(), second.predictions());
    }

    #[test]
    fn test_iteration_cap_is_not_fatal() {
        let games = vec![
            GameRecord::new("st", &["a"], &["b"], Team::Good),
            GameRecord::new("st", &["b"], &["c"], Team::Good),
            GameRecord::new("st", &["c"], &["a"], Team::Good),
        ];
        let model = ModelBuilder::new(ModelConfig::default())
            .unwrap()
            .build(&games)
            .unwrap();
        let solver = EpSolver::new(SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        })
        .unwrap();

        let solution = solver.solve(&model).unwrap();
        assert_eq!(solution.diagnostics().iterations, 1);
        assert!(!solution.diagnostics().converged);
        assert!(solution.diagnostics().final_delta > 0.0);
    }

    #[test]
    fn test_predictions_follow_final_beliefs() {
        // a > b > c > a: later games move the skills game 0 saw mid-sweep
        let games = vec![
            GameRecord::new("st", &["a"], &["b"], Team::Good),
            GameRecord::new("st", &["b"], &["c"], Team::Good),
            GameRecord::new("st", &["c"], &["a"], Team::Good),
        ];
        let model = ModelBuilder::new(ModelConfig::default())
            .unwrap()
            .build(&games)
            .unwrap();
        let solver = EpSolver::new(SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        })
        .unwrap();

        let mut swept = BeliefStore::new(&model);
        for game in model.games() {
            solver.update_game(&model, &mut swept, game);
        }
        let solution = solver.solve(&model).unwrap();
        assert_eq!(solution.skills(), &swept.beliefs()[..swept.bias_slot()]);

        let noise = model.performance_noise();
        for game in model.games() {
            let performance = GameState::read(&model, &solution.store, game).performance;
            let expected = Threshold::indicator_message(noise.forward(performance));
            assert_eq!(solution.performance(game.index), performance);
            assert_eq!(solution.prediction(game.index), expected);
        }
        assert_ne!(solution.prediction(0), swept.prediction(0));
    }

    #[test]
    fn test_damping_reaches_same_fixed_point() {
        let games = vec![
            GameRecord::new("st", &["a", "b"], &["c"], Team::Good),
            GameRecord::new("st", &["a"], &["c", "b"], Team::Good),
        ];
        let model = ModelBuilder::new(ModelConfig::default())
            .unwrap()
            .build(&games)
            .unwrap();
        let plain = EpSolver::new(SolverConfig::default())
            .unwrap()
            .solve(&model)
            .unwrap();
        let damped = EpSolver::new(SolverConfig {
            damping: 0.5,
            max_iterations: 500,
            ..SolverConfig::default()
        })
        .unwrap()
        .solve(&model)
        .unwrap();

        assert!(damped.diagnostics().converged);
        for (a, b) in plain.skills().iter().zip(damped.skills()) {
            assert!((a.mean() - b.mean()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_gated_skill_sits_between_prior_and_posterior() {
        let games = vec![
            GameRecord::new("st", &["a"], &["b"], Team::Good),
            GameRecord::new("st", &["a"], &["b"], Team::Good),
        ];
        let (model, solution) = solve(&games);
        let gated = solution.gated_skill(&model, 1);
        assert!(gated.mean() > 0.0);
        assert!(gated.mean() < solution.skill(1).mean());
    }
}
