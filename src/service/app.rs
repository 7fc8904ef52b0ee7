//! Rating pipeline coordination
//!
//! Loader → model builder → EP solver → result extractor, configured once from
//! an [`AppConfig`].

use crate::config::{validate_config, AppConfig};
use crate::error::Result;
use crate::inference::{EpSolver, Solution};
use crate::loader::GameSource;
use crate::model::{ModelBuilder, PlayerUniverse, SkillModel};
use crate::results::{RatingReport, ResultExtractor};
use crate::types::GameRecord;
use std::time::Instant;
use tracing::{info, warn};

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct RatingRun {
    pub model: SkillModel,
    pub solution: Solution,
    pub report: RatingReport,
}

/// Configured rating pipeline
#[derive(Debug, Clone)]
pub struct RatingService {
    builder: ModelBuilder,
    solver: EpSolver,
    extractor: ResultExtractor,
}

impl RatingService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        validate_config(config)?;
        Ok(Self {
            builder: ModelBuilder::new(config.model.clone())?,
            solver: EpSolver::new(config.solver.clone())?,
            extractor: ResultExtractor::new(&config.display),
        })
    }

    pub fn builder(&self) -> &ModelBuilder {
        &self.builder
    }

    /// Load the log from `source` and rate it
    pub fn run(&self, source: &dyn GameSource) -> Result<RatingRun> {
        info!("Loading games from {}", source.describe());
        let games = source.load_games()?;
        self.rate(&games)
    }

    /// Rate an already loaded log, deriving the universe from it
    pub fn rate(&self, games: &[GameRecord]) -> Result<RatingRun> {
        let model = self.builder.build(games)?;
        self.solve(model)
    }

    /// Rate a log against a fixed universe; unseen names become the catch-all
    pub fn rate_with_universe(
        &self,
        games: &[GameRecord],
        universe: PlayerUniverse,
    ) -> Result<RatingRun> {
        let model = self.builder.build_with_universe(games, universe)?;
        self.solve(model)
    }

    fn solve(&self, model: SkillModel) -> Result<RatingRun> {
        let start_time = Instant::now();
        let solution = self.solver.solve(&model)?;
        let report = self.extractor.extract(&model, &solution);

        if !solution.diagnostics().converged {
            warn!(
                "Reporting unconverged beliefs after {} iterations",
                solution.diagnostics().iterations
            );
        }
        info!(
            "Rated {} games in {:.2}ms",
            model.games().len(),
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok(RatingRun {
            model,
            solution,
            report,
        })
    }
}
