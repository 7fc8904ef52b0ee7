//! Grimoire - skill ratings for good-vs-evil social deduction games
//!
//! This crate rates players from a log of team games by Expectation
//! Propagation on a probit performance model, and reports the model evidence
//! so alternative modelling choices can be compared on the same log.

pub mod config;
pub mod error;
pub mod inference;
pub mod loader;
pub mod model;
pub mod results;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use inference::{EpSolver, Solution};
pub use loader::{FileGameSource, GameSource, StaticGameSource};
pub use model::{ModelBuilder, PlayerUniverse, SkillModel};
pub use results::{RatingReport, ResultExtractor};
pub use service::RatingService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
