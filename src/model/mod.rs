//! Latent-variable model for good-vs-evil games
//!
//! This module maps player names onto indices and wires every game's rosters
//! into the factor chain consumed by the solver.

pub mod builder;
pub mod graph;
pub mod universe;

// Re-export commonly used types
pub use builder::{noise_factor, ModelBuilder, TeamAverage};
pub use graph::{GameFactor, SkillModel, Term, VariableId};
pub use universe::{PlayerUniverse, CATCH_ALL_INDEX};
