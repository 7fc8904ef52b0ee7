//! Approximate inference by Expectation Propagation
//!
//! This module provides the exponential-family beliefs, the per-factor update
//! rules, the belief store and the sweep driver that together turn a
//! [`SkillModel`](crate::model::SkillModel) into posteriors and model evidence.

pub mod distributions;
pub mod factors;
pub mod solver;
pub mod store;

// Re-export commonly used types
pub use distributions::{Bernoulli, Gaussian, MIN_PRECISION, MIN_VARIANCE};
pub use factors::{
    EvidenceGate, GaussianNoise, PriorFactor, Threshold, ThresholdMoments, WeightedSum,
};
pub use solver::{EpSolver, Solution, SolverDiagnostics};
pub use store::BeliefStore;
