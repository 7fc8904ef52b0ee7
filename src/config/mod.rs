//! Configuration management for the grimoire rating tool
//!
//! This module handles configuration loading from files and environment
//! variables, validation, and default values for the model and solver.

pub mod app;
pub mod model;
pub mod solver;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use model::{ModelConfig, UnknownPlayerPolicy};
pub use solver::{DisplayConfig, SolverConfig};
