//! Service layer for the grimoire rating tool
//!
//! This module wires loading, model building, inference and extraction into
//! a single run over one game log.

pub mod app;

pub use app::{RatingRun, RatingService};
