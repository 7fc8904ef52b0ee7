//! Game log loading
//!
//! Turns a JSON, TOML or YAML game log into ordered [`GameRecord`](crate::types::GameRecord)s
//! behind the [`GameSource`] seam, so other transports can be swapped in.

pub mod source;

pub use source::{parse_games, FileGameSource, GameLog, GameSource, LogFormat, StaticGameSource};

#[cfg(test)]
pub use source::MockGameSource;
