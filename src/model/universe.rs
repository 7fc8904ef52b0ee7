//! Player universe: name to index mapping with a catch-all at index 0

use crate::types::{GameRecord, PlayerId, PlayerIndex};
use std::collections::HashMap;
use tracing::debug;

/// Index reserved for the catch-all "unknown player"
pub const CATCH_ALL_INDEX: PlayerIndex = 0;

/// Every player the model knows about, catch-all first
#[derive(Debug, Clone)]
pub struct PlayerUniverse {
    names: Vec<PlayerId>,
    lookup: HashMap<PlayerId, PlayerIndex>,
    appearances: Vec<usize>,
    storytellers: Vec<String>,
    folded: Vec<PlayerId>,
}

impl PlayerUniverse {
    /// A universe holding only the catch-all
    pub fn empty(catch_all_name: &str) -> Self {
        let mut lookup = HashMap::new();
        lookup.insert(catch_all_name.to_string(), CATCH_ALL_INDEX);
        Self {
            names: vec![catch_all_name.to_string()],
            lookup,
            appearances: vec![0],
            storytellers: Vec::new(),
            folded: Vec::new(),
        }
    }

    /// Derive the universe from a game log.
    ///
    /// Names are indexed in order of first appearance. Names appearing in fewer
    /// than `min_appearances` rosters, and the catch-all name itself, resolve to
    /// the catch-all.
    pub fn from_games(games: &[GameRecord], catch_all_name: &str, min_appearances: usize) -> Self {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut storytellers: Vec<String> = Vec::new();

        for game in games {
            if !storytellers.contains(&game.storyteller) {
                storytellers.push(game.storyteller.clone());
            }
            for name in game.good.iter().chain(game.evil.iter()) {
                let count = counts.entry(name.as_str()).or_insert_with(|| {
                    order.push(name.as_str());
                    0
                });
                *count += 1;
            }
        }

        let mut universe = Self::empty(catch_all_name);
        universe.storytellers = storytellers;

        for name in order {
            let count = counts[name];
            if name == catch_all_name {
                universe.appearances[CATCH_ALL_INDEX] += count;
            } else if count < min_appearances {
                debug!(
                    "Folding rare player {} ({} appearances) into {}",
                    name, count, catch_all_name
                );
                universe.appearances[CATCH_ALL_INDEX] += count;
                universe.folded.push(name.to_string());
            } else {
                universe.lookup.insert(name.to_string(), universe.names.len());
                universe.names.push(name.to_string());
                universe.appearances.push(count);
            }
        }

        universe
    }

    /// Index for a roster name; anything unknown resolves to the catch-all
    pub fn resolve(&self, name: &str) -> PlayerIndex {
        self.lookup.get(name).copied().unwrap_or(CATCH_ALL_INDEX)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: PlayerIndex) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[PlayerId] {
        &self.names
    }

    pub fn catch_all_name(&self) -> &str {
        &self.names[CATCH_ALL_INDEX]
    }

    /// Roster appearances attributed to each index
    pub fn appearances(&self, index: PlayerIndex) -> usize {
        self.appearances.get(index).copied().unwrap_or(0)
    }

    /// Distinct storytellers, in order of first appearance
    pub fn storytellers(&self) -> &[String] {
        &self.storytellers
    }

    /// Names that were folded into the catch-all for being too rare
    pub fn folded_players(&self) -> &[PlayerId] {
        &self.folded
    }
}
