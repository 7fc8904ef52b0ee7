//! Common types used throughout the rating engine

use serde::{Deserialize, Serialize};

/// Player name as it appears in a game log roster
pub type PlayerId = String;

/// Dense index of a player in the trained universe; 0 is the catch-all
pub type PlayerIndex = usize;

/// The two sides of a social deduction game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Good,
    Evil,
}

impl Team {
    /// The opposing side
    pub fn opponent(self) -> Team {
        match self {
            Team::Good => Team::Evil,
            Team::Evil => Team::Good,
        }
    }

    /// Parse a winner label from a game log ("good" or "evil", any case)
    pub fn parse(label: &str) -> Option<Team> {
        match label.trim().to_lowercase().as_str() {
            "good" => Some(Team::Good),
            "evil" => Some(Team::Evil),
            _ => None,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Good => write!(f, "good"),
            Team::Evil => write!(f, "evil"),
        }
    }
}

/// Winner of a game is one of the two teams
pub type Winner = Team;

/// One game as recorded in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub storyteller: String,
    #[serde(default)]
    pub edition: String,
    pub good: Vec<PlayerId>,
    pub evil: Vec<PlayerId>,
    pub winner: String,
}

impl GameRecord {
    /// Create a record with an empty edition
    pub fn new(
        storyteller: impl Into<String>,
        good: &[&str],
        evil: &[&str],
        winner: Winner,
    ) -> Self {
        Self {
            storyteller: storyteller.into(),
            edition: String::new(),
            good: good.iter().map(|name| name.to_string()).collect(),
            evil: evil.iter().map(|name| name.to_string()).collect(),
            winner: winner.to_string(),
        }
    }

    /// Roster of the given side
    pub fn roster(&self, team: Team) -> &[PlayerId] {
        match team {
            Team::Good => &self.good,
            Team::Evil => &self.evil,
        }
    }

    /// The same game seen from the other side: rosters swapped, winner flipped
    pub fn mirrored(&self) -> Self {
        let winner = match Team::parse(&self.winner) {
            Some(team) => team.opponent().to_string(),
            None => self.winner.clone(),
        };
        Self {
            storyteller: self.storyteller.clone(),
            edition: self.edition.clone(),
            good: self.evil.clone(),
            evil: self.good.clone(),
            winner,
        }
    }
}
