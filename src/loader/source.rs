//! Game log sources
//!
//! This module defines the interface for obtaining the ordered game log, along
//! with a file-backed implementation (JSON, TOML or YAML) and a static one.

use anyhow::Context;
use crate::error::{RatingError, Result};
use crate::types::GameRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Trait for anything that can produce an ordered game log
#[cfg_attr(test, mockall::automock)]
pub trait GameSource {
    /// Human readable description of where the games come from
    fn describe(&self) -> String;

    /// Load every game record, in log order
    fn load_games(&self) -> Result<Vec<GameRecord>>;
}

/// Game log wrapper used by TOML files (`[[games]]` tables) and JSON objects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameLog {
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

/// JSON and YAML logs may be a bare sequence of games or a `games` mapping
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseGameLog {
    Bare(Vec<GameRecord>),
    Wrapped(GameLog),
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Toml,
    Yaml,
}

impl LogFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("json") => Some(LogFormat::Json),
            Some("toml") => Some(LogFormat::Toml),
            Some("yaml") | Some("yml") => Some(LogFormat::Yaml),
            _ => None,
        }
    }
}

/// Parse a game log held in memory
pub fn parse_games(contents: &str, format: LogFormat) -> Result<Vec<GameRecord>> {
    let games = match format {
        LogFormat::Json => serde_json::from_str::<LooseGameLog>(contents)
            .map_err(|e| load_failure("json", e))?
            .into_games(),
        LogFormat::Toml => {
            toml::from_str::<GameLog>(contents)
                .map_err(|e| load_failure("toml", e))?
                .games
        }
        LogFormat::Yaml => serde_yaml::from_str::<LooseGameLog>(contents)
            .map_err(|e| load_failure("yaml", e))?
            .into_games(),
    };
    Ok(games)
}

impl LooseGameLog {
    fn into_games(self) -> Vec<GameRecord> {
        match self {
            LooseGameLog::Bare(games) => games,
            LooseGameLog::Wrapped(log) => log.games,
        }
    }
}

fn load_failure(format: &str, error: impl std::fmt::Display) -> RatingError {
    RatingError::LoadFailed {
        source_name: format.to_string(),
        message: error.to_string(),
    }
}

/// Game source reading a JSON, TOML or YAML file from disk
#[derive(Debug, Clone)]
pub struct FileGameSource {
    path: PathBuf,
    format: LogFormat,
}

impl FileGameSource {
    /// Create a source, inferring the format from the extension
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = LogFormat::from_path(&path).ok_or_else(|| RatingError::LoadFailed {
            source_name: path.display().to_string(),
            message: "unsupported extension (expected .json, .toml or .yaml)".to_string(),
        })?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameSource for FileGameSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_games(&self) -> Result<Vec<GameRecord>> {
        debug!("Reading game log {}", self.path.display());
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| RatingError::LoadFailed {
                source_name: self.describe(),
                message: e.to_string(),
            })?;
        let games = parse_games(&contents, self.format)
            .with_context(|| format!("while parsing {}", self.describe()))?;
        info!("Loaded {} games from {}", games.len(), self.path.display());
        Ok(games)
    }
}

/// Game source over records already in memory
#[derive(Debug, Clone, Default)]
pub struct StaticGameSource {
    games: Vec<GameRecord>,
}

impl StaticGameSource {
    pub fn new(games: Vec<GameRecord>) -> Self {
        Self { games }
    }
}

impl GameSource for StaticGameSource {
    fn describe(&self) -> String {
        format!("{} in-memory games", self.games.len())
    }

    fn load_games(&self) -> Result<Vec<GameRecord>> {
        Ok(self.games.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Team;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            LogFormat::from_path(Path::new("games.JSON")),
            Some(LogFormat::Json)
        );
        assert_eq!(
            LogFormat::from_path(Path::new("log/games.toml")),
            Some(LogFormat::Toml)
        );
        assert_eq!(
            LogFormat::from_path(Path::new("games.yaml")),
            Some(LogFormat::Yaml)
        );
        assert_eq!(
            LogFormat::from_path(Path::new("games.YML")),
            Some(LogFormat::Yaml)
        );
        assert!(FileGameSource::new("games.csv").is_err());
    }

    #[test]
    fn test_parse_json_bare_and_wrapped() {
        let bare = r#"[{"storyteller":"st","edition":"tb","good":["a","b"],"evil":["c"],"winner":"good"}]"#;
        let games = parse_games(bare, LogFormat::Json).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].edition, "tb");

        let wrapped = r#"{"games":[{"storyteller":"st","good":["a"],"evil":["c"],"winner":"evil"}]}"#;
        let games = parse_games(wrapped, LogFormat::Json).unwrap();
        assert_eq!(games[0].winner, "evil");
    }

    #[test]
    fn test_parse_toml() {
        let contents = r#"
            [[games]]
            storyteller = "st"
            edition = "bmr"
            good = ["a", "b"]
            evil = ["c", "d"]
            winner = "good"

            [[games]]
            storyteller = "st"
            good = ["c"]
            evil = ["a"]
            winner = "evil"
        "#;
        let games = parse_games(contents, LogFormat::Toml).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].roster(Team::Good), ["c".to_string()]);
    }

    #[test]
    fn test_parse_yaml_bare_and_wrapped() {
        let bare = "\
- storyteller: st
  edition: tb
  good: [a, b]
  evil: [c]
  winner: good
- storyteller: st
  good:
    - c
  evil:
    - a
  winner: evil
";
        let games = parse_games(bare, LogFormat::Yaml).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].edition, "tb");
        assert_eq!(games[0].roster(Team::Good), ["a".to_string(), "b".to_string()]);
        assert_eq!(games[1].winner, "evil");

        let wrapped = "\
games:
  - storyteller: st
    good: [a]
    evil: [c]
    winner: evil
";
        let games = parse_games(wrapped, LogFormat::Yaml).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].roster(Team::Evil), ["c".to_string()]);
    }

    #[test]
    fn test_parse_malformed_reports_load_failure() {
        let err = parse_games("{not json", LogFormat::Json).unwrap_err();
        assert!(err.downcast_ref::<RatingError>().is_some());

        let err = parse_games("games: [", LogFormat::Yaml).unwrap_err();
        match err.downcast_ref::<RatingError>() {
            Some(RatingError::LoadFailed { source_name, .. }) => assert_eq!(source_name, "yaml"),
            other => panic!("expected a load failure, got {:?}", other),
        }
    }

    #[test]
    fn test_file_source_roundtrip() {
        let dir = std::env::temp_dir().join(format!("grimoire-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("games.json");
        let games = vec![GameRecord::new("st", &["a"], &["b"], Team::Good)];
        std::fs::write(&path, serde_json::to_string(&games).unwrap()).unwrap();

        let source = FileGameSource::new(&path).unwrap();
        assert_eq!(source.load_games().unwrap(), games);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let source = FileGameSource::new("/nonexistent/grimoire/games.toml").unwrap();
        assert!(source.load_games().is_err());
    }

    #[test]
    fn test_mock_source() {
        let mut mock = MockGameSource::new();
        mock.expect_load_games()
            .times(1)
            .returning(|| Ok(vec![GameRecord::new("st", &["a"], &["b"], Team::Evil)]));

        let games = mock.load_games().unwrap();
        assert_eq!(games[0].winner, "evil");
    }
}
