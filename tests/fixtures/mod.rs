//! Test fixtures: hand-written logs and seeded synthetic leagues

#![allow(dead_code)]

use grimoire::config::{AppConfig, UnknownPlayerPolicy};
use grimoire::types::{GameRecord, Team};
use grimoire::RatingService;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Shorthand for a game record with a fixed storyteller
pub fn game(good: &[&str], evil: &[&str], winner: Team) -> GameRecord {
    GameRecord::new("fixture", good, evil, winner)
}

/// A > B > C, each result consistent with that order
pub fn transitive_games() -> Vec<GameRecord> {
    vec![
        game(&["A"], &["B"], Team::Good),
        game(&["B"], &["C"], Team::Good),
        game(&["A"], &["C"], Team::Good),
    ]
}

pub fn service() -> RatingService {
    RatingService::new(&AppConfig::default()).unwrap()
}

pub fn service_with_policy(policy: UnknownPlayerPolicy) -> RatingService {
    let mut config = AppConfig::default();
    config.model.unknown_player_policy = policy;
    RatingService::new(&config).unwrap()
}

/// League with known true skills, outcomes drawn from the performance model
pub struct SyntheticLeague {
    rng: StdRng,
    names: Vec<String>,
    skills: Vec<f64>,
    noise_variance: f64,
}

impl SyntheticLeague {
    /// `players` players with skills drawn from N(0, skill_sd²)
    pub fn new(seed: u64, players: usize, skill_sd: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let names = (0..players).map(|i| format!("player{:02}", i)).collect();
        let skills = (0..players)
            .map(|_| skill_sd * standard_normal(&mut rng))
            .collect();
        Self {
            rng,
            names,
            skills,
            noise_variance: 3.23,
        }
    }

    pub fn true_skill(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(|index| self.skills[index])
    }

    /// `count` games with disjoint rosters of the given sizes
    pub fn games(&mut self, count: usize, good_size: usize, evil_size: usize) -> Vec<GameRecord> {
        let mut indices: Vec<usize> = (0..self.names.len()).collect();
        (0..count)
            .map(|i| {
                indices.shuffle(&mut self.rng);
                let good = &indices[..good_size];
                let evil = &indices[good_size..good_size + evil_size];

                let average = |team: &[usize]| {
                    team.iter().map(|&p| self.skills[p]).sum::<f64>() / team.len() as f64
                };
                let factor = (1.0 / good_size as f64 + 1.0 / evil_size as f64).sqrt();
                let performance = factor * (average(good) - average(evil))
                    + self.noise_variance.sqrt() * standard_normal(&mut self.rng);

                GameRecord {
                    storyteller: format!("st{}", i % 3),
                    edition: "tb".to_string(),
                    good: good.iter().map(|&p| self.names[p].clone()).collect(),
                    evil: evil.iter().map(|&p| self.names[p].clone()).collect(),
                    winner: if performance > 0.0 { "good" } else { "evil" }.to_string(),
                }
            })
            .collect()
    }

    /// Same rosters, winners replaced by fair coin flips
    pub fn coin_flipped(&mut self, games: &[GameRecord]) -> Vec<GameRecord> {
        games
            .iter()
            .map(|record| {
                let winner = if self.rng.gen_bool(0.5) { Team::Good } else { Team::Evil };
                GameRecord {
                    winner: winner.to_string(),
                    ..record.clone()
                }
            })
            .collect()
    }
}

/// Box-Muller draw from N(0, 1)
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Write `contents` to a fresh file under the system temp dir
pub fn temp_log(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("grimoire-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
