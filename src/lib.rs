//! NBA win probability from play-by-play logs
//!
//! Reconstructs per-event game states (teams, scores, clock) from raw
//! play-by-play records and trains a logistic model over score margin and
//! time remaining.

pub mod data;
pub mod ingest;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a team. 0 is the "unknown" sentinel used when a
/// game carries no events for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl TeamId {
    pub const UNKNOWN: TeamId = TeamId(0);

    pub fn is_unknown(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One raw play-by-play record as it appears in the source CSV.
///
/// Only the game identifier and event number are required; every other
/// column may be absent from the projection or empty on a given row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "GAME_ID")]
    pub game_id: String,
    /// Intra-game chronological order.
    #[serde(rename = "EVENTNUM")]
    pub event_num: i64,
    /// 1-based quarter index; values above 4 are overtime periods.
    #[serde(rename = "PERIOD", default)]
    pub period: Option<u32>,
    /// Clock remaining in the period, formatted "MM:SS".
    #[serde(rename = "PCTIMESTRING", default)]
    pub clock: Option<String>,
    /// Running margin (home minus away) as of this event: a numeral or the
    /// literal "TIE". Absent on most non-scoring events.
    #[serde(rename = "SCOREMARGIN", default)]
    pub margin: Option<String>,
    /// Team attributed as the primary actor of the event. The source CSV
    /// stores this as a float ("1610612744.0").
    #[serde(rename = "PLAYER1_TEAM_ID", default, deserialize_with = "de_team_id")]
    pub actor_team: Option<TeamId>,
    /// Populated only for home-team events.
    #[serde(rename = "HOMEDESCRIPTION", default)]
    pub home_description: Option<String>,
    /// Populated only for away-team events.
    #[serde(rename = "VISITORDESCRIPTION", default)]
    pub away_description: Option<String>,
}

fn de_team_id<'de, D>(deserializer: D) -> std::result::Result<Option<TeamId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_team_id))
}

/// Parse a team ID that may be formatted as an integer or a float.
pub fn parse_team_id(raw: &str) -> Option<TeamId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(id) = raw.parse::<i64>() {
        return Some(TeamId(id));
    }
    raw.parse::<f64>().ok().map(|id| TeamId(id as i64))
}

/// Home and away team IDs for one game, derived once and reused for every
/// event of that game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTeams {
    pub home: TeamId,
    pub away: TeamId,
}

/// One canonical reconstructed game-state row, one per raw event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: String,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub quarter: u32,
    /// True seconds remaining in regulation (2880 at tip-off); overtime
    /// periods report seconds remaining in the period only.
    pub time_remaining_sec: u32,
    pub home_score: u32,
    pub away_score: u32,
    /// Final outcome of the whole game, identical on every row of a game.
    pub home_win: bool,
}

impl GameState {
    /// Score margin, home minus away.
    pub fn margin(&self) -> i64 {
        self.home_score as i64 - self.away_score as i64
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopsError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model not trained - run `hoops train` first")]
    NoModel,

    #[error("No game states stored for game {0}")]
    UnknownGame(String),

    #[error("Write gave up after {attempts} attempts ({committed} rows committed): {source}")]
    WriteExhausted {
        attempts: u32,
        committed: usize,
        source: rusqlite::Error,
    },
}

pub type Result<T> = std::result::Result<T, HoopsError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub ingest: IngestConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
    pub model_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Rows per write transaction.
    pub chunk_size: usize,
    /// Attempts per chunk before the batch is abandoned.
    pub write_attempts: u32,
    /// Delay between attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Fraction of games (not rows) used for training; the remainder is the
    /// validation split.
    pub train_ratio: f64,
    pub early_stopping_patience: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/hoops.db".to_string(),
                model_path: "model/win_prob".to_string(),
            },
            ingest: IngestConfig {
                chunk_size: 5000,
                write_attempts: 3,
                retry_delay_ms: 500,
            },
            training: TrainingConfig {
                epochs: 400,
                learning_rate: 0.1,
                train_ratio: 0.8,
                early_stopping_patience: 50,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HoopsError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoopsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_team_id_formats() {
        assert_eq!(parse_team_id("1610612744"), Some(TeamId(1610612744)));
        assert_eq!(parse_team_id("1610612744.0"), Some(TeamId(1610612744)));
        assert_eq!(parse_team_id(""), None);
        assert_eq!(parse_team_id("  "), None);
        assert_eq!(parse_team_id("not-a-team"), None);
    }

    #[test]
    fn test_margin_sign() {
        let state = GameState {
            game_id: "0021800001".to_string(),
            home_team: TeamId(1),
            away_team: TeamId(2),
            quarter: 4,
            time_remaining_sec: 30,
            home_score: 98,
            away_score: 101,
            home_win: false,
        };
        assert_eq!(state.margin(), -3);
    }
}
