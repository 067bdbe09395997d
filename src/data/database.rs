//! SQLite storage for the game-state table
//!
//! The `GameStates` table is the sole durable artifact of the ingest
//! pipeline and the only interface the trainer and replay surface read.
//! Bulk writes are chunked, with each chunk committed in its own
//! transaction and retried a bounded number of times before the batch is
//! abandoned.

use crate::{GameState, HoopsError, Result, TeamId};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Duration;

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

/// Bulk-write policy: chunking and bounded retry with a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub chunk_size: usize,
    pub attempts: u32,
    pub retry_delay: Duration,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            chunk_size: 5000,
            attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// A stored game with its resolved teams, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub game_id: String,
    pub home_team: TeamId,
    pub away_team: TeamId,
}

/// One row of the training projection.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub game_id: String,
    pub home_score: i64,
    pub away_score: i64,
    pub time_remaining_sec: i64,
    pub home_win: i64,
}

impl TrainingRow {
    /// Score margin, home minus away.
    pub fn margin(&self) -> i64 {
        self.home_score - self.away_score
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub game_count: usize,
    pub state_count: usize,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS GameStates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                GameID TEXT NOT NULL,
                HomeTeamID INTEGER NOT NULL,
                AwayTeamID INTEGER NOT NULL,
                Quarter INTEGER NOT NULL,
                TimeRemainingSec INTEGER NOT NULL,
                HomeScore INTEGER NOT NULL,
                AwayScore INTEGER NOT NULL,
                HomeWin INTEGER NOT NULL,
                GameDate TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_game_states_game ON GameStates(GameID);
            "#,
        )?;
        Ok(())
    }

    // ==================== Writes ====================

    /// Replace the whole table with freshly reconstructed states.
    ///
    /// Rows are written in the order given, in chunks of
    /// `options.chunk_size`, each chunk inside its own transaction. A chunk
    /// either commits fully or is retried after a fixed delay; once the
    /// attempt budget is spent the batch halts with the committed row count
    /// in the error. GameDate is stamped once per call.
    pub fn replace_all(&mut self, states: &[GameState], options: WriteOptions) -> Result<usize> {
        self.conn.execute("DELETE FROM GameStates", [])?;

        let written_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let chunk_size = options.chunk_size.max(1);
        let mut committed = 0usize;

        for chunk in states.chunks(chunk_size) {
            self.write_chunk(chunk, &written_at, options, committed)?;
            committed += chunk.len();
            log::info!("committed {}/{} game-state rows", committed, states.len());
        }

        Ok(committed)
    }

    fn write_chunk(
        &mut self,
        chunk: &[GameState],
        written_at: &str,
        options: WriteOptions,
        committed: usize,
    ) -> Result<()> {
        let attempts = options.attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.insert_chunk(chunk, written_at) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    log::warn!(
                        "chunk write failed (attempt {}/{}): {}",
                        attempt,
                        attempts,
                        err
                    );
                    if attempt >= attempts {
                        return Err(HoopsError::WriteExhausted {
                            attempts,
                            committed,
                            source: err,
                        });
                    }
                    std::thread::sleep(options.retry_delay);
                    attempt += 1;
                }
            }
        }
    }

    fn insert_chunk(
        &mut self,
        chunk: &[GameState],
        written_at: &str,
    ) -> std::result::Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                r#"
                INSERT INTO GameStates
                    (GameID, HomeTeamID, AwayTeamID, Quarter, TimeRemainingSec,
                     HomeScore, AwayScore, HomeWin, GameDate)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for state in chunk {
                stmt.execute(params![
                    state.game_id,
                    state.home_team.0,
                    state.away_team.0,
                    state.quarter,
                    state.time_remaining_sec,
                    state.home_score,
                    state.away_score,
                    state.home_win as i64,
                    written_at,
                ])?;
            }
        }
        tx.commit()
    }

    // ==================== Reads ====================

    /// List stored games with their resolved teams.
    pub fn list_games(&self, limit: usize) -> Result<Vec<GameSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT GameID, HomeTeamID, AwayTeamID FROM GameStates
             ORDER BY GameID LIMIT ?1",
        )?;

        let games = stmt
            .query_map(params![limit as i64], |row| {
                Ok(GameSummary {
                    game_id: row.get(0)?,
                    home_team: TeamId(row.get(1)?),
                    away_team: TeamId(row.get(2)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    /// All states of one game in replay order (earliest first, i.e. time
    /// remaining descending).
    pub fn game_states(&self, game_id: &str) -> Result<Vec<GameState>> {
        let mut stmt = self.conn.prepare(
            "SELECT GameID, HomeTeamID, AwayTeamID, Quarter, TimeRemainingSec,
                    HomeScore, AwayScore, HomeWin
             FROM GameStates
             WHERE GameID = ?1
             ORDER BY TimeRemainingSec DESC",
        )?;

        let states = stmt
            .query_map(params![game_id], |row| {
                Ok(GameState {
                    game_id: row.get(0)?,
                    home_team: TeamId(row.get(1)?),
                    away_team: TeamId(row.get(2)?),
                    quarter: row.get(3)?,
                    time_remaining_sec: row.get(4)?,
                    home_score: row.get(5)?,
                    away_score: row.get(6)?,
                    home_win: row.get::<_, i64>(7)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(states)
    }

    /// The projection the trainer consumes, ordered by game then clock so
    /// splits are deterministic.
    pub fn training_rows(&self) -> Result<Vec<TrainingRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT GameID, HomeScore, AwayScore, TimeRemainingSec, HomeWin
             FROM GameStates
             ORDER BY GameID, TimeRemainingSec DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(TrainingRow {
                    game_id: row.get(0)?,
                    home_score: row.get(1)?,
                    away_score: row.get(2)?,
                    time_remaining_sec: row.get(3)?,
                    home_win: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let state_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM GameStates", [], |row| row.get(0))?;

        let game_count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT GameID) FROM GameStates",
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            game_count: game_count as usize,
            state_count: state_count as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(game: &str, secs: u32, home: u32, away: u32, home_win: bool) -> GameState {
        GameState {
            game_id: game.to_string(),
            home_team: TeamId(1610612744),
            away_team: TeamId(1610612747),
            quarter: 1,
            time_remaining_sec: secs,
            home_score: home,
            away_score: away,
            home_win,
        }
    }

    #[test]
    fn test_empty_database() {
        let db = Database::in_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.game_count, 0);
        assert_eq!(stats.state_count, 0);
    }

    #[test]
    fn test_round_trip() {
        let mut db = Database::in_memory().unwrap();
        let states = vec![
            state("001", 2880, 0, 0, true),
            state("001", 2850, 2, 0, true),
            state("002", 2880, 0, 0, false),
        ];

        let written = db.replace_all(&states, WriteOptions::default()).unwrap();
        assert_eq!(written, 3);

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.game_count, 2);
        assert_eq!(stats.state_count, 3);

        let replayed = db.game_states("001").unwrap();
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].time_remaining_sec, 2880);
        assert_eq!(replayed[1].home_score, 2);
    }

    #[test]
    fn test_replace_all_replaces() {
        let mut db = Database::in_memory().unwrap();
        db.replace_all(&[state("001", 2880, 0, 0, true)], WriteOptions::default())
            .unwrap();
        db.replace_all(&[state("002", 2880, 0, 0, false)], WriteOptions::default())
            .unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.state_count, 1);
        assert!(db.game_states("001").unwrap().is_empty());
    }

    #[test]
    fn test_chunked_write_commits_everything() {
        let mut db = Database::in_memory().unwrap();
        let states: Vec<GameState> = (0u32..23)
            .map(|i| state("001", 2880 - i, 0, 0, true))
            .collect();

        let options = WriteOptions {
            chunk_size: 5,
            ..WriteOptions::default()
        };
        let written = db.replace_all(&states, options).unwrap();
        assert_eq!(written, 23);
        assert_eq!(db.get_stats().unwrap().state_count, 23);
    }

    #[test]
    fn test_training_projection() {
        let mut db = Database::in_memory().unwrap();
        db.replace_all(
            &[state("001", 2880, 0, 0, true), state("001", 120, 80, 70, true)],
            WriteOptions::default(),
        )
        .unwrap();

        let rows = db.training_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].margin(), 10);
        assert_eq!(rows[1].home_win, 1);
    }

    #[test]
    fn test_list_games() {
        let mut db = Database::in_memory().unwrap();
        db.replace_all(
            &[state("002", 2880, 0, 0, true), state("001", 2880, 0, 0, false)],
            WriteOptions::default(),
        )
        .unwrap();

        let games = db.list_games(10).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id, "001");
        assert_eq!(games[0].home_team, TeamId(1610612744));
    }
}
