//! Persistence of finished games and training summaries.
//!
//! A self-play run is saved as one batch: every game plus the run summary is
//! committed together or not at all.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Hyperparameters;
use crate::error::StoreError;
use crate::stats::{GameRecord, RunSummary};

/// Label used for both sides of a self-play game.
pub const ENGINE_LABEL: &str = "QLearner";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    SelfPlay,
    Imported,
}

/// A game as kept by the store.
///
/// Moves and result are raw strings: a record that no longer parses is still
/// loaded, and rejected later by history ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: Uuid,
    pub moves: Vec<String>,
    pub result: String,
    pub white: String,
    pub black: String,
    pub timestamp: DateTime<Utc>,
    pub final_fen: String,
    pub game_type: GameType,
    pub evaluation: f64,
}

impl StoredGame {
    pub fn from_record(record: &GameRecord) -> Self {
        StoredGame {
            id: Uuid::new_v4(),
            moves: record.moves.clone(),
            result: record.result.tag().to_string(),
            white: ENGINE_LABEL.to_string(),
            black: ENGINE_LABEL.to_string(),
            timestamp: Utc::now(),
            final_fen: record.final_fen.clone(),
            game_type: GameType::SelfPlay,
            evaluation: record.reward,
        }
    }

    /// A game played elsewhere, e.g. by a human against the engine.
    pub fn imported(moves: Vec<String>, result: impl Into<String>) -> Self {
        StoredGame {
            id: Uuid::new_v4(),
            moves,
            result: result.into(),
            white: String::from("white"),
            black: String::from("black"),
            timestamp: Utc::now(),
            final_fen: String::new(),
            game_type: GameType::Imported,
            evaluation: 0.0,
        }
    }
}

/// Statistics saved alongside the games of a self-play run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub run: RunSummary,
    pub hyperparameters: Hyperparameters,
    pub epsilon: f64,
    pub positions_evaluated: u64,
    pub timestamp: DateTime<Utc>,
}

/// Counts and averages across every stored game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreAggregate {
    pub total_games: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub average_moves: f64,
    pub average_evaluation: f64,
}

impl StoreAggregate {
    /// Games with an unknown result tag count towards the total only.
    pub fn from_games(games: &[StoredGame]) -> Self {
        let mut agg = StoreAggregate {
            total_games: games.len(),
            ..StoreAggregate::default()
        };
        if games.is_empty() {
            return agg;
        }
        for game in games {
            match game.result.as_str() {
                "1-0" => agg.white_wins += 1,
                "0-1" => agg.black_wins += 1,
                "1/2-1/2" => agg.draws += 1,
                _ => {}
            }
        }
        let n = games.len() as f64;
        agg.average_moves = games.iter().map(|g| g.moves.len()).sum::<usize>() as f64 / n;
        agg.average_evaluation = games.iter().map(|g| g.evaluation).sum::<f64>() / n;
        agg
    }
}

/// Persistence capability injected into the trainer.
pub trait GameStore {
    /// Commits all games and the summary, or nothing.
    fn save_batch(
        &mut self,
        games: &[StoredGame],
        summary: &TrainingSummary,
    ) -> Result<(), StoreError>;

    /// Every stored game, most recent first.
    fn load_games(&self) -> Result<Vec<StoredGame>, StoreError>;

    fn aggregate(&self) -> Result<StoreAggregate, StoreError> {
        Ok(StoreAggregate::from_games(&self.load_games()?))
    }
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    games: Vec<StoredGame>,
    summaries: Vec<TrainingSummary>,
    reject_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with games, given oldest first.
    pub fn with_games(games: Vec<StoredGame>) -> Self {
        MemoryStore {
            games,
            ..Self::default()
        }
    }

    /// When set, every `save_batch` fails without storing anything.
    pub fn set_reject_saves(&mut self, reject: bool) {
        self.reject_saves = reject;
    }

    pub fn summaries(&self) -> &[TrainingSummary] {
        &self.summaries
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl GameStore for MemoryStore {
    fn save_batch(
        &mut self,
        games: &[StoredGame],
        summary: &TrainingSummary,
    ) -> Result<(), StoreError> {
        if self.reject_saves {
            return Err(StoreError::Rejected {
                games: games.len(),
                reason: "store is not accepting writes".to_string(),
            });
        }
        self.games.extend_from_slice(games);
        self.summaries.push(summary.clone());
        Ok(())
    }

    fn load_games(&self) -> Result<Vec<StoredGame>, StoreError> {
        Ok(self.games.iter().rev().cloned().collect())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    games: Vec<StoredGame>,
    #[serde(default)]
    summaries: Vec<TrainingSummary>,
}

/// Whole-file JSON store. A batch is written to a sibling temp file and
/// renamed over the original, so readers see either the old or the new
/// document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_summaries(&self) -> Result<Vec<TrainingSummary>, StoreError> {
        Ok(self.read()?.summaries)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Decode {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(doc)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl GameStore for JsonFileStore {
    fn save_batch(
        &mut self,
        games: &[StoredGame],
        summary: &TrainingSummary,
    ) -> Result<(), StoreError> {
        let mut doc = self.read()?;
        doc.games.extend_from_slice(games);
        doc.summaries.push(summary.clone());
        self.write(&doc)
    }

    fn load_games(&self) -> Result<Vec<StoredGame>, StoreError> {
        let mut games = self.read()?.games;
        games.reverse();
        Ok(games)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
