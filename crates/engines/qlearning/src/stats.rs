//! Game records and training statistics.

use std::collections::VecDeque;

use chess_core::GameResult;
use serde::{Deserialize, Serialize};

/// Number of finished games kept in the rolling window.
pub const RECENT_WINDOW: usize = 10;

/// A finished self-play game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    /// Moves in UCI notation, in play order.
    pub moves: Vec<String>,
    pub result: GameResult,
    pub move_count: usize,
    /// Sum of the rewards earned by every move of the game.
    pub reward: f64,
    pub final_fen: String,
}

impl GameRecord {
    pub fn new(moves: Vec<String>, result: GameResult, reward: f64, final_fen: String) -> Self {
        GameRecord {
            move_count: moves.len(),
            moves,
            result,
            reward,
            final_fen,
        }
    }
}

/// Compact view of a game for the rolling window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub result: String,
    pub move_count: usize,
    pub reward: f64,
}

impl From<&GameRecord> for GameSummary {
    fn from(record: &GameRecord) -> Self {
        GameSummary {
            result: record.result.tag().to_string(),
            move_count: record.move_count,
            reward: record.reward,
        }
    }
}

/// Running counters since the engine was created. Wins and losses are
/// counted from White's side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingStats {
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    /// The last `RECENT_WINDOW` games, oldest first.
    pub recent_games: VecDeque<GameSummary>,
    pub epsilon: f64,
    pub positions_evaluated: u64,
}

impl TrainingStats {
    pub fn record(&mut self, record: &GameRecord) {
        self.games_played += 1;
        match record.result {
            GameResult::WhiteWins => self.wins += 1,
            GameResult::BlackWins => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
        self.recent_games.push_back(GameSummary::from(record));
        if self.recent_games.len() > RECENT_WINDOW {
            self.recent_games.pop_front();
        }
    }
}

/// Aggregate over one self-play run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub games: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub white_win_pct: f64,
    pub black_win_pct: f64,
    pub draw_pct: f64,
    pub average_length: f64,
    pub average_reward: f64,
}

impl RunSummary {
    pub fn from_games(games: &[GameRecord]) -> Self {
        let count = |result: GameResult| games.iter().filter(|g| g.result == result).count();
        let white_wins = count(GameResult::WhiteWins);
        let black_wins = count(GameResult::BlackWins);
        let draws = count(GameResult::Draw);

        let n = games.len();
        if n == 0 {
            return RunSummary::default();
        }
        let pct = |k: usize| k as f64 * 100.0 / n as f64;
        let total_moves: usize = games.iter().map(|g| g.move_count).sum();
        let total_reward: f64 = games.iter().map(|g| g.reward).sum();

        RunSummary {
            games: n,
            white_wins,
            black_wins,
            draws,
            white_win_pct: pct(white_wins),
            black_win_pct: pct(black_wins),
            draw_pct: pct(draws),
            average_length: total_moves as f64 / n as f64,
            average_reward: total_reward / n as f64,
        }
    }
}
