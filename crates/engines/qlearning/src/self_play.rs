//! Self-play orchestration and the caller-facing operations of the engine.

use chess_core::{Game, GameResult, Outcome, Position, StopSignal};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::{AppConfig, HistoryMode, HyperparameterUpdate, SelfPlayConfig};
use crate::encoder;
use crate::error::{ConfigError, EngineError};
use crate::ingestion::{self, IngestReport};
use crate::learner::QLearner;
use crate::replay_buffer::Transition;
use crate::reward::move_reward;
use crate::selector::MoveChoice;
use crate::stats::{GameRecord, RunSummary, TrainingStats};
use crate::store::{GameStore, StoredGame, TrainingSummary};

/// Result of `run_self_play`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfPlayReport {
    /// Completed games, in play order.
    pub games: Vec<GameRecord>,
    pub summary: RunSummary,
    /// Set when the stop signal ended the run early.
    pub cancelled: bool,
}

/// Owns the learner and the game store, and drives training.
pub struct SelfPlayTrainer<S: GameStore> {
    learner: QLearner,
    store: S,
    config: SelfPlayConfig,
    stats: TrainingStats,
    stop: StopSignal,
}

impl<S: GameStore> SelfPlayTrainer<S> {
    pub fn new(learner: QLearner, store: S, config: SelfPlayConfig) -> Self {
        SelfPlayTrainer {
            learner,
            store,
            config,
            stats: TrainingStats::default(),
            stop: StopSignal::new(),
        }
    }

    pub fn from_config(config: &AppConfig, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let learner = QLearner::new(config.hyperparameters.clone(), config.self_play.seed)?;
        Ok(Self::new(learner, store, config.self_play.clone()))
    }

    /// Best move for the position, or no move when the FEN is malformed or
    /// the side to move has no legal moves.
    pub fn get_move(&mut self, fen: &str) -> MoveChoice {
        match Position::from_fen(fen) {
            Ok(pos) => self.learner.select_move(&pos),
            Err(err) => {
                warn!(error = %err, "cannot pick a move");
                MoveChoice::none()
            }
        }
    }

    /// Value of the position from White's side; 0 for a malformed FEN.
    pub fn evaluate(&mut self, fen: &str) -> f64 {
        self.learner.evaluate_fen(fen).unwrap_or_else(|err| {
            warn!(error = %err, "evaluating malformed position as 0");
            0.0
        })
    }

    /// Replays stored games into the learner.
    pub fn ingest_history(&mut self, mode: HistoryMode) -> Result<IngestReport, EngineError> {
        let mut games = self.store.load_games()?;
        if mode == HistoryMode::Recent {
            games.truncate(self.config.recent_games);
        }
        Ok(ingestion::ingest_history(&mut self.learner, &games, &self.stop))
    }

    /// Learns from the stored games selected by `history_mode`, then plays
    /// `num_games` games against itself and saves them with a run summary as
    /// one batch.
    ///
    /// A persistence failure is returned as an error; what the learner
    /// picked up during the run is kept.
    pub fn run_self_play(&mut self, num_games: usize) -> Result<SelfPlayReport, EngineError> {
        let history = self.ingest_history(self.config.history_mode)?;
        if history.processed == 0 {
            info!("no usable game history, starting from scratch");
        }

        let mut games = Vec::with_capacity(num_games);
        let mut cancelled = history.cancelled;

        for n in 0..num_games {
            if cancelled || self.stop.is_stopped() {
                cancelled = true;
                break;
            }
            let Some(record) = self.play_game()? else {
                cancelled = true;
                break;
            };

            self.stats.record(&record);
            info!(
                game = n + 1,
                of = num_games,
                result = %record.result,
                moves = record.move_count,
                reward = record.reward,
                epsilon = self.learner.epsilon(),
                "self-play game finished"
            );
            games.push(record);
        }

        let summary = RunSummary::from_games(&games);
        if !games.is_empty() {
            self.persist(&games, &summary)?;
        }
        info!(
            games = summary.games,
            white_wins = summary.white_wins,
            black_wins = summary.black_wins,
            draws = summary.draws,
            average_length = summary.average_length,
            cancelled,
            "self-play run finished"
        );

        Ok(SelfPlayReport {
            games,
            summary,
            cancelled,
        })
    }

    /// Plays one game from the initial position, learning from every move.
    /// Returns `None` when stopped mid-game; the partial game is dropped.
    fn play_game(&mut self) -> Result<Option<GameRecord>, EngineError> {
        let mut game = Game::new(self.config.max_plies, self.config.repetition_limit);
        let mut moves = Vec::new();
        let mut total_reward = 0.0;

        while !game.is_over() {
            if self.stop.is_stopped() {
                return Ok(None);
            }

            let before = game.position().clone();
            let Some(uci) = self.learner.select_move(&before).best_move else {
                break;
            };
            game.play(before.parse_uci(&uci)?)?;

            let after = game.position();
            let reward = move_reward(after, None);
            total_reward += reward;
            self.learner.update(Transition::new(
                encoder::fingerprint(&before),
                uci.as_str(),
                reward,
                encoder::fingerprint(after),
            ));
            moves.push(uci);
        }

        let result = game.outcome().map_or(GameResult::Draw, Outcome::result);
        Ok(Some(GameRecord::new(
            moves,
            result,
            total_reward,
            game.position().fen(),
        )))
    }

    fn persist(&mut self, games: &[GameRecord], run: &RunSummary) -> Result<(), EngineError> {
        let stored: Vec<StoredGame> = games.iter().map(StoredGame::from_record).collect();
        let summary = TrainingSummary {
            run: run.clone(),
            hyperparameters: self.learner.params().clone(),
            epsilon: self.learner.epsilon(),
            positions_evaluated: self.learner.positions_evaluated(),
            timestamp: Utc::now(),
        };
        self.store.save_batch(&stored, &summary).map_err(|err| {
            error!(games = stored.len(), error = %err, "failed to save self-play batch");
            EngineError::from(err)
        })
    }

    pub fn training_stats(&self) -> TrainingStats {
        TrainingStats {
            epsilon: self.learner.epsilon(),
            positions_evaluated: self.learner.positions_evaluated(),
            ..self.stats.clone()
        }
    }

    pub fn set_hyperparameters(&mut self, update: HyperparameterUpdate) -> Result<(), ConfigError> {
        self.learner.set_hyperparameters(update)?;
        info!(?update, "hyperparameters updated");
        Ok(())
    }

    /// Handle that stops a running self-play or ingestion when triggered.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn learner(&self) -> &QLearner {
        &self.learner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
#[path = "self_play_tests.rs"]
mod self_play_tests;
