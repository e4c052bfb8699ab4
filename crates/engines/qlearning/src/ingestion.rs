//! Replays stored games into the learner.
//!
//! Each game is replayed from the initial position. Every move becomes a
//! transition in the replay buffer, and the position it produced is nudged
//! towards the recorded outcome. No single-step updates are applied and
//! epsilon is not touched; learning happens through scheduled replay passes.

use std::str::FromStr;

use chess_core::{GameResult, Position, StopSignal};
use tracing::{debug, info, warn};

use crate::encoder::{self, Fingerprint};
use crate::error::EngineError;
use crate::learner::QLearner;
use crate::replay_buffer::Transition;
use crate::reward::{history_nudge, move_reward};
use crate::store::StoredGame;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Games replayed in full.
    pub processed: usize,
    /// Malformed records that were skipped.
    pub skipped: usize,
    /// Transitions added to the replay buffer.
    pub transitions: usize,
    /// Transitions replayed by batch passes.
    pub batch_updates: usize,
    pub cancelled: bool,
}

struct Step {
    transition: Transition,
    nudge: Option<(Fingerprint, f64)>,
}

/// Replays `games` (most recent first) into `learner`.
///
/// Malformed records are logged and skipped. The stop signal is checked
/// before each game; a cancelled run skips the final replay passes.
pub fn ingest_history(
    learner: &mut QLearner,
    games: &[StoredGame],
    stop: &StopSignal,
) -> IngestReport {
    let mut report = IngestReport::default();
    if games.is_empty() {
        return report;
    }

    let interval = train_interval(games.len());
    let passes = passes_per_trigger(learner.params().batch_size);

    for (index, game) in games.iter().enumerate() {
        if stop.is_stopped() {
            report.cancelled = true;
            break;
        }

        let steps = match replay_game(index, game) {
            Ok(steps) => steps,
            Err(err) => {
                warn!(game = %game.id, error = %err, "skipping stored game");
                report.skipped += 1;
                continue;
            }
        };

        report.transitions += steps.len();
        for step in steps {
            if let Some((key, delta)) = step.nudge {
                learner.nudge(&key, delta);
            }
            learner.remember(step.transition);
        }
        report.processed += 1;
        debug!(game = %game.id, moves = game.moves.len(), "ingested game");

        if report.processed % interval == 0 {
            for _ in 0..passes {
                report.batch_updates += learner.replay_pass();
            }
        }
    }

    if report.processed > 0 && !report.cancelled {
        for _ in 0..final_passes(learner.replay().len()) {
            report.batch_updates += learner.replay_pass();
        }
    }

    info!(
        processed = report.processed,
        skipped = report.skipped,
        transitions = report.transitions,
        batch_updates = report.batch_updates,
        cancelled = report.cancelled,
        "history ingestion finished"
    );
    report
}

/// Validates a whole game before anything is committed.
fn replay_game(index: usize, game: &StoredGame) -> Result<Vec<Step>, EngineError> {
    let malformed = |reason: String| EngineError::MalformedGame { index, reason };

    let result = GameResult::from_str(&game.result).map_err(|e| malformed(e.to_string()))?;
    if game.moves.is_empty() {
        return Err(malformed("empty move list".to_string()));
    }

    let last = game.moves.len() - 1;
    let mut pos = Position::startpos();
    let mut steps = Vec::with_capacity(game.moves.len());

    for (i, uci) in game.moves.iter().enumerate() {
        let mover = pos.side_to_move();
        let after = pos
            .play_uci(uci)
            .map_err(|e| malformed(format!("move {}: {e}", i + 1)))?;

        let reward = move_reward(&after, (i == last).then_some(result));
        let next_state = encoder::fingerprint(&after);
        let nudge = history_nudge(mover, result).map(|delta| (next_state.clone(), delta));

        steps.push(Step {
            transition: Transition::new(encoder::fingerprint(&pos), uci.as_str(), reward, next_state),
            nudge,
        });
        pos = after;
    }
    Ok(steps)
}

/// Games between scheduled replay triggers, by corpus size.
fn train_interval(total_games: usize) -> usize {
    match total_games {
        0..=100 => 10,
        101..=500 => 25,
        _ => 50,
    }
}

/// Larger batches get fewer passes per trigger.
fn passes_per_trigger(batch_size: usize) -> usize {
    if batch_size >= 64 { 2 } else { 3 }
}

fn final_passes(buffer_len: usize) -> usize {
    match buffer_len {
        0..=500 => 5,
        501..=1000 => 4,
        _ => 3,
    }
}

#[cfg(test)]
#[path = "ingestion_tests.rs"]
mod ingestion_tests;
