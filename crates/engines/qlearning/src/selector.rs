//! Epsilon-greedy move choice with one-ply lookahead.
//!
//! Candidates are the legal moves in UCI order, so exploitation ties go to
//! the alphabetically first move.

use chess_core::{Color, Move, Position, PositionError};
use rand::seq::SliceRandom;
use tracing::warn;

use crate::learner::QLearner;

/// Result of a move selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveChoice {
    /// UCI string of the chosen move, `None` when there are no legal moves.
    pub best_move: Option<String>,
    pub confidence: f64,
    /// Whether the move came from the exploration branch.
    pub explored: bool,
}

impl MoveChoice {
    pub(crate) fn none() -> Self {
        MoveChoice {
            best_move: None,
            confidence: 0.0,
            explored: false,
        }
    }
}

impl QLearner {
    /// Picks a move for the side to move.
    ///
    /// A lone legal move is returned with confidence 1.0 without rolling for
    /// exploration. Exploration reports the chosen move's resulting value as
    /// its confidence; exploitation reports how far the best move stands from
    /// the worst, normalised by the spread.
    pub fn select_move(&mut self, pos: &Position) -> MoveChoice {
        let moves = pos.legal_moves();
        match moves.as_slice() {
            [] => return MoveChoice::none(),
            [only] => {
                return MoveChoice {
                    best_move: Some(pos.uci(*only)),
                    confidence: 1.0,
                    explored: false,
                };
            }
            _ => {}
        }

        let result = if self.roll() < self.epsilon() {
            self.explore(pos, &moves)
        } else {
            self.exploit(pos, &moves)
        };

        match result {
            Ok(choice) => choice,
            Err(err) => {
                warn!(fen = %pos.fen(), error = %err, "move selection failed, playing a random move");
                let fallback = moves.choose(self.rng()).map(|mv| pos.uci(*mv));
                MoveChoice {
                    best_move: fallback,
                    confidence: 0.0,
                    explored: true,
                }
            }
        }
    }

    fn explore(&mut self, pos: &Position, moves: &[Move]) -> Result<MoveChoice, PositionError> {
        let Some(&mv) = moves.choose(self.rng()) else {
            return Ok(MoveChoice::none());
        };
        let after = pos.apply(mv)?;
        Ok(MoveChoice {
            best_move: Some(pos.uci(mv)),
            confidence: self.evaluate(&after),
            explored: true,
        })
    }

    fn exploit(&mut self, pos: &Position, moves: &[Move]) -> Result<MoveChoice, PositionError> {
        let white = pos.side_to_move() == Color::White;

        let mut best: Option<(Move, f64)> = None;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;

        for &mv in moves {
            let value = self.evaluate(&pos.apply(mv)?);
            max = max.max(value);
            min = min.min(value);

            let better = match best {
                None => true,
                Some((_, best_value)) if white => value > best_value,
                Some((_, best_value)) => value < best_value,
            };
            if better {
                best = Some((mv, value));
            }
        }

        let Some((mv, best_value)) = best else {
            return Ok(MoveChoice::none());
        };
        let spread = (max - min).max(1.0);
        let confidence = if white {
            (best_value - min) / spread
        } else {
            (max - best_value) / spread
        };

        Ok(MoveChoice {
            best_move: Some(pos.uci(mv)),
            confidence,
            explored: false,
        })
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
