//! Game bookkeeping on top of [`Position`]: ply count, repetitions and the
//! terminal conditions that end a self-play game.

use std::collections::HashMap;

use cozy_chess::{Color, Move};

use crate::position::Position;
use crate::types::{GameResult, PositionError};

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// `winner` delivered mate.
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    Repetition,
    /// The game hit the configured ply cap.
    MaxPlies,
}

impl Outcome {
    pub fn result(self) -> GameResult {
        match self {
            Outcome::Checkmate { winner } => GameResult::won_by(winner),
            _ => GameResult::Draw,
        }
    }
}

/// A game in progress from the standard starting position.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    plies: u32,
    max_plies: u32,
    repetition_limit: u8,
    seen: HashMap<u64, u8>,
}

impl Game {
    pub fn new(max_plies: u32, repetition_limit: u8) -> Self {
        Self::from_position(Position::startpos(), max_plies, repetition_limit)
    }

    pub fn from_position(position: Position, max_plies: u32, repetition_limit: u8) -> Self {
        let mut seen = HashMap::new();
        seen.insert(position.key(), 1);
        Self {
            position,
            plies: 0,
            max_plies,
            repetition_limit,
            seen,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn plies(&self) -> u32 {
        self.plies
    }

    pub fn play(&mut self, mv: Move) -> Result<(), PositionError> {
        self.position = self.position.apply(mv)?;
        self.plies += 1;
        *self.seen.entry(self.position.key()).or_insert(0) += 1;
        Ok(())
    }

    /// Terminal condition of the current position, if any.
    ///
    /// Checked in order: checkmate, stalemate, insufficient material,
    /// fifty-move rule, repetition, ply cap.
    pub fn outcome(&self) -> Option<Outcome> {
        let pos = &self.position;
        if !pos.has_legal_moves() {
            return Some(if pos.in_check() {
                Outcome::Checkmate {
                    winner: opponent(pos.side_to_move()),
                }
            } else {
                Outcome::Stalemate
            });
        }
        if pos.is_insufficient_material() {
            return Some(Outcome::InsufficientMaterial);
        }
        if pos.is_fifty_move_draw() {
            return Some(Outcome::FiftyMoveRule);
        }
        let repeats = self.seen.get(&pos.key()).copied().unwrap_or(0);
        if repeats >= self.repetition_limit {
            return Some(Outcome::Repetition);
        }
        if self.plies >= self.max_plies {
            return Some(Outcome::MaxPlies);
        }
        None
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }
}

fn opponent(color: Color) -> Color {
    match color {
        Color::White => Color::Black,
        Color::Black => Color::White,
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
