//! Position encoder: turns a position into the fingerprint used as the value
//! store key.
//!
//! The fingerprint is the FEN followed by a combined heuristic score rounded
//! to two decimals, e.g. `"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1:2.00"`.
//!
//! Two material scales are in use. The centipawn scale feeds the fingerprint
//! score and the unit scale feeds the fallback value of a position seen for
//! the first time (see `QLearner::evaluate`).

use std::fmt;

use chess_core::{color_sign, Color, Position};
use serde::{Deserialize, Serialize};

use crate::pst;

/// Centipawn piece values, indexed by `Piece as usize`.
/// Order: Pawn, Knight, Bishop, Rook, Queen, King
pub const CENTIPAWN_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20000];

/// Unit piece values used by the fallback evaluator. Kings count nothing.
pub const UNIT_VALUES: [i32; 6] = [1, 3, 3, 5, 9, 0];

const PST_SCALE: f64 = 0.01;
const MOBILITY_SCALE: f64 = 0.1;
const CHECK_BONUS: f64 = 10.0;
const CASTLING_WEIGHT: f64 = 5.0;

/// Value store key for a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Fingerprint(s.to_string())
    }
}

/// White-minus-Black material on the given scale.
pub fn material(pos: &Position, values: &[i32; 6]) -> i32 {
    pos.pieces()
        .map(|(_, color, piece)| {
            let v = values[piece as usize];
            if color == Color::White { v } else { -v }
        })
        .sum()
}

/// Sum of piece-square bonuses, unscaled.
pub fn positional(pos: &Position) -> i32 {
    pos.pieces()
        .map(|(sq, color, piece)| pst::square_bonus(color, piece, sq))
        .sum()
}

/// Combined heuristic score embedded in the fingerprint.
pub fn score(pos: &Position) -> f64 {
    let side = pos.side_to_move();

    let material = material(pos, &CENTIPAWN_VALUES) as f64;
    let positional = positional(pos) as f64 * PST_SCALE;
    let mobility = color_sign(side) * pos.legal_move_count() as f64 * MOBILITY_SCALE;
    // Applied whichever side is in check.
    let check = if pos.in_check() { CHECK_BONUS } else { 0.0 };
    let castling = CASTLING_WEIGHT
        * (pos.castling_rights(Color::White).count() - pos.castling_rights(Color::Black).count())
            as f64;

    material + positional + mobility + check + castling
}

pub fn fingerprint(pos: &Position) -> Fingerprint {
    Fingerprint(format!("{}:{:.2}", pos.fen(), score(pos)))
}

/// Material on the unit scale (pawn = 1 .. queen = 9).
pub fn unit_material(pos: &Position) -> i32 {
    material(pos, &UNIT_VALUES)
}

#[cfg(test)]
#[path = "encoder_tests.rs"]
mod encoder_tests;
