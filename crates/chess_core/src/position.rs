//! Position wrapper around a `cozy_chess::Board`.

use std::fmt;

use cozy_chess::{Board, Color, File, Move, Piece, Square};

use crate::types::{CastlingRights, PositionError};

/// A legal chess position.
///
/// Construction always validates, so every `Position` seen by the engine is
/// well formed; malformed FEN is rejected at the boundary with
/// [`PositionError::InvalidFen`].
#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Board::from_fen(fen.trim(), false)
            .map(|board| Self { board })
            .map_err(|_| PositionError::InvalidFen(fen.to_string()))
    }

    /// FEN of this position.
    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn halfmove_clock(&self) -> u8 {
        self.board.halfmove_clock()
    }

    /// Zobrist-style key for repetition tracking.
    pub fn key(&self) -> u64 {
        self.board.hash()
    }

    /// All legal moves, sorted by their UCI string.
    ///
    /// The sort gives callers a stable enumeration order independent of the
    /// generator's internal piece order, so ties between equally valued moves
    /// always resolve the same way.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves.sort_by_cached_key(|&mv| self.uci(mv));
        moves
    }

    /// Number of legal moves (mobility), without sorting.
    pub fn legal_move_count(&self) -> usize {
        let mut count = 0;
        self.board.generate_moves(|piece_moves| {
            count += piece_moves.into_iter().count();
            false
        });
        count
    }

    pub fn has_legal_moves(&self) -> bool {
        // The listener aborts generation on the first batch of moves.
        self.board.generate_moves(|_| true)
    }

    /// Legal moves of the piece standing on `square`, as UCI strings.
    pub fn legal_moves_from(&self, square: &str) -> Result<Vec<String>, PositionError> {
        let from = parse_square(square)?;
        Ok(self
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from)
            .map(|mv| self.uci(mv))
            .collect())
    }

    /// Standard UCI notation for a legal move of this position.
    ///
    /// cozy-chess encodes castling as king-takes-own-rook; it is rewritten
    /// here to the usual king-two-squares form (`e1g1`, `e8c8`).
    pub fn uci(&self, mv: Move) -> String {
        let mut mv = mv;
        let side = self.board.side_to_move();
        if self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(side)
        {
            let file = if mv.to.file() as usize > mv.from.file() as usize {
                File::G
            } else {
                File::C
            };
            mv.to = Square::new(file, mv.from.rank());
        }
        mv.to_string()
    }

    /// Resolves a UCI string against the legal moves of this position.
    pub fn parse_uci(&self, uci: &str) -> Result<Move, PositionError> {
        let uci = uci.trim();
        self.legal_moves()
            .into_iter()
            .find(|&mv| self.uci(mv) == uci)
            .ok_or_else(|| PositionError::IllegalMove {
                uci: uci.to_string(),
                fen: self.fen(),
            })
    }

    /// Returns the position after `mv`. The move must be legal.
    pub fn apply(&self, mv: Move) -> Result<Position, PositionError> {
        if !self.board.is_legal(mv) {
            return Err(PositionError::IllegalMove {
                uci: mv.to_string(),
                fen: self.fen(),
            });
        }
        let mut board = self.board.clone();
        board.play_unchecked(mv);
        Ok(Position { board })
    }

    /// Returns the position after the move written in UCI notation.
    pub fn play_uci(&self, uci: &str) -> Result<Position, PositionError> {
        let mv = self.parse_uci(uci)?;
        self.apply(mv)
    }

    pub fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_moves()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && !self.has_legal_moves()
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// only bishops that all stand on squares of one colour.
    pub fn is_insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }

        let knights = b.pieces(Piece::Knight);
        let bishops = b.pieces(Piece::Bishop);
        if knights.len() + bishops.len() <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }

        let mut shades = bishops
            .into_iter()
            .map(|sq| (sq.file() as usize + sq.rank() as usize) % 2);
        match shades.next() {
            Some(first) => shades.all(|shade| shade == first),
            None => true,
        }
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.board.halfmove_clock() >= 100
    }

    pub fn castling_rights(&self, color: Color) -> CastlingRights {
        let rights = self.board.castle_rights(color);
        CastlingRights {
            kingside: rights.short.is_some(),
            queenside: rights.long.is_some(),
        }
    }

    /// Piece standing on a square given as `"e4"`.
    pub fn piece_at(&self, square: &str) -> Result<Option<(Color, Piece)>, PositionError> {
        let sq = parse_square(square)?;
        Ok(self.piece_on(sq))
    }

    pub fn piece_on(&self, sq: Square) -> Option<(Color, Piece)> {
        Some((self.board.color_on(sq)?, self.board.piece_on(sq)?))
    }

    /// Every piece on the board with its square.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Color, Piece)> + '_ {
        Color::ALL.into_iter().flat_map(move |color| {
            Piece::ALL.into_iter().flat_map(move |piece| {
                self.board
                    .colored_pieces(color, piece)
                    .into_iter()
                    .map(move |sq| (sq, color, piece))
            })
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

fn parse_square(square: &str) -> Result<Square, PositionError> {
    square
        .trim()
        .parse::<Square>()
        .map_err(|_| PositionError::InvalidSquare(square.to_string()))
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
