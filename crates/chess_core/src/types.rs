use std::fmt;
use std::str::FromStr;

use cozy_chess::Color;

/// Errors raised while turning caller input into board state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("invalid FEN '{0}'")]
    InvalidFen(String),

    #[error("illegal move '{uci}' in position '{fen}'")]
    IllegalMove { uci: String, fen: String },

    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    #[error("unknown result tag '{0}'")]
    UnknownResult(String),
}

/// Final result of a game, written with the PGN result tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub const ALL: [GameResult; 3] = [GameResult::WhiteWins, GameResult::BlackWins, GameResult::Draw];

    pub fn tag(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        }
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Draw => None,
        }
    }

    pub fn loser(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::Black),
            GameResult::BlackWins => Some(Color::White),
            GameResult::Draw => None,
        }
    }

    /// Result in which `color` is the side that delivered mate.
    pub fn won_by(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GameResult {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-0" => Ok(GameResult::WhiteWins),
            "0-1" => Ok(GameResult::BlackWins),
            "1/2-1/2" => Ok(GameResult::Draw),
            other => Err(PositionError::UnknownResult(other.to_string())),
        }
    }
}

/// Castling availability for one side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastlingRights {
    pub kingside: bool,
    pub queenside: bool,
}

impl CastlingRights {
    /// Number of rights still held (0..=2).
    pub fn count(self) -> i32 {
        self.kingside as i32 + self.queenside as i32
    }
}

/// +1 for White, -1 for Black. Values in the learner are kept from White's side.
pub fn color_sign(color: Color) -> f64 {
    match color {
        Color::White => 1.0,
        Color::Black => -1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_tags_parse() {
        for result in GameResult::ALL {
            assert_eq!(result.tag().parse::<GameResult>().unwrap(), result);
        }
    }

    #[test]
    fn test_unknown_result_tag_rejected() {
        let err = "*".parse::<GameResult>().unwrap_err();
        assert_eq!(err, PositionError::UnknownResult("*".to_string()));
    }

    #[test]
    fn test_winner_and_loser() {
        assert_eq!(GameResult::WhiteWins.winner(), Some(Color::White));
        assert_eq!(GameResult::WhiteWins.loser(), Some(Color::Black));
        assert_eq!(GameResult::Draw.winner(), None);
        assert_eq!(GameResult::Draw.loser(), None);
    }
}
