//! Reward for a single move, computed from the position right after it.
//!
//! Rewards are signed from White's side, like the values they train:
//! - checkmate: +100 when White delivered it, -100 when Black did
//! - stalemate or insufficient material: 0
//! - check: +1 when Black is now in check, -1 when White is
//! - the last move of a stored game: +10 / -10 towards the recorded winner,
//!   0 for a recorded draw. A mover who matches the winner earns the bonus
//!   for their own color, so the sign is simply the winner's color.
//! - anything else: 0

use chess_core::{color_sign, Color, GameResult, Position};

pub const MATE_REWARD: f64 = 100.0;
pub const CHECK_REWARD: f64 = 1.0;
pub const OUTCOME_BONUS: f64 = 10.0;

/// `final_result` is set only for the last move of a replayed game.
pub fn move_reward(after: &Position, final_result: Option<GameResult>) -> f64 {
    let to_move = after.side_to_move();

    if after.is_checkmate() {
        // The side now to move is mated; the mover delivered it.
        return -color_sign(to_move) * MATE_REWARD;
    }
    if after.is_stalemate() || after.is_insufficient_material() {
        return 0.0;
    }
    if after.in_check() {
        return -color_sign(to_move) * CHECK_REWARD;
    }

    match final_result.and_then(GameResult::winner) {
        Some(winner) => color_sign(winner) * OUTCOME_BONUS,
        None => 0.0,
    }
}

/// Value nudge applied to the position a mover produced in a stored game:
/// +0.1 when the mover went on to win, -0.1 when they lost, nothing for draws.
pub fn history_nudge(mover: Color, result: GameResult) -> Option<f64> {
    const NUDGE: f64 = 0.1;
    if result.winner() == Some(mover) {
        Some(NUDGE)
    } else if result.loser() == Some(mover) {
        Some(-NUDGE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn test_mate_rewards() {
        // Black delivered mate, White to move.
        let fools = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(move_reward(&fools, None), -100.0);

        // White delivered mate, Black to move.
        let scholars = pos("r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4");
        assert_eq!(move_reward(&scholars, None), 100.0);
        // Mate outranks the final-move bonus.
        assert_eq!(move_reward(&scholars, Some(GameResult::BlackWins)), 100.0);
    }

    #[test]
    fn test_draw_positions_are_zero() {
        let stalemate = pos("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
        assert_eq!(move_reward(&stalemate, Some(GameResult::WhiteWins)), 0.0);

        let bare = pos("8/8/8/4k3/8/4K3/8/8 b - - 0 1");
        assert_eq!(move_reward(&bare, None), 0.0);
    }

    #[test]
    fn test_check_rewards() {
        let black_in_check = pos("4k3/8/8/8/8/8/8/4RK2 b - - 0 1");
        assert_eq!(move_reward(&black_in_check, None), 1.0);

        let white_in_check = pos("4rk2/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(move_reward(&white_in_check, None), -1.0);
    }

    #[test]
    fn test_final_move_bonus() {
        let quiet = Position::startpos().play_uci("e2e4").unwrap();
        assert_eq!(move_reward(&quiet, None), 0.0);
        assert_eq!(move_reward(&quiet, Some(GameResult::WhiteWins)), 10.0);
        assert_eq!(move_reward(&quiet, Some(GameResult::BlackWins)), -10.0);
        assert_eq!(move_reward(&quiet, Some(GameResult::Draw)), 0.0);
    }

    #[test]
    fn test_final_move_bonus_by_black() {
        // Black made the last move; a Black win still reads -10 from White's side.
        let quiet = Position::startpos()
            .play_uci("e2e4")
            .and_then(|p| p.play_uci("e7e5"))
            .unwrap();
        assert_eq!(move_reward(&quiet, Some(GameResult::BlackWins)), -10.0);
        assert_eq!(move_reward(&quiet, Some(GameResult::WhiteWins)), 10.0);
    }

    #[test]
    fn test_history_nudge() {
        assert_eq!(history_nudge(Color::White, GameResult::WhiteWins), Some(0.1));
        assert_eq!(history_nudge(Color::Black, GameResult::WhiteWins), Some(-0.1));
        assert_eq!(history_nudge(Color::Black, GameResult::BlackWins), Some(0.1));
        assert_eq!(history_nudge(Color::White, GameResult::Draw), None);
    }
}
