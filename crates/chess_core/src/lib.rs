//! Chess rules for the learning engine.
//!
//! Move generation and legality come from `cozy-chess`; this crate wraps it
//! in the handful of queries the learner needs (terminal detection, castling
//! rights, UCI move strings in a canonical order) and adds game bookkeeping
//! such as repetition counting and result tags.

pub mod game;
pub mod position;
pub mod stop;
pub mod types;

pub use game::*;
pub use position::*;
pub use stop::StopSignal;
pub use types::*;

// Board primitives are re-exported so downstream crates never depend on
// cozy-chess directly.
pub use cozy_chess::{Color, File, Move, Piece, Rank, Square};
