//! Tabular Q-Learning Chess Engine
//!
//! Assigns a value to every position it has seen and improves those values
//! by playing against itself and by replaying stored games.
//!
//! # Architecture
//!
//! - **Encoder**: position to fingerprint (FEN plus a heuristic score)
//! - **Value store**: fingerprint to value, from White's side
//! - **Selector**: epsilon-greedy choice with one-ply lookahead
//! - **Learner**: Q-learning updates, replay buffer, epsilon decay
//! - **Ingestion**: replays stored games into the learner
//! - **Self-play**: plays and learns from full games, then saves them
//!
//! All learning state lives in one [`QLearner`] owned by a
//! [`SelfPlayTrainer`]; the game store is injected at construction.
//!
//! ```no_run
//! use qlearning_engine::{AppConfig, MemoryStore, SelfPlayTrainer};
//!
//! let mut trainer = SelfPlayTrainer::from_config(&AppConfig::default(), MemoryStore::new())?;
//! let report = trainer.run_self_play(5)?;
//! println!("{} games, {:.1}% draws", report.summary.games, report.summary.draw_pct);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod ingestion;
pub mod learner;
mod pst;
pub mod replay_buffer;
pub mod reward;
pub mod selector;
pub mod self_play;
pub mod stats;
pub mod store;
pub mod value_store;

pub use config::{AppConfig, HistoryMode, HyperparameterUpdate, Hyperparameters, SelfPlayConfig};
pub use encoder::Fingerprint;
pub use error::{ConfigError, EngineError, StoreError};
pub use ingestion::IngestReport;
pub use learner::QLearner;
pub use replay_buffer::{ReplayBuffer, Transition};
pub use selector::MoveChoice;
pub use self_play::{SelfPlayReport, SelfPlayTrainer};
pub use stats::{GameRecord, RunSummary, TrainingStats};
pub use store::{GameStore, JsonFileStore, MemoryStore, StoreAggregate, StoredGame, TrainingSummary};
pub use value_store::ValueStore;
