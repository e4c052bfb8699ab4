//! Hyperparameters and application configuration, loadable from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Default capacity of the replay buffer.
pub const REPLAY_CAPACITY: usize = 2000;

/// Learning hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Exploration rate; decays towards `epsilon_min` after every update.
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Learning rate for single-transition updates. Replay passes use half.
    pub alpha: f64,
    pub batch_size: usize,
    /// Replay passes start once the buffer holds this many transitions.
    pub min_replay_size: usize,
    pub replay_capacity: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            epsilon: 0.1,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
            gamma: 0.95,
            alpha: 0.01,
            batch_size: 32,
            min_replay_size: 64,
            replay_capacity: REPLAY_CAPACITY,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_epsilon("epsilon", self.epsilon)?;
        check_epsilon("epsilon_min", self.epsilon_min)?;
        if self.epsilon_min > self.epsilon {
            return Err(ConfigError::Validation(
                "hyperparameters.epsilon_min must be <= hyperparameters.epsilon".into(),
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(ConfigError::Validation(
                "hyperparameters.epsilon_decay must be in (0, 1]".into(),
            ));
        }
        check_gamma(self.gamma)?;
        check_alpha(self.alpha)?;
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "hyperparameters.batch_size must be > 0".into(),
            ));
        }
        if self.replay_capacity < self.batch_size {
            return Err(ConfigError::Validation(
                "hyperparameters.replay_capacity must be >= hyperparameters.batch_size".into(),
            ));
        }
        if self.min_replay_size > self.replay_capacity {
            return Err(ConfigError::Validation(
                "hyperparameters.min_replay_size must be <= hyperparameters.replay_capacity"
                    .into(),
            ));
        }
        Ok(())
    }
}

fn check_epsilon(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "hyperparameters.{name} must be in [0, 1]"
        )));
    }
    Ok(())
}

fn check_gamma(gamma: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&gamma) {
        return Err(ConfigError::Validation(
            "hyperparameters.gamma must be in [0, 1]".into(),
        ));
    }
    Ok(())
}

fn check_alpha(alpha: f64) -> Result<(), ConfigError> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(ConfigError::Validation(
            "hyperparameters.alpha must be in (0, 1]".into(),
        ));
    }
    Ok(())
}

/// Runtime adjustment of the three caller-tunable hyperparameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HyperparameterUpdate {
    pub epsilon: Option<f64>,
    pub alpha: Option<f64>,
    pub gamma: Option<f64>,
}

impl HyperparameterUpdate {
    pub fn is_empty(&self) -> bool {
        self.epsilon.is_none() && self.alpha.is_none() && self.gamma.is_none()
    }

    /// Checks every provided value without applying anything.
    pub fn validate(&self, current: &Hyperparameters) -> Result<(), ConfigError> {
        if let Some(epsilon) = self.epsilon {
            check_epsilon("epsilon", epsilon)?;
            if epsilon < current.epsilon_min {
                return Err(ConfigError::Validation(format!(
                    "hyperparameters.epsilon must be >= epsilon_min ({})",
                    current.epsilon_min
                )));
            }
        }
        if let Some(alpha) = self.alpha {
            check_alpha(alpha)?;
        }
        if let Some(gamma) = self.gamma {
            check_gamma(gamma)?;
        }
        Ok(())
    }
}

/// Which stored games are replayed by history ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Every stored game.
    #[default]
    All,
    /// Only the `recent_games` most recent games.
    Recent,
}

/// Self-play settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    /// Games reaching this many plies are scored as draws.
    pub max_plies: u32,
    /// A position occurring this many times ends the game as a draw.
    pub repetition_limit: u8,
    /// Seed for exploration, evaluation jitter and replay sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// History replayed at the start of every run.
    pub history_mode: HistoryMode,
    pub recent_games: usize,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            max_plies: 200,
            repetition_limit: 5,
            seed: None,
            history_mode: HistoryMode::All,
            recent_games: 50,
        }
    }
}

/// Game store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: PathBuf::from("games.json"),
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hyperparameters: Hyperparameters,
    pub self_play: SelfPlayConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hyperparameters.validate()?;

        if self.self_play.max_plies == 0 {
            return Err(ConfigError::Validation(
                "self_play.max_plies must be > 0".into(),
            ));
        }
        if self.self_play.repetition_limit < 2 {
            return Err(ConfigError::Validation(
                "self_play.repetition_limit must be >= 2".into(),
            ));
        }
        if self.self_play.history_mode == HistoryMode::Recent && self.self_play.recent_games == 0
        {
            return Err(ConfigError::Validation(
                "self_play.recent_games must be > 0 in recent mode".into(),
            ));
        }
        Ok(())
    }

    /// TOML text with every default value, for writing a starter config.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
