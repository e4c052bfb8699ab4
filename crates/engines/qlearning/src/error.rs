use std::path::PathBuf;

use chess_core::PositionError;

/// Errors that can occur when loading or changing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors raised by a game store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("game store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode game store {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode game store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("batch of {games} games was not committed: {reason}")]
    Rejected { games: usize, reason: String },
}

/// Errors surfaced by the learning engine.
///
/// Invalid positions and malformed history records are recoverable: callers
/// substitute a neutral value or skip the record and keep going. Store and
/// configuration failures are fatal for the operation that hit them.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Position(#[from] PositionError),

    #[error("malformed game record #{index}: {reason}")]
    MalformedGame { index: usize, reason: String },

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Position(_) | EngineError::MalformedGame { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("alpha must be in (0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: alpha must be in (0, 1]"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Rejected {
            games: 3,
            reason: "disk full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "batch of 3 games was not committed: disk full"
        );
    }

    #[test]
    fn test_recoverable_split() {
        let bad_fen = EngineError::from(PositionError::InvalidFen("x".into()));
        assert!(bad_fen.is_recoverable());

        let malformed = EngineError::MalformedGame {
            index: 2,
            reason: "empty move list".into(),
        };
        assert!(malformed.is_recoverable());
        assert_eq!(
            malformed.to_string(),
            "malformed game record #2: empty move list"
        );

        let store = EngineError::from(StoreError::Rejected {
            games: 1,
            reason: "offline".into(),
        });
        assert!(!store.is_recoverable());
    }
}
