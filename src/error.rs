use std::path::PathBuf;

use crate::engine::Move;

/// Errors raised while constructing containers and collections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("container capacity must be at least 1")]
    ZeroCapacity,

    #[error("empty color label in container {container} at position {position}")]
    EmptyLabel { container: usize, position: usize },

    #[error("container {container}: {reason}")]
    MalformedContainer { container: usize, reason: String },

    #[error("cannot generate a puzzle: {0}")]
    Generation(String),
}

impl BuildError {
    /// Attributes a per-container error to the container at `index` of a collection.
    pub(crate) fn in_container(self, index: usize) -> Self {
        match self {
            BuildError::EmptyLabel { position, .. } => BuildError::EmptyLabel {
                container: index,
                position,
            },
            BuildError::MalformedContainer { reason, .. } => BuildError::MalformedContainer {
                container: index,
                reason,
            },
            other => other,
        }
    }
}

/// Errors raised when applying a move to a collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("invalid move {0}")]
    Invalid(Move),
}

/// Error returned when an algorithm name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown algorithm '{0}' (expected DFS or A*)")]
pub struct ParseAlgorithmError(pub String);

/// Errors that can occur while loading a puzzle file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported puzzle file {0} (expected .json or .txt)")]
    UnsupportedExtension(PathBuf),

    #[error("failed to read puzzle file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON puzzle: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid puzzle format on line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("invalid puzzle: {0}")]
    Build(#[from] BuildError),
}

/// Errors that can occur when loading configuration.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::EmptyLabel {
            container: 2,
            position: 1,
        };
        assert_eq!(
            err.to_string(),
            "empty color label in container 2 at position 1"
        );
    }

    #[test]
    fn test_move_error_carries_move() {
        let err = MoveError::Invalid(Move::new(1, 1));
        assert_eq!(err.to_string(), "invalid move (1, 1)");
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::UnsupportedExtension(PathBuf::from("puzzle.yaml"));
        assert_eq!(
            err.to_string(),
            "unsupported puzzle file puzzle.yaml (expected .json or .txt)"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("default_capacity must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: default_capacity must be >= 1"
        );
    }
}
