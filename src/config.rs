use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::ConfigError;
use crate::solver::SearchLimits;

/// Container capacity used when a puzzle file does not specify one.
pub const DEFAULT_CAPACITY: usize = 4;

/// Solver configuration, loadable from TOML.
///
/// ```toml
/// default_capacity = 4
/// max_expansions = 500000
/// time_limit_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Capacity given to every container when the puzzle does not set one.
    pub default_capacity: usize,
    /// Maximum number of states a search may expand.
    pub max_expansions: Option<usize>,
    /// Wall-clock limit for a single search, in seconds.
    pub time_limit_secs: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            default_capacity: DEFAULT_CAPACITY,
            max_expansions: None,
            time_limit_secs: None,
        }
    }
}

impl SolverConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: SolverConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_capacity == 0 {
            return Err(ConfigError::Validation(
                "default_capacity must be >= 1".into(),
            ));
        }
        if self.max_expansions == Some(0) {
            return Err(ConfigError::Validation(
                "max_expansions must be > 0 when set".into(),
            ));
        }
        if self.time_limit_secs == Some(0) {
            return Err(ConfigError::Validation(
                "time_limit_secs must be > 0 when set".into(),
            ));
        }
        Ok(())
    }

    /// Search limits for a search starting now.
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_expansions: self.max_expansions,
            deadline: self
                .time_limit_secs
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }
}
