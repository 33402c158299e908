//! Search context configuration.
//!
//! Selects the index strategy and tunes it. Values are layered:
//!
//! 1. Environment variables (`POINT_SEARCH_*`)
//! 2. Default values

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "POINT_SEARCH_";

/// Default number of points per k-d tree leaf.
pub const DEFAULT_LEAF_SIZE: usize = 32;

/// Largest accepted leaf size.
pub const MAX_LEAF_SIZE: usize = 4096;

/// Which index structure backs a point store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStrategy {
    /// k-d tree with per-node minimum rank, searched best-first by rank.
    #[default]
    RankedKdTree,
    /// R*-tree envelope query reduced to the lowest ranks.
    RTree,
    /// Rank-sorted array scanned until enough matches are found.
    RankScan,
}

impl IndexStrategy {
    /// Configuration name of the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RankedKdTree => "ranked_kd_tree",
            Self::RTree => "r_tree",
            Self::RankScan => "rank_scan",
        }
    }
}

/// Configuration for building a point store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Index structure to build.
    pub strategy: IndexStrategy,
    /// Maximum points per k-d tree leaf. Ignored by other strategies.
    pub leaf_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: IndexStrategy::default(),
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

impl SearchConfig {
    /// Create a configuration for the given strategy with default tuning.
    #[must_use]
    pub fn with_strategy(strategy: IndexStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Loads configuration from defaults and `POINT_SEARCH_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `leaf_size` is outside `[1, 4096]`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LEAF_SIZE).contains(&self.leaf_size) {
            return Err(Error::InvalidConfig {
                key: "leaf_size".to_string(),
                message: format!(
                    "value {} is out of range [1, {MAX_LEAF_SIZE}]",
                    self.leaf_size
                ),
            });
        }
        Ok(())
    }
}
