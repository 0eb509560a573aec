//! Ontology child-term cache configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::search::invalid;

/// How many term-children entries can stay in memory.
const fn default_capacity() -> u64 {
    30_000
}

/// Seconds after insertion before an entry is evicted, no matter what.
const fn default_time_to_live_secs() -> u64 {
    10_000
}

/// Seconds an entry survives without being read.
const fn default_time_to_idle_secs() -> u64 {
    3_600
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChildCacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: u64,

    #[serde(default = "default_time_to_live_secs")]
    pub time_to_live_secs: u64,

    #[serde(default = "default_time_to_idle_secs")]
    pub time_to_idle_secs: u64,
}

impl Default for ChildCacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            time_to_live_secs: default_time_to_live_secs(),
            time_to_idle_secs: default_time_to_idle_secs(),
        }
    }
}

impl ChildCacheConfig {
    #[must_use]
    pub const fn time_to_live(&self) -> Duration {
        Duration::from_secs(self.time_to_live_secs)
    }

    #[must_use]
    pub const fn time_to_idle(&self) -> Duration {
        Duration::from_secs(self.time_to_idle_secs)
    }

    /// Reject cache settings that would make every lookup a miss.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero capacity, zero TTL,
    /// zero TTI, or a TTI longer than the TTL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(invalid("cache.capacity", "must be positive"));
        }
        if self.time_to_live_secs == 0 {
            return Err(invalid("cache.time_to_live_secs", "must be positive"));
        }
        if self.time_to_idle_secs == 0 {
            return Err(invalid("cache.time_to_idle_secs", "must be positive"));
        }
        if self.time_to_idle_secs > self.time_to_live_secs {
            return Err(invalid(
                "cache.time_to_idle_secs",
                "must not exceed time_to_live_secs",
            ));
        }
        Ok(())
    }
}
