//! Resource set configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of grid partitions per interval index.
pub const DEFAULT_INTERVAL_PARTITIONS: usize = 64;

/// The environment variable used to override the partition count.
pub const PARTITIONS_ENV: &str = "ENGINE_RESOURCE_PARTITIONS";

/// Tuning for the indices built by a [`ResourceSet`](crate::ResourceSet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSetConfig {
    /// Grid partitions per interval index. Values below 1 are treated as 1.
    pub interval_partitions: usize,
}

impl ResourceSetConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the environment, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().with_partitions_override(std::env::var(PARTITIONS_ENV).ok().as_deref())
    }

    /// Override the number of interval grid partitions.
    #[must_use]
    pub fn with_interval_partitions(mut self, partitions: usize) -> Self {
        self.interval_partitions = partitions.max(1);
        self
    }

    fn with_partitions_override(self, raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return self;
        };
        match raw.trim().parse::<usize>() {
            Ok(partitions) => self.with_interval_partitions(partitions),
            Err(e) => {
                warn!(var = PARTITIONS_ENV, value = raw, %e, "ignoring invalid partition count");
                self
            }
        }
    }
}

impl Default for ResourceSetConfig {
    fn default() -> Self {
        Self {
            interval_partitions: DEFAULT_INTERVAL_PARTITIONS,
        }
    }
}
