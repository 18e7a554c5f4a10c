//! Connection cache configuration.

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Default number of algorithm executions allowed to run at once.
const DEFAULT_MAX_CONCURRENT_RUNS: usize = 10;

/// Configuration for the connection cache.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CacheConfig {
    /// Whether stored connections may serve requests with equal parameters.
    ///
    /// When disabled every request recomputes and replaces the stored
    /// connection, which helps when debugging an algorithm.
    #[builder(default = "true")]
    #[cfg_attr(
        feature = "config",
        arg(
            long = "reuse-connections",
            env = "TANDEM_REUSE_CONNECTIONS",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    #[serde(default = "default_reuse_connections")]
    pub reuse_connections: bool,

    /// Maximum number of algorithm executions running in parallel.
    ///
    /// Applies across distinct identity pairs; a single pair never has more
    /// than one execution in flight regardless of this value.
    #[builder(default = "DEFAULT_MAX_CONCURRENT_RUNS")]
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-concurrent-runs",
            env = "TANDEM_MAX_CONCURRENT_RUNS",
            default_value_t = DEFAULT_MAX_CONCURRENT_RUNS
        )
    )]
    #[serde(default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: usize,
}

impl CacheConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(max) = self.max_concurrent_runs {
            check_max_concurrent_runs(max)?;
        }
        Ok(())
    }
}

impl CacheConfig {
    /// Returns a builder for creating a configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validates configuration values.
    ///
    /// Configurations parsed from the command line or deserialized bypass the
    /// builder, so the cache validates again before using one.
    pub fn validate(&self) -> Result<()> {
        check_max_concurrent_runs(self.max_concurrent_runs).map_err(Error::Config)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reuse_connections: true,
            max_concurrent_runs: DEFAULT_MAX_CONCURRENT_RUNS,
        }
    }
}

fn check_max_concurrent_runs(max: usize) -> std::result::Result<(), String> {
    if max == 0 {
        return Err("max_concurrent_runs must be at least 1".into());
    }
    if max > Semaphore::MAX_PERMITS {
        return Err(format!(
            "max_concurrent_runs must be at most {}",
            Semaphore::MAX_PERMITS
        ));
    }
    Ok(())
}

const fn default_reuse_connections() -> bool {
    true
}

const fn default_max_concurrent_runs() -> usize {
    DEFAULT_MAX_CONCURRENT_RUNS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        let config = CacheConfig::builder().build().unwrap();

        assert_eq!(config, CacheConfig::default());
        assert!(config.reuse_connections);
        assert_eq!(config.max_concurrent_runs, 10);
    }

    #[test]
    fn test_builder_rejects_zero_runs() {
        let result = CacheConfig::builder().max_concurrent_runs(0usize).build();

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_runs() {
        let config = CacheConfig {
            max_concurrent_runs: 0,
            ..CacheConfig::default()
        };

        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config, CacheConfig::default());
    }
}
