//! Broadcast configuration
//!
//! Values resolve in order: built-in defaults, then a TOML file, then
//! `HERALD_*` environment variables, then whatever the caller sets explicitly.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "HERALD_";

/// Default size of the delivery worker pool
pub const DEFAULT_MAX_CONCURRENT_DELIVERIES: usize = 20;

/// Default deadline for resolving and delivering to a single node
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 10_000;

/// Configuration for broadcast fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Maximum number of deliveries in flight at once
    pub max_concurrent_deliveries: usize,
    /// Per-node deadline in milliseconds
    pub delivery_timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            max_concurrent_deliveries: DEFAULT_MAX_CONCURRENT_DELIVERIES,
            delivery_timeout_ms: DEFAULT_DELIVERY_TIMEOUT_MS,
        }
    }
}

impl BroadcastConfig {
    /// Override the worker pool size
    pub fn with_max_concurrent_deliveries(mut self, max: usize) -> Self {
        self.max_concurrent_deliveries = max;
        self
    }

    /// Override the per-node deadline
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Per-node deadline
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    /// Load configuration from a TOML file. Missing fields keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Apply `HERALD_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `HERALD_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let invalid = || ConfigError::InvalidEnv {
                key: key.to_string(),
                value: value.to_string(),
            };
            match name {
                "MAX_CONCURRENT_DELIVERIES" => {
                    self.max_concurrent_deliveries = value.trim().parse().map_err(|_| invalid())?;
                }
                "DELIVERY_TIMEOUT_MS" => {
                    self.delivery_timeout_ms = value.trim().parse().map_err(|_| invalid())?;
                }
                _ => tracing::debug!(key, "Ignoring unknown configuration variable"),
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_deliveries == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_deliveries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.delivery_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "delivery_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = BroadcastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delivery_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_concurrent_deliveries = 4").unwrap();

        let config = BroadcastConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.max_concurrent_deliveries, 4);
        assert_eq!(config.delivery_timeout_ms, DEFAULT_DELIVERY_TIMEOUT_MS);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_concurrent_deliveries = \"many\"").unwrap();

        let result = BroadcastConfig::load_from_file(file.path());
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = BroadcastConfig::load_from_file(Path::new("/nonexistent/herald.toml"));
        assert_matches!(result, Err(ConfigError::Read { .. }));
    }

    #[test]
    fn env_overrides_apply_and_unrelated_vars_are_skipped() {
        let mut config = BroadcastConfig::default();
        config
            .merge_with_vars([
                ("HERALD_MAX_CONCURRENT_DELIVERIES", "64"),
                ("HERALD_DELIVERY_TIMEOUT_MS", "1500"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();

        assert_eq!(config.max_concurrent_deliveries, 64);
        assert_eq!(config.delivery_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn unparsable_env_override_is_rejected() {
        let mut config = BroadcastConfig::default();
        let result = config.merge_with_vars([("HERALD_DELIVERY_TIMEOUT_MS", "soon")]);
        assert_matches!(result, Err(ConfigError::InvalidEnv { key, .. }) if key == "HERALD_DELIVERY_TIMEOUT_MS");
    }

    #[test]
    fn zero_concurrency_fails_validation() {
        let config = BroadcastConfig::default().with_max_concurrent_deliveries(0);
        assert_matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "max_concurrent_deliveries",
                ..
            })
        );
    }
}
