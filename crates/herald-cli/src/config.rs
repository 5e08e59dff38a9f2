//! Broadcast configuration resolution for the CLI
//!
//! Precedence: defaults < config file < `HERALD_*` environment < flags.

use anyhow::{Context, Result};
use herald_core::BroadcastConfig;
use std::path::Path;
use std::time::Duration;

/// Values given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub max_concurrency: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// Resolve configuration: file, then `HERALD_*` environment, then flags
pub fn load_config(path: &Path, overrides: ConfigOverrides) -> Result<BroadcastConfig> {
    let mut config = file_config(path)?;
    config
        .merge_with_env()
        .context("Invalid environment override")?;
    apply_overrides(config, overrides)
}

fn file_config(path: &Path) -> Result<BroadcastConfig> {
    if path.exists() {
        Ok(BroadcastConfig::load_from_file(path)?)
    } else {
        tracing::debug!(path = %path.display(), "No config file; using defaults");
        Ok(BroadcastConfig::default())
    }
}

fn apply_overrides(mut config: BroadcastConfig, overrides: ConfigOverrides) -> Result<BroadcastConfig> {
    if let Some(max) = overrides.max_concurrency {
        config = config.with_max_concurrent_deliveries(max);
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config = config.with_delivery_timeout(Duration::from_millis(timeout_ms));
    }

    config.validate()?;
    Ok(config)
}
