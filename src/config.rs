use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{dlog_debug, Result};

fn default_max_cascade_depth() -> usize {
    10
}

fn default_log_retention_days() -> i64 {
    30
}

/// Engine tuning knobs, loaded from a TOML file owned by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Maximum number of chained dispatches one mutation may cause before
    /// further triggering is recorded as an error and halted.
    #[serde(default = "default_max_cascade_depth")]
    pub max_cascade_depth: usize,
    /// Default retention window for execution log purges, in days.
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: default_max_cascade_depth(),
            log_retention_days: default_log_retention_days(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the given path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dlog_debug!("EngineConfig::load_from path={}", path.display());
        if !path.exists() {
            dlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        dlog_debug!(
            "Config loaded: max_cascade_depth={}, log_retention_days={}",
            config.max_cascade_depth,
            config.log_retention_days
        );
        Ok(config)
    }

    /// Save configuration to the given path, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        dlog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
