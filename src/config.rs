use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults so embedders can run without one.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path.as_ref()).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(toml::from_str(&contents)?)
    }
}

// ============================================================================
// Scheduler settings
// ============================================================================

/// Deployment knobs for the prompt scheduler.
///
/// Timing *semantics* (session timeout, exchange caps, catch-up windows) are
/// constants in their owning modules, not settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// How often the scheduler loop wakes, in seconds.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Days of inactivity before a user is considered for reengagement.
    #[serde(default = "default_reengagement_threshold")]
    pub reengagement_threshold_days: i64,

    /// Server-local hour at which the daily reengagement pass re-arms.
    #[serde(default = "default_reengagement_hour")]
    pub reengagement_hour: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            reengagement_threshold_days: default_reengagement_threshold(),
            reengagement_hour: default_reengagement_hour(),
        }
    }
}

// ============================================================================
// Private Helpers (Serde Defaults)
// ============================================================================

fn default_check_interval() -> u64 {
    60
}

fn default_reengagement_threshold() -> i64 {
    14
}

fn default_reengagement_hour() -> u32 {
    14
}

// ============================================================================
// Tests
// ============================================================================
