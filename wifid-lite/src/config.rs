//! Configuration for a session

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WifiDError};

/// Heartbeat delays below this have not been exercised against real radios
pub const RECOMMENDED_MIN_HEARTBEAT_SECS: u64 = 5;

/// Main configuration for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds between two heartbeat discovery requests
    pub heartbeat_delay_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_delay_secs: RECOMMENDED_MIN_HEARTBEAT_SECS,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Set the heartbeat delay in seconds
    pub fn with_heartbeat_delay_secs(mut self, secs: u64) -> Self {
        self.heartbeat_delay_secs = secs;
        self
    }

    /// Heartbeat period as a `Duration`
    pub fn heartbeat_delay(&self) -> Duration {
        Duration::from_secs(self.heartbeat_delay_secs)
    }

    /// Check that the configuration can drive a session
    ///
    /// A zero delay is rejected. Delays below
    /// [`RECOMMENDED_MIN_HEARTBEAT_SECS`] are accepted with a warning.
    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_delay_secs == 0 {
            return Err(WifiDError::InvalidConfig(
                "heartbeat delay must be at least 1 second".to_string(),
            ));
        }
        if self.heartbeat_delay_secs < RECOMMENDED_MIN_HEARTBEAT_SECS {
            tracing::warn!(
                "Heartbeat delay of {}s is below the recommended {}s",
                self.heartbeat_delay_secs,
                RECOMMENDED_MIN_HEARTBEAT_SECS
            );
        }
        Ok(())
    }
}
