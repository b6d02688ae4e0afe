use serde::Deserialize;

use crate::Error;
use crate::Result;

/// Event source parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Interval between store re-list passes (unit: milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl SourceConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` when the poll interval is zero.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig("source.poll_interval_ms cannot be 0".into()));
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    2_000
}
