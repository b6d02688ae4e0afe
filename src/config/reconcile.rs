use serde::Deserialize;

use crate::constants::DEFAULT_DIRECTIVE_KEY;
use crate::Error;
use crate::Result;

/// Reconcile policy configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ReconcileConfig {
    /// Annotation key that carries the `key=url` fetch directive. This is the
    /// single piece of policy the reconciler depends on.
    #[serde(default = "default_directive_key")]
    pub directive_key: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            directive_key: default_directive_key(),
        }
    }
}

impl ReconcileConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` when the directive key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.directive_key.trim().is_empty() {
            return Err(Error::InvalidConfig("reconcile.directive_key cannot be empty".into()));
        }
        Ok(())
    }
}

fn default_directive_key() -> String {
    DEFAULT_DIRECTIVE_KEY.to_string()
}
