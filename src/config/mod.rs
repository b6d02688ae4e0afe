//! Configuration management for the reconciliation controller.
//!
//! Layered loading with priority:
//! 1. Default values (hardcoded)
//! 2. Config file passed at startup
//! 3. `CONFETCH_CONFIG` file override
//! 4. Environment variables (highest priority)

mod http;
mod monitoring;
mod reconcile;
mod source;


pub use http::*;
pub use monitoring::*;
pub use reconcile::*;
pub use source::*;

//---
use std::env;
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ControllerConfig {
    /// Reconcile policy: which annotation carries the fetch directive
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Outbound HTTP client parameters
    #[serde(default)]
    pub http: HttpConfig,

    /// Event source parameters
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging and metrics settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl ControllerConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Hardcoded defaults
    /// 2. `config_path` file (required when given)
    /// 3. `CONFETCH_CONFIG` file override
    /// 4. Environment variables, `CONFETCH__SECTION__KEY` form
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        if let Ok(path) = env::var("CONFETCH_CONFIG") {
            builder = builder.add_source(File::with_name(&path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CONFETCH")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.reconcile.validate()?;
        self.http.validate()?;
        self.source.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }
}
