use serde::Deserialize;

use crate::Error;
use crate::Result;

/// Outbound HTTP client parameters.
///
/// The reference behavior this crate reimplements set no request timeout;
/// that left the single worker loop hostage to a hung upstream, so timeouts
/// are mandatory here.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout (unit: milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Connection establishment timeout (unit: milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// User-Agent header sent with every fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` when a timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig("http.request_timeout_ms cannot be 0".into()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::InvalidConfig("http.connect_timeout_ms cannot be 0".into()));
        }
        Ok(())
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_user_agent() -> String {
    format!("confetch/{}", env!("CARGO_PKG_VERSION"))
}
