//! Controller Error Hierarchy
//!
//! Defines error types for the reconciliation controller, categorized by
//! operational concern: configuration, store access, fetch transport and the
//! reconcile protocol itself.

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading/merging failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Semantic configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Record store access failures
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Per-record reconcile failures
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Background task join failures
    #[error("Task failed: {0}")]
    TaskJoin(#[from] JoinError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Failures raised by a [`ConfigStore`](crate::ConfigStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record does not (or no longer does) exist in the store
    #[error("record {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    /// Backend-specific failure (connection loss, serialization, ...)
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Classified outcome of a single outbound fetch attempt.
///
/// The reconciler owns the user-facing message formats; these variants only
/// carry the classification and the raw detail.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection-level failure before any response arrived
    #[error("{0}")]
    Transport(String),

    /// Response arrived with a non-200 status
    #[error("status code: {0}")]
    Status(u16),

    /// Response arrived with a zero-length body
    #[error("empty response body")]
    EmptyBody,

    /// Response body could not be read or decoded
    #[error("{0}")]
    BodyRead(String),
}

/// A failed reconcile attempt.
///
/// The `#[error]` strings are the contract: the same text is written into the
/// report event and returned to the controller loop, so they must not drift.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("annotation value '{raw}' does not match expected format key=url")]
    MalformedDirective { raw: String },

    #[error("invalid url provided: {raw}")]
    InvalidUrl { raw: String },

    #[error("failed to curl {url}, got error: {detail}")]
    FetchTransport { url: String, detail: String },

    #[error("failed to curl {url}, got status code: {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("empty response body from {url}")]
    EmptyResponseBody { url: String },

    #[error("failed to read response body: {detail}")]
    ReadResponseBody { detail: String },

    #[error("failed to update configmap: {detail}")]
    UpdateFailed { detail: String },
}

impl ReconcileError {
    /// Maps a classified fetch failure onto the reconcile message protocol.
    pub(crate) fn from_fetch(url: &str, e: FetchError) -> Self {
        match e {
            FetchError::Transport(detail) => ReconcileError::FetchTransport {
                url: url.to_string(),
                detail,
            },
            FetchError::Status(status) => ReconcileError::FetchStatus {
                url: url.to_string(),
                status,
            },
            FetchError::EmptyBody => ReconcileError::EmptyResponseBody {
                url: url.to_string(),
            },
            FetchError::BodyRead(detail) => ReconcileError::ReadResponseBody { detail },
        }
    }
}
