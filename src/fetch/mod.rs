//! The outbound HTTP seam used by the reconciler.
//!
//! One directive resolves to at most one GET. The trait returns the full
//! response body text or a classified [`FetchError`]; the reconciler turns
//! the classification into its message protocol.

mod client;


#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use url::Url;

pub use client::*;

use crate::FetchError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpFetcher: Send + Sync + 'static {
    /// Issues a single GET against `url` and returns the response body text.
    async fn get(&self, url: &Url) -> std::result::Result<String, FetchError>;
}
