use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use super::HttpFetcher;
use crate::Error;
use crate::FetchError;
use crate::HttpConfig;
use crate::Result;

/// reqwest-backed fetcher with request and connect timeouts applied.
///
/// A hung upstream would otherwise block the single worker loop forever,
/// since a reconcile in flight cannot be cancelled.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Fatal(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &Url) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::BodyRead(e.to_string()))?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        String::from_utf8(body.to_vec()).map_err(|e| FetchError::BodyRead(e.to_string()))
    }
}
