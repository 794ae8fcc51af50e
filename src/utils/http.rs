// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Source of raw page text.
///
/// The sync pipeline only ever talks to this trait, so tests can serve
/// canned pages and anti-bot handling stays inside the implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body as text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// [`PageFetcher`] backed by `reqwest`.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP status {status}")));
        }

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(HttpFetcher::from_config(&CrawlerConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let config = CrawlerConfig {
            timeout_secs: 1,
            ..CrawlerConfig::default()
        };
        let fetcher = HttpFetcher::from_config(&config).unwrap();

        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }
}
