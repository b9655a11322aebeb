//! Polling REST client for the whale tracker API.

use crate::{error::DataError, source::DataSource};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use whale_analytics::{Dataset, PageRequest, Record, StatusResponse, dataset::TRADES_PAGE_SIZE};

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the whale tracker API
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries for dataset requests after the first attempt
    pub retries: u32,
    /// Retries for the liveness check after the first attempt
    pub status_retries: u32,
    /// Delay between attempts
    pub retry_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(10),
            retries: 2,
            status_retries: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl ApiConfig {
    /// Create a new configuration with custom base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Read configuration from the environment, falling back to defaults
    ///
    /// - `WHALE_API_BASE_URL` (default: http://localhost:8000)
    /// - `WHALE_API_TIMEOUT_SECS` (default: 10)
    /// - `WHALE_API_RETRIES` (default: 2)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var("WHALE_API_BASE_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("WHALE_API_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retries: std::env::var("WHALE_API_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retries),
            ..defaults
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set dataset retries
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set delay between attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// HTTP implementation of [`DataSource`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, DataError> {
        let mut base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DataError::InvalidUrl(config.base_url.clone()));
        }

        // Relative joins must extend the base path, not replace its last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Resolve the request URL for one load of `dataset`.
    pub fn endpoint(&self, dataset: Dataset, page: Option<PageRequest>) -> Result<Url, DataError> {
        let mut url = match dataset {
            Dataset::Markets => self.base_url.join("home")?,
            Dataset::Whales => self.base_url.join("whales")?,
            Dataset::Trades => self.base_url.join("trades")?,
        };

        if dataset.is_paginated() {
            let page = page.unwrap_or(PageRequest {
                skip: 0,
                limit: TRADES_PAGE_SIZE,
            });
            url.query_pairs_mut()
                .append_pair("skip", &page.skip.to_string())
                .append_pair("limit", &page.limit.to_string());
        }

        Ok(url)
    }

    /// GET `url`, retrying retryable failures up to `retries` times.
    async fn get_json(&self, url: &Url, retries: u32) -> Result<Value, DataError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(error) if error.is_retryable() && attempt < retries => {
                    attempt += 1;
                    warn!(%url, attempt, %error, "Request failed, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<Value, DataError> {
        debug!(%url, "GET");

        let response = self
            .http
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            return Err(DataError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_else(|error| {
            warn!(%url, %error, "Response body is not JSON, treating as empty");
            Value::Null
        }))
    }
}

#[async_trait]
impl DataSource for ApiClient {
    async fn status(&self) -> Result<StatusResponse, DataError> {
        let body = self.get_json(&self.base_url, self.config.status_retries).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    async fn fetch_records(
        &self,
        dataset: Dataset,
        page: Option<PageRequest>,
    ) -> Result<Vec<Record>, DataError> {
        let url = self.endpoint(dataset, page)?;
        let body = self.get_json(&url, self.config.retries).await?;

        if !body.is_array() {
            warn!(%dataset, %url, "Response is not an array, treating as empty");
        }

        Ok(Record::collect(body))
    }
}
