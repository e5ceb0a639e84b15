// # HTTP Config Source
//
// This crate provides an HTTP-backed configuration source.
//
// ## Purpose
//
// Lets the watcher follow a declarative document published by another
// service (a config server, an object store, a sidecar) instead of a local
// file. The document format is the same JSON as the file source.
//
// ## Architecture
//
// The source performs exactly one GET per `read()`. It does not poll, cache
// or compare on its own: cadence, short-circuiting and change detection all
// belong to the watcher.

use proxy_config_core::config::SourceConfig;
use proxy_config_core::traits::{ConfigSource, ConfigSourceFactory};
use proxy_config_core::{Error, Result, SourceRegistry};

use std::time::Duration;

/// Default request timeout for HTTP sources
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP-backed configuration source
pub struct HttpSource {
    /// URL to fetch the document from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a new HTTP source with the default timeout
    ///
    /// # Parameters
    ///
    /// - `url`: URL of the JSON document
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Get the source URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl ConfigSource for HttpSource {
    async fn read(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!(
                "GET {} returned HTTP {}",
                self.url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response body: {}", e)))?;

        tracing::trace!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Factory for creating HTTP sources
pub struct HttpSourceFactory;

impl ConfigSourceFactory for HttpSourceFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn ConfigSource>> {
        match config {
            SourceConfig::Http { url, timeout_secs } => Ok(Box::new(HttpSource::with_timeout(
                url.clone(),
                Duration::from_secs(*timeout_secs),
            )?)),
            _ => Err(Error::config("Invalid config for HTTP source")),
        }
    }
}

/// Register the HTTP source with a registry
pub fn register(registry: &SourceRegistry) {
    registry.register_source("http", Box::new(HttpSourceFactory));
}
