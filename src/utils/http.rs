//! HTTP client utilities.

use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Default user agent sent with every outbound request
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a client from the `[http]` configuration section
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Send a request, returning the response whatever its status.
    ///
    /// Upstream APIs report some failures in the body of a non-success
    /// response, so the caller always gets to parse it.
    pub async fn send(&self, request: RequestBuilder, source: &str) -> Result<Response, SourceError> {
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch from {}: {}", source, e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(source, %status, url = %response.url(), "upstream response");
        } else {
            tracing::warn!(source, %status, url = %response.url(), "upstream returned non-success status");
        }

        Ok(response)
    }
}
