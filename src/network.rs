//! Network abstraction and the default `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::request::{FetchRequest, Response};

/// Abstraction over outgoing fetches for testability.
///
/// An `Err` means the network could not produce a response at all. HTTP error
/// statuses such as 404 are still responses and come back as `Ok`.
#[async_trait]
pub trait Network: Send + Sync {
    /// Performs the request.
    async fn fetch(&self, request: &FetchRequest) -> Result<Response>;
}

/// Default network implementation backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<Response> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::Network(format!("invalid method {}: {e}", request.method)))?;

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes().await?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
