//! HTTP transport built on reqwest.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

/// Fetches remote resources with a client configured once at construction.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build the underlying client.
    ///
    /// Certificate validation is relaxed only for this client, and only when
    /// `config.accept_invalid_certs` is set.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| Error::Precondition(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` and return the body. Non-2xx responses are transport errors.
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!("GET {url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("GET {url}: reading body: {e}")))?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}
