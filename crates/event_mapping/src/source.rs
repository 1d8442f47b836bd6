//! Mapping feed collaborator.

use std::time::Duration;

use async_trait::async_trait;
use common::{Error, Result};
use serde::Deserialize;
use tracing::debug;

/// Where raw mapping payloads come from.
#[async_trait]
pub trait MappingSource: Send + Sync {
    /// Fetch the current raw payload.
    ///
    /// `Ok(None)` means no update is available this cycle; it is not an error.
    async fn fetch_mappings(&self) -> Result<Option<String>>;
}

/// Body of the mappings endpoint.
#[derive(Debug, Deserialize)]
pub struct MappingsResponse {
    #[serde(default)]
    pub mappings: Option<String>,
}

/// Decode a mappings response body. An absent or empty `mappings` field
/// is "no update".
pub fn parse_mappings_response(body: &str) -> Result<Option<String>> {
    let response: MappingsResponse = serde_json::from_str(body)?;
    Ok(response.mappings.filter(|m| !m.trim().is_empty()))
}

/// Fetches mappings over HTTP from the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpMappingSource {
    client: reqwest::Client,
    url: String,
}

impl HttpMappingSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("sports-mapper/0.1")
            .pool_max_idle_per_host(2)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MappingSource for HttpMappingSource {
    async fn fetch_mappings(&self) -> Result<Option<String>> {
        debug!("Fetching mappings: {}", self.url);

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {}: {e}", self.url)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!(
                "GET {} returned {}: {}",
                self.url,
                status.as_u16(),
                body
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Http(format!("GET {} body: {e}", self.url)))?;
        parse_mappings_response(&body)
    }
}
