//! IPFS content store.
//!
//! Writes go through the node's HTTP API (`/api/v0/add`); reads go through a
//! public gateway first and fall back to `/api/v0/cat`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use fl_types::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// IPFS backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpfsConfig {
    /// IPFS API endpoint used for `add` and `cat`.
    pub api_endpoint: String,
    /// Gateway endpoint for reads.
    pub gateway_endpoint: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether to pin blobs on add.
    pub pin: bool,
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://127.0.0.1:5001".to_string(),
            gateway_endpoint: Some("http://127.0.0.1:8080".to_string()),
            timeout_secs: 30,
            pin: true,
        }
    }
}

/// `/api/v0/add` response.
#[derive(Debug, Clone, Deserialize)]
struct IpfsAddResponse {
    #[serde(rename = "Hash")]
    hash: String,
    #[serde(rename = "Size", default)]
    size: Option<String>,
}

/// Content store backed by an IPFS node.
pub struct IpfsContentStore {
    config: IpfsConfig,
    client: reqwest::Client,
}

impl IpfsContentStore {
    /// Create a new IPFS store. Does not contact the node.
    pub fn new(config: IpfsConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Configuration(format!("HTTP client error: {e}")))?;

        info!(endpoint = %config.api_endpoint, "IPFS content store configured");
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &IpfsConfig {
        &self.config
    }

    /// Check that the API endpoint answers.
    pub async fn verify_connection(&self) -> StoreResult<()> {
        let url = format!("{}/api/v0/id", self.config.api_endpoint);
        self.client
            .post(&url)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("IPFS connection failed: {e}")))?
            .error_for_status()
            .map_err(|e| StoreError::Unavailable(format!("IPFS API error: {e}")))?;
        Ok(())
    }

    async fn gateway_get(&self, gateway: &str, address: &Address) -> Option<Bytes> {
        let url = format!("{gateway}/ipfs/{address}");
        let response = self.client.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            debug!(status = %response.status(), %address, "gateway miss");
            return None;
        }
        response.bytes().await.ok()
    }

    async fn api_cat(&self, address: &Address) -> StoreResult<Bytes> {
        let url = format!("{}/api/v0/cat?arg={}", self.config.api_endpoint, address);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| StoreError::ReadFailed(format!("IPFS cat failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(address.clone()));
        }
        if !response.status().is_success() {
            return Err(StoreError::ReadFailed(format!(
                "IPFS cat returned {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| StoreError::ReadFailed(format!("failed to read IPFS content: {e}")))
    }
}

#[async_trait]
impl ContentStore for IpfsContentStore {
    async fn put(&self, data: Bytes) -> StoreResult<Address> {
        let url = format!(
            "{}/api/v0/add?pin={}",
            self.config.api_endpoint, self.config.pin
        );
        let len = data.len();
        let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name("data");
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("IPFS add failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::WriteFailed(format!(
                "IPFS add failed: {status} - {body}"
            )));
        }

        let added = response
            .json::<IpfsAddResponse>()
            .await
            .map_err(|e| StoreError::MalformedResponse(format!("IPFS add response: {e}")))?;
        let address = Address::new(added.hash)
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;

        debug!(%address, len, size = ?added.size, "IPFS add");
        Ok(address)
    }

    async fn get(&self, address: &Address) -> StoreResult<Bytes> {
        if let Some(gateway) = &self.config.gateway_endpoint {
            if let Some(bytes) = self.gateway_get(gateway, address).await {
                return Ok(bytes);
            }
        }
        self.api_cat(address).await
    }
}

impl std::fmt::Debug for IpfsContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpfsContentStore")
            .field("api_endpoint", &self.config.api_endpoint)
            .field("gateway_endpoint", &self.config.gateway_endpoint)
            .finish()
    }
}
