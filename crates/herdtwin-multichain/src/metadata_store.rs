//! Metadata upload
//!
//! Pins the token metadata document to content-addressed storage and
//! returns the URI the chains will carry. Upload failure is survivable:
//! the service falls back to a deterministic, content-hashed gateway URI
//! so primary and mirrors still reference identical content.

use async_trait::async_trait;
use herdtwin_core::{MetadataUri, MultichainError, TokenMetadata};
use serde::Deserialize;

/// Upload seam the service depends on
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Pin the document, returning its canonical URI
    async fn upload(&self, metadata: &TokenMetadata) -> Result<MetadataUri, MultichainError>;
}

/// Pinata pin-API configuration
#[derive(Clone, Debug)]
pub struct PinataConfig {
    pub base_url: String,
    pub api_key: String,
    pub secret_api_key: String,
}

impl PinataConfig {
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.pinata.cloud".to_string(),
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// HTTP client for the Pinata JSON pin API
pub struct PinataClient {
    http: reqwest::Client,
    config: PinataConfig,
}

impl PinataClient {
    pub fn new(config: PinataConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MetadataStore for PinataClient {
    async fn upload(&self, metadata: &TokenMetadata) -> Result<MetadataUri, MultichainError> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_api_key)
            .json(metadata)
            .send()
            .await
            .map_err(|e| MultichainError::MetadataUpload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MultichainError::MetadataUpload(format!(
                "pin API returned {}",
                response.status()
            )));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| MultichainError::MetadataUpload(e.to_string()))?;

        Ok(MetadataUri::new(format!("ipfs://{}", pinned.ipfs_hash)))
    }
}

/// Deterministic fallback URI for a metadata document.
///
/// Content-addressed over the serialized document, so re-deriving it
/// for a mirror yields the same URI the primary got.
pub fn fallback_uri(
    metadata: &TokenMetadata,
    gateway_base: &str,
) -> Result<MetadataUri, MultichainError> {
    let bytes =
        serde_json::to_vec(metadata).map_err(|e| MultichainError::MetadataUpload(e.to_string()))?;
    let digest = blake3::hash(&bytes);
    Ok(MetadataUri::new(format!(
        "{}/api/metadata/{}",
        gateway_base,
        hex::encode(digest.as_bytes())
    )))
}
