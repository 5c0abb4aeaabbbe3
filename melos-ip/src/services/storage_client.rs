//! Storage gateway client
//!
//! Uploads JSON documents and binary payloads to the content-addressed
//! store and returns the content identifier. Retrieval URLs are rendered by
//! string templating over the public gateway base. Upload failures are not
//! retried inside the pipeline; only the verification step has a retry
//! policy.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "melos/0.1.0 (https://github.com/melos-audio/melos)";
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Storage gateway client errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Gateway error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Content-addressed storage boundary
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Upload a JSON document, returning its content identifier
    async fn upload_json(&self, document: &serde_json::Value) -> Result<String, GatewayError>;

    /// Upload raw bytes, returning the content identifier
    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, GatewayError>;
}

/// Retrieval URL for a content identifier
pub fn content_url(public_base: &str, content_id: &str) -> String {
    format!("{}/{}", public_base.trim_end_matches('/'), content_id)
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    content_id: String,
}

/// HTTP storage gateway client
pub struct GatewayClient {
    http_client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GatewayClient {
    pub fn new(api_base: String, api_key: String) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base,
            api_key,
        })
    }

    async fn read_content_id(response: reqwest::Response) -> Result<String, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ApiError(status.as_u16(), body));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ParseError(e.to_string()))?;
        Ok(upload.content_id)
    }
}

#[async_trait]
impl StorageGateway for GatewayClient {
    async fn upload_json(&self, document: &serde_json::Value) -> Result<String, GatewayError> {
        let url = format!("{}/uploads/json", self.api_base);

        tracing::debug!(url = %url, "Uploading JSON document to storage gateway");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(document)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        let content_id = Self::read_content_id(response).await?;
        tracing::info!(content_id = %content_id, "JSON document stored");
        Ok(content_id)
    }

    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/uploads/file", self.api_base);

        tracing::debug!(
            url = %url,
            filename = %filename,
            size = bytes.len(),
            "Uploading file to storage gateway"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .header("x-filename", filename)
            .body(bytes)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        let content_id = Self::read_content_id(response).await?;
        tracing::info!(content_id = %content_id, filename = %filename, "File stored");
        Ok(content_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GatewayClient::new(
            "https://store.example/api".to_string(),
            "key".to_string(),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_content_url_templating() {
        assert_eq!(
            content_url("https://content.example", "bafy123"),
            "https://content.example/bafy123"
        );
        // Trailing slash must not double up
        assert_eq!(
            content_url("https://content.example/", "bafy123"),
            "https://content.example/bafy123"
        );
    }
}
