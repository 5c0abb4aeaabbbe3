//! Verification service API client
//!
//! Submits token registrations to the content fingerprinting and
//! infringement detection service and fetches asynchronous job status.
//! Requests are JSON over HTTPS with a fixed API-key header.

use crate::models::{BrandAuthorization, SubmitAck, VerificationRequest, VerificationResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

const USER_AGENT: &str = "melos/0.1.0 (https://github.com/melos-audio/melos)";
const API_KEY_HEADER: &str = "x-api-key";
const RATE_LIMIT_MS: u64 = 334; // 3 requests per second
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Verification client errors
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Verification service error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// Verification service boundary
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Submit a token registration for analysis
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmitAck, VerificationError>;

    /// Fetch current verification state for a token
    async fn fetch_status(&self, token_id: &str) -> Result<VerificationResult, VerificationError>;

    /// Record a brand authorization for a token
    async fn authorize(
        &self,
        token_id: &str,
        authorization: &BrandAuthorization,
    ) -> Result<(), VerificationError>;
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Verification rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// HTTP verification service client
pub struct VerificationClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    api_base: String,
    api_key: String,
}

impl VerificationClient {
    pub fn new(api_base: String, api_key: String) -> Result<Self, VerificationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VerificationError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            api_base,
            api_key,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, VerificationError> {
        let status = response.status();

        if status == 401 {
            return Err(VerificationError::InvalidApiKey);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VerificationError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl VerificationApi for VerificationClient {
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmitAck, VerificationError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/tokens", self.api_base);

        tracing::debug!(
            token_id = %request.token_id,
            media_count = request.media.len(),
            "Submitting token registration to verification service"
        );

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| VerificationError::NetworkError(e.to_string()))?;

        let ack: SubmitAck = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VerificationError::ParseError(e.to_string()))?;

        tracing::info!(token_id = %ack.token_id, "Token registration accepted");
        Ok(ack)
    }

    async fn fetch_status(&self, token_id: &str) -> Result<VerificationResult, VerificationError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/tokens/{}/status", self.api_base, token_id);

        tracing::debug!(token_id = %token_id, "Fetching verification status");

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| VerificationError::NetworkError(e.to_string()))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VerificationError::ParseError(e.to_string()))
    }

    async fn authorize(
        &self,
        token_id: &str,
        authorization: &BrandAuthorization,
    ) -> Result<(), VerificationError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/tokens/{}/authorizations", self.api_base, token_id);

        tracing::debug!(token_id = %token_id, "Recording brand authorization");

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(authorization)
            .send()
            .await
            .map_err(|e| VerificationError::NetworkError(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = VerificationClient::new(
            "https://verify.example/v1".to_string(),
            "test_key".to_string(),
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(334);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait().await;
        }
        let elapsed = start.elapsed();

        // Two waits of ~334ms between three requests
        assert!(elapsed >= Duration::from_millis(600));
        assert!(elapsed < Duration::from_secs(1));
    }
}
