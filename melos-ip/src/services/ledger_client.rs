//! IP ledger client
//!
//! Mint/register/license/royalty calls against the on-chain IP registry,
//! consumed through a ledger gateway. Calls block until the gateway observes
//! on-chain confirmation, bounded by an explicit request timeout. Ledger
//! calls are never retried automatically: resubmission risks duplicate
//! on-chain state, so failures surface to the caller as-is.

use crate::models::LicenseTermsParams;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "melos/0.1.0 (https://github.com/melos-audio/melos)";

/// Ledger client errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Ledger error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Mint-and-register call parameters
#[derive(Debug, Clone, Serialize)]
pub struct MintAndRegisterRequest {
    pub spg_contract: String,
    pub ip_metadata_uri: String,
    pub ip_metadata_hash: String,
    pub nft_metadata_uri: String,
    pub nft_metadata_hash: String,
    pub license_terms: LicenseTermsParams,
    pub recipient: String,
}

/// Mint-and-register result, assigned by the ledger
#[derive(Debug, Clone, Deserialize)]
pub struct MintAndRegisterResponse {
    pub tx_hash: String,
    pub ip_id: String,
    pub license_terms_ids: Vec<String>,
    #[serde(default)]
    pub token_id: Option<u64>,
}

/// Derivative registration parameters
#[derive(Debug, Clone, Serialize)]
pub struct RegisterDerivativeRequest {
    pub parent_ip_ids: Vec<String>,
    pub license_terms_ids: Vec<String>,
    pub ip_metadata_uri: String,
    pub ip_metadata_hash: String,
    pub nft_metadata_uri: String,
    pub nft_metadata_hash: String,
    pub recipient: String,
}

/// Derivative registration result
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDerivativeResponse {
    pub tx_hash: String,
    pub ip_id: String,
}

/// Revenue claim parameters
#[derive(Debug, Clone, Serialize)]
pub struct ClaimRevenueRequest {
    pub ancestor_ip_id: String,
    pub claimer: String,
    pub child_ip_ids: Vec<String>,
    pub royalty_policies: Vec<String>,
    pub currency_tokens: Vec<String>,
}

/// Revenue claim result
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimRevenueResponse {
    pub claimed_tokens: i64,
}

/// License token mint parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintLicenseTokensRequest {
    pub licensor_ip_id: String,
    pub license_terms_id: String,
    pub amount: u32,
    pub max_minting_fee: u64,
    pub max_revenue_share: u8,
    pub receiver: String,
}

/// License token mint result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintLicenseTokensResponse {
    pub tx_hash: String,
    pub license_token_ids: Vec<String>,
}

/// IP ledger boundary
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn mint_and_register(
        &self,
        request: MintAndRegisterRequest,
    ) -> Result<MintAndRegisterResponse, LedgerError>;

    async fn register_derivative(
        &self,
        request: RegisterDerivativeRequest,
    ) -> Result<RegisterDerivativeResponse, LedgerError>;

    async fn claim_revenue(
        &self,
        request: ClaimRevenueRequest,
    ) -> Result<ClaimRevenueResponse, LedgerError>;

    async fn mint_license_tokens(
        &self,
        request: MintLicenseTokensRequest,
    ) -> Result<MintLicenseTokensResponse, LedgerError>;
}

/// HTTP ledger gateway client
pub struct HttpLedgerClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl HttpLedgerClient {
    /// `timeout` bounds the on-chain confirmation wait
    pub fn new(api_base: String, timeout: Duration) -> Result<Self, LedgerError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base,
        })
    }

    async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp, LedgerError> {
        let url = format!("{}{}", self.api_base, path);

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| LedgerError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LedgerError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Ledger for HttpLedgerClient {
    async fn mint_and_register(
        &self,
        request: MintAndRegisterRequest,
    ) -> Result<MintAndRegisterResponse, LedgerError> {
        tracing::info!(
            spg_contract = %request.spg_contract,
            "Submitting mint-and-register to ledger"
        );
        let response: MintAndRegisterResponse =
            self.post("/assets/mint-register", &request).await?;
        tracing::info!(
            ip_id = %response.ip_id,
            tx_hash = %response.tx_hash,
            "Ledger registration confirmed"
        );
        Ok(response)
    }

    async fn register_derivative(
        &self,
        request: RegisterDerivativeRequest,
    ) -> Result<RegisterDerivativeResponse, LedgerError> {
        tracing::info!(
            parents = request.parent_ip_ids.len(),
            "Submitting derivative registration to ledger"
        );
        self.post("/derivatives/register", &request).await
    }

    async fn claim_revenue(
        &self,
        request: ClaimRevenueRequest,
    ) -> Result<ClaimRevenueResponse, LedgerError> {
        tracing::info!(
            ancestor_ip_id = %request.ancestor_ip_id,
            children = request.child_ip_ids.len(),
            "Submitting revenue claim to ledger"
        );
        self.post("/royalties/claim", &request).await
    }

    async fn mint_license_tokens(
        &self,
        request: MintLicenseTokensRequest,
    ) -> Result<MintLicenseTokensResponse, LedgerError> {
        tracing::info!(
            licensor_ip_id = %request.licensor_ip_id,
            amount = request.amount,
            "Minting license tokens"
        );
        self.post("/licenses/mint", &request).await
    }
}
