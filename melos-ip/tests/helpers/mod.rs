//! Shared test fixtures: mock collaborators and sample inputs

#![allow(dead_code)]

use async_trait::async_trait;
use melos_common::config::Endpoints;
use melos_common::events::EventBus;
use melos_ip::config::ServiceConfig;
use melos_ip::models::{
    AssetMetadata, BrandAuthorization, Creator, ExternalInfringement, FetchStatus,
    InfringementResult, InfringementStatus, MediaStatus, SubmitAck, VerificationRequest,
    VerificationResult,
};
use melos_ip::services::{
    GatewayError, Ledger, LedgerError, StorageGateway, VerificationApi, VerificationError,
};
use melos_ip::services::ledger_client::{
    ClaimRevenueRequest, ClaimRevenueResponse, MintAndRegisterRequest, MintAndRegisterResponse,
    MintLicenseTokensRequest, MintLicenseTokensResponse, RegisterDerivativeRequest,
    RegisterDerivativeResponse,
};
use melos_ip::AppState;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Storage gateway mock counting uploads
#[derive(Default)]
pub struct MockGateway {
    pub uploads: AtomicUsize,
}

impl MockGateway {
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageGateway for MockGateway {
    async fn upload_json(&self, _document: &serde_json::Value) -> Result<String, GatewayError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("bafy-test-{}", n))
    }

    async fn upload_bytes(
        &self,
        _bytes: Vec<u8>,
        _filename: &str,
        _mime_type: &str,
    ) -> Result<String, GatewayError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("bafy-test-{}", n))
    }
}

/// Ledger mock counting calls and assigning sequential identifiers
#[derive(Default)]
pub struct MockLedger {
    pub mint_calls: AtomicUsize,
    pub derivative_calls: AtomicUsize,
    pub claim_calls: AtomicUsize,
    pub license_calls: AtomicUsize,
}

impl MockLedger {
    pub fn mint_count(&self) -> usize {
        self.mint_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn mint_and_register(
        &self,
        _request: MintAndRegisterRequest,
    ) -> Result<MintAndRegisterResponse, LedgerError> {
        let n = self.mint_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MintAndRegisterResponse {
            tx_hash: format!("0xtx{}", n),
            ip_id: format!("0xip{}", n),
            license_terms_ids: vec!["42".to_string()],
            token_id: Some(n as u64),
        })
    }

    async fn register_derivative(
        &self,
        _request: RegisterDerivativeRequest,
    ) -> Result<RegisterDerivativeResponse, LedgerError> {
        let n = self.derivative_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RegisterDerivativeResponse {
            tx_hash: format!("0xdtx{}", n),
            ip_id: format!("0xchild{}", n),
        })
    }

    async fn claim_revenue(
        &self,
        _request: ClaimRevenueRequest,
    ) -> Result<ClaimRevenueResponse, LedgerError> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ClaimRevenueResponse {
            claimed_tokens: 350,
        })
    }

    async fn mint_license_tokens(
        &self,
        request: MintLicenseTokensRequest,
    ) -> Result<MintLicenseTokensResponse, LedgerError> {
        self.license_calls.fetch_add(1, Ordering::SeqCst);
        Ok(MintLicenseTokensResponse {
            tx_hash: "0xltx1".to_string(),
            license_token_ids: (0..request.amount).map(|i| format!("lt-{}", i)).collect(),
        })
    }
}

/// Verification service behavior for a test run
#[derive(Debug, Clone, Copy)]
pub enum VerifyBehavior {
    /// Terminal clean result on the first fetch
    CleanFirstFetch,
    /// Terminal flagged result with the given confidence
    Flagged(u8),
    /// Job never reaches a terminal state
    NeverTerminal,
    /// Media fetch reports a content hash mismatch
    HashMismatch,
}

/// Verification service mock
pub struct MockVerification {
    behavior: VerifyBehavior,
    pub submit_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl MockVerification {
    pub fn new(behavior: VerifyBehavior) -> Self {
        Self {
            behavior,
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

fn media(status: FetchStatus) -> MediaStatus {
    MediaStatus {
        media_id: "media-1".to_string(),
        fetch_status: status,
        trust_reason: None,
    }
}

#[async_trait]
impl VerificationApi for MockVerification {
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmitAck, VerificationError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SubmitAck {
            token_id: request.token_id.clone(),
        })
    }

    async fn fetch_status(&self, _token_id: &str) -> Result<VerificationResult, VerificationError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.behavior {
            VerifyBehavior::CleanFirstFetch => VerificationResult {
                media: vec![media(FetchStatus::Succeeded)],
                infringement_status: InfringementStatus::Succeeded,
                infringement_result: InfringementResult::Clean,
                external_infringements: vec![],
                in_network_infringements: vec![],
            },
            VerifyBehavior::Flagged(confidence) => VerificationResult {
                media: vec![media(FetchStatus::Succeeded)],
                infringement_status: InfringementStatus::Succeeded,
                infringement_result: InfringementResult::Matched,
                external_infringements: vec![ExternalInfringement {
                    brand_id: "brand-1".to_string(),
                    brand_name: "SomeLabel".to_string(),
                    confidence,
                    authorized: false,
                }],
                in_network_infringements: vec![],
            },
            VerifyBehavior::NeverTerminal => VerificationResult {
                media: vec![media(FetchStatus::Running)],
                infringement_status: InfringementStatus::Running,
                infringement_result: InfringementResult::NotChecked,
                external_infringements: vec![],
                in_network_infringements: vec![],
            },
            VerifyBehavior::HashMismatch => VerificationResult {
                media: vec![media(FetchStatus::HashMismatch)],
                infringement_status: InfringementStatus::Running,
                infringement_result: InfringementResult::NotChecked,
                external_infringements: vec![],
                in_network_infringements: vec![],
            },
        };
        Ok(result)
    }

    async fn authorize(
        &self,
        _token_id: &str,
        _authorization: &BrandAuthorization,
    ) -> Result<(), VerificationError> {
        Ok(())
    }
}

/// Service configuration with test endpoints
pub fn test_config() -> Arc<ServiceConfig> {
    Arc::new(ServiceConfig {
        endpoints: Endpoints::default(),
        verification_api_key: "test-verification-key".to_string(),
        gateway_api_key: "test-gateway-key".to_string(),
    })
}

/// In-memory database with all tables created
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    melos_ip::db::init_tables(&pool).await.unwrap();
    pool
}

/// Sample metadata for the standard end-to-end scenario
pub fn sample_metadata() -> AssetMetadata {
    AssetMetadata {
        schema_version: 1,
        title: "Midnight Symphony".to_string(),
        description: "A nocturne in three movements".to_string(),
        creators: vec![Creator {
            name: "Aria Vale".to_string(),
            address: "0xabc0000000000000000000000000000000000001".to_string(),
            contribution_percent: 100,
        }],
        media_url: "https://content.example/midnight-symphony.mp3".to_string(),
        media_mime: Some("audio/mpeg".to_string()),
        image_url: Some("https://content.example/midnight-symphony.png".to_string()),
        extra: serde_json::Map::new(),
    }
}

/// Full application state wired to the given mocks
pub async fn build_state(
    pool: SqlitePool,
    gateway: Arc<MockGateway>,
    verification: Arc<MockVerification>,
    ledger: Arc<MockLedger>,
) -> AppState {
    AppState::new(
        pool,
        EventBus::new(100),
        gateway,
        verification,
        ledger,
        test_config(),
    )
}
