//! Derivative and license manager
//!
//! Thin sequencing wrappers around the ledger for derivative registration,
//! revenue claims and license-token minting, keeping the DerivativeLink and
//! RevenueClaim bookkeeping consistent with ledger responses.

use crate::config::ServiceConfig;
use crate::db;
use crate::models::{AssetMetadata, DerivativeLink, IpAsset, RevenueClaim};
use crate::services::ledger_client::{
    ClaimRevenueRequest, Ledger, MintLicenseTokensRequest, MintLicenseTokensResponse,
    RegisterDerivativeRequest,
};
use crate::services::registration_orchestrator::prepare_metadata_refs;
use crate::services::storage_client::StorageGateway;
use crate::services::PipelineError;
use chrono::Utc;
use melos_common::events::{EventBus, MelosEvent};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Result of a derivative registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredDerivative {
    pub child_ip_id: String,
    pub transaction_hash: String,
    pub parent_ip_ids: Vec<String>,
}

/// Pending revenue computed from stored earnings minus claimed amounts
#[derive(Debug, Clone, Serialize)]
pub struct PendingRevenue {
    pub ancestor_ip_id: String,
    pub total_revenue_earned: i64,
    pub total_claimed: i64,
    pub pending_revenue: i64,
}

/// Derivative and revenue service
pub struct DerivativeManager {
    db: SqlitePool,
    event_bus: EventBus,
    gateway: Arc<dyn StorageGateway>,
    ledger: Arc<dyn Ledger>,
    config: Arc<ServiceConfig>,
}

impl DerivativeManager {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        gateway: Arc<dyn StorageGateway>,
        ledger: Arc<dyn Ledger>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            db,
            event_bus,
            gateway,
            ledger,
            config,
        }
    }

    /// Register a derivative of one or more parent assets
    ///
    /// One DerivativeLink row is recorded per parent. License terms are
    /// paired with parents by index; a single terms id covers all parents.
    pub async fn register_derivative(
        &self,
        parent_ip_ids: Vec<String>,
        license_terms_ids: Vec<String>,
        metadata: AssetMetadata,
    ) -> Result<RegisteredDerivative, PipelineError> {
        if parent_ip_ids.is_empty() {
            return Err(PipelineError::Validation(
                "at least one parent ip_id is required".to_string(),
            ));
        }
        if license_terms_ids.is_empty() {
            return Err(PipelineError::Validation(
                "at least one license terms id is required".to_string(),
            ));
        }
        metadata.validate().map_err(PipelineError::Validation)?;

        let refs = prepare_metadata_refs(
            self.gateway.as_ref(),
            &self.config.endpoints.gateway_public_base,
            &metadata,
            None,
        )
        .await?;

        let response = self
            .ledger
            .register_derivative(RegisterDerivativeRequest {
                parent_ip_ids: parent_ip_ids.clone(),
                license_terms_ids: license_terms_ids.clone(),
                ip_metadata_uri: refs.ip_metadata_uri,
                ip_metadata_hash: refs.ip_metadata_hash,
                nft_metadata_uri: refs.nft_metadata_uri,
                nft_metadata_hash: refs.nft_metadata_hash,
                recipient: metadata.creators[0].address.clone(),
            })
            .await?;

        let now = Utc::now();
        for (index, parent_ip_id) in parent_ip_ids.iter().enumerate() {
            let license_terms_id = license_terms_ids
                .get(index)
                .unwrap_or(&license_terms_ids[0])
                .clone();
            db::derivatives::insert_link(
                &self.db,
                &DerivativeLink {
                    parent_ip_id: parent_ip_id.clone(),
                    child_ip_id: response.ip_id.clone(),
                    license_terms_id,
                    created_at: now,
                },
            )
            .await?;
        }

        db::ip_assets::insert_asset(
            &self.db,
            &IpAsset {
                ip_id: response.ip_id.clone(),
                token_id: None,
                transaction_hash: response.tx_hash.clone(),
                license_terms_ids,
                creators: metadata.creators.clone(),
                media_ref: refs.ip_content_id,
                verified: false,
                verification_token_id: None,
                total_revenue: 0,
                created_at: now,
            },
        )
        .await?;

        self.event_bus.emit_lossy(MelosEvent::DerivativeRegistered {
            child_ip_id: response.ip_id.clone(),
            parent_ip_ids: parent_ip_ids.clone(),
            timestamp: now,
        });

        tracing::info!(
            child_ip_id = %response.ip_id,
            parents = parent_ip_ids.len(),
            "Derivative registered"
        );

        Ok(RegisteredDerivative {
            child_ip_id: response.ip_id,
            transaction_hash: response.tx_hash,
            parent_ip_ids,
        })
    }

    /// Claim revenue accrued to an ancestor asset
    ///
    /// Empty `child_ip_ids` and `royalty_policies` are valid: the claim then
    /// runs against the ancestor alone. An empty currency list defaults to
    /// the configured currency token.
    pub async fn claim_revenue(
        &self,
        ancestor_ip_id: String,
        claimer: String,
        child_ip_ids: Vec<String>,
        royalty_policies: Vec<String>,
        currency_tokens: Vec<String>,
    ) -> Result<i64, PipelineError> {
        if ancestor_ip_id.trim().is_empty() {
            return Err(PipelineError::Validation(
                "ancestor_ip_id must not be empty".to_string(),
            ));
        }

        let currency_tokens = if currency_tokens.is_empty() {
            vec![self.config.endpoints.currency_token.clone()]
        } else {
            currency_tokens
        };

        let response = self
            .ledger
            .claim_revenue(ClaimRevenueRequest {
                ancestor_ip_id: ancestor_ip_id.clone(),
                claimer: claimer.clone(),
                child_ip_ids: child_ip_ids.clone(),
                royalty_policies: royalty_policies.clone(),
                currency_tokens: currency_tokens.clone(),
            })
            .await?;

        let now = Utc::now();
        db::revenue::insert_claim(
            &self.db,
            &RevenueClaim {
                ancestor_ip_id: ancestor_ip_id.clone(),
                claimer: claimer.clone(),
                child_ip_ids,
                royalty_policies,
                currency_tokens,
                claimed_amount: response.claimed_tokens,
                created_at: now,
            },
        )
        .await?;

        self.event_bus.emit_lossy(MelosEvent::RevenueClaimed {
            ancestor_ip_id: ancestor_ip_id.clone(),
            claimer,
            claimed_amount: response.claimed_tokens,
            timestamp: now,
        });

        tracing::info!(
            ancestor_ip_id = %ancestor_ip_id,
            claimed = response.claimed_tokens,
            "Revenue claim complete"
        );

        Ok(response.claimed_tokens)
    }

    /// Pending revenue: stored lifetime earnings minus all claimed amounts
    pub async fn pending_revenue(
        &self,
        ancestor_ip_id: &str,
    ) -> Result<PendingRevenue, PipelineError> {
        let asset = db::ip_assets::find_by_ip_id(&self.db, ancestor_ip_id)
            .await?
            .ok_or_else(|| {
                PipelineError::Common(melos_common::Error::NotFound(format!(
                    "IP asset {}",
                    ancestor_ip_id
                )))
            })?;

        let total_claimed = db::revenue::total_claimed(&self.db, ancestor_ip_id).await?;

        Ok(PendingRevenue {
            ancestor_ip_id: ancestor_ip_id.to_string(),
            total_revenue_earned: asset.total_revenue,
            total_claimed,
            pending_revenue: asset.total_revenue - total_claimed,
        })
    }

    /// Mint license tokens against a licensor asset
    pub async fn mint_license_tokens(
        &self,
        request: MintLicenseTokensRequest,
    ) -> Result<MintLicenseTokensResponse, PipelineError> {
        if request.amount == 0 {
            return Err(PipelineError::Validation(
                "amount must be at least 1".to_string(),
            ));
        }
        Ok(self.ledger.mint_license_tokens(request).await?)
    }
}
