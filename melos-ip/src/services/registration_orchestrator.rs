//! Registration orchestrator
//!
//! Sequences the verify-then-register pipeline: derive identifiers, submit
//! for infringement analysis, poll to resolution, then mint against the IP
//! ledger gated on the outcome. Steps are strictly ordered within one
//! invocation; separate invocations are independent tasks.
//!
//! Ledger calls are never retried here. A failure after submission leaves
//! the on-chain state unknown and the caller must re-query before trying
//! again with a fresh request.

use crate::config::ServiceConfig;
use crate::db;
use crate::models::{
    AssetMetadata, ExternalInfringement, GatingPolicy, InNetworkInfringement, IpAsset,
    LicenseFlavor, LicenseParent, LicenseTermsParams, MediaItem, RegisteredAsset, RegistrationTx,
    VerificationOutcome, VerificationRequest,
};
use crate::services::content_hasher::{
    hash_json, onchain_token_id, synthetic_token_id, synthetic_tx_hash, TokenSeedMedia,
};
use crate::services::ledger_client::{Ledger, MintAndRegisterRequest};
use crate::services::storage_client::{content_url, StorageGateway};
use crate::services::verification_client::VerificationApi;
use crate::services::verification_poller::VerificationPoller;
use crate::services::PipelineError;
use chrono::Utc;
use melos_common::events::{EventBus, MelosEvent};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Registration request accepted by the pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationInput {
    pub metadata: AssetMetadata,

    #[serde(default)]
    pub license_flavor: LicenseFlavor,

    /// Override of the flavor's default minting fee
    pub minting_fee: Option<u64>,

    /// Override of the flavor's default revenue share
    pub commercial_rev_share: Option<u8>,

    #[serde(default)]
    pub gating: GatingPolicy,

    /// SHA-256 of the media content, when the uploader computed one
    pub media_sha256: Option<String>,

    /// Parent licenses to declare to the verification service
    pub license_parents: Option<Vec<LicenseParent>>,

    /// NFT contract address, when the asset is already minted on chain
    pub contract_address: Option<String>,

    /// On-chain numeric token id, paired with `contract_address`
    pub on_chain_id: Option<u64>,

    /// Token derivation timestamp override; defaults to now
    pub timestamp: Option<u64>,
}

/// Terminal pipeline outcome returned to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    /// Asset registered on the ledger
    Registered {
        token_id: String,
        ip_id: String,
        transaction_hash: String,
        license_terms_ids: Vec<String>,
        explorer_url: String,
        verified: bool,
        fallback: bool,
        confidence: Option<u8>,
    },
    /// Infringements found and the gating policy skipped registration
    Flagged {
        token_id: String,
        confidence: u8,
        external_infringements: Vec<ExternalInfringement>,
        in_network_infringements: Vec<InNetworkInfringement>,
    },
}

/// Uploaded metadata document references passed to the ledger
pub(crate) struct MetadataRefs {
    pub ip_metadata_uri: String,
    pub ip_metadata_hash: String,
    pub nft_metadata_uri: String,
    pub nft_metadata_hash: String,
    /// Content identifier of the IP metadata document
    pub ip_content_id: String,
}

/// Hash both metadata documents, then upload them
///
/// The two uploads have no cross-dependency and run concurrently. Upload
/// failures propagate immediately; there is no retry at this layer.
pub(crate) async fn prepare_metadata_refs(
    gateway: &dyn StorageGateway,
    public_base: &str,
    metadata: &AssetMetadata,
    media_hash: Option<&str>,
) -> Result<MetadataRefs, PipelineError> {
    let ip_doc = metadata.to_ip_metadata(media_hash);
    let nft_doc = metadata.to_nft_metadata();

    let ip_hash = hash_json(&ip_doc)?;
    let nft_hash = hash_json(&nft_doc)?;

    let (ip_content_id, nft_content_id) =
        tokio::try_join!(gateway.upload_json(&ip_doc), gateway.upload_json(&nft_doc))?;

    Ok(MetadataRefs {
        ip_metadata_uri: content_url(public_base, &ip_content_id),
        ip_metadata_hash: format!("0x{}", ip_hash),
        nft_metadata_uri: content_url(public_base, &nft_content_id),
        nft_metadata_hash: format!("0x{}", nft_hash),
        ip_content_id,
    })
}

/// Registration pipeline service
pub struct RegistrationOrchestrator {
    db: SqlitePool,
    event_bus: EventBus,
    gateway: Arc<dyn StorageGateway>,
    verification: Arc<dyn VerificationApi>,
    ledger: Arc<dyn Ledger>,
    poller: VerificationPoller,
    config: Arc<ServiceConfig>,
}

impl RegistrationOrchestrator {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        gateway: Arc<dyn StorageGateway>,
        verification: Arc<dyn VerificationApi>,
        ledger: Arc<dyn Ledger>,
        poller: VerificationPoller,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            db,
            event_bus,
            gateway,
            verification,
            ledger,
            poller,
            config,
        }
    }

    /// Run the full verify-then-register pipeline
    pub async fn register_verified(
        &self,
        input: RegistrationInput,
        cancel_token: &CancellationToken,
    ) -> Result<RegistrationOutcome, PipelineError> {
        input
            .metadata
            .validate()
            .map_err(PipelineError::Validation)?;

        let creator = input.metadata.creators[0].address.clone();
        let timestamp = input
            .timestamp
            .unwrap_or_else(|| Utc::now().timestamp() as u64);

        // Identifier strategy: on-chain form when the mint is already known,
        // synthetic derivation otherwise
        let seed = token_seed_media(&input.metadata);
        let token_id = match (&input.contract_address, input.on_chain_id) {
            (Some(contract), Some(id)) => onchain_token_id(contract, id),
            _ => synthetic_token_id(&creator, &seed, timestamp)?,
        };

        // Idempotency guard: one registration per token identifier
        if db::ip_assets::find_by_token_id(&self.db, &token_id)
            .await?
            .is_some()
        {
            tracing::warn!(token_id = %token_id, "Registration refused: token already recorded");
            return Err(PipelineError::AlreadyRegistered(token_id));
        }

        tracing::info!(
            token_id = %token_id,
            title = %input.metadata.title,
            "Starting registration pipeline"
        );
        self.event_bus.emit_lossy(MelosEvent::RegistrationStarted {
            token_id: token_id.clone(),
            title: input.metadata.title.clone(),
            timestamp: Utc::now(),
        });

        let request = build_verification_request(
            &token_id,
            &creator,
            &input,
            &seed,
            timestamp,
            &self.config.endpoints.chain,
        )?;

        self.verification.submit(&request).await?;
        self.event_bus.emit_lossy(MelosEvent::VerificationSubmitted {
            token_id: token_id.clone(),
            media_count: request.media.len(),
            timestamp: Utc::now(),
        });

        let outcome = self.poller.poll(&token_id, cancel_token).await;

        db::verification::upsert_outcome(&self.db, &token_id, &outcome).await?;
        self.event_bus.emit_lossy(MelosEvent::VerificationResolved {
            token_id: token_id.clone(),
            status: outcome.status_str().to_string(),
            confidence: outcome.confidence(),
            fallback: outcome.is_fallback(),
            timestamp: Utc::now(),
        });

        match outcome {
            VerificationOutcome::Failed {
                hash_mismatch: true,
                message,
            } => Err(PipelineError::HashMismatch(message)),
            VerificationOutcome::Failed {
                hash_mismatch: false,
                message,
            } => Err(PipelineError::VerificationFailed(message)),
            VerificationOutcome::Flagged {
                confidence,
                external,
                in_network,
            } if input.gating == GatingPolicy::SkipOnFlagged => {
                tracing::warn!(
                    token_id = %token_id,
                    confidence,
                    "Registration skipped: content flagged"
                );
                Ok(RegistrationOutcome::Flagged {
                    token_id,
                    confidence,
                    external_infringements: external,
                    in_network_infringements: in_network,
                })
            }
            outcome => {
                self.finish_registration(input, token_id, outcome).await
            }
        }
    }

    /// Register against the ledger and record the asset
    async fn finish_registration(
        &self,
        input: RegistrationInput,
        token_id: String,
        outcome: VerificationOutcome,
    ) -> Result<RegistrationOutcome, PipelineError> {
        let (asset, media_ref) = self
            .register_asset(
                &input.metadata,
                input.license_flavor,
                input.minting_fee,
                input.commercial_rev_share,
                input.media_sha256.as_deref(),
            )
            .await?;

        let verified = outcome.verified();
        let record = IpAsset {
            ip_id: asset.ip_id.clone(),
            token_id: Some(token_id.clone()),
            transaction_hash: asset.transaction_hash.clone(),
            license_terms_ids: asset.license_terms_ids.clone(),
            creators: input.metadata.creators.clone(),
            media_ref,
            verified,
            verification_token_id: Some(token_id.clone()),
            total_revenue: 0,
            created_at: Utc::now(),
        };
        db::ip_assets::insert_asset(&self.db, &record).await?;

        self.event_bus.emit_lossy(MelosEvent::AssetRegistered {
            token_id: token_id.clone(),
            ip_id: asset.ip_id.clone(),
            transaction_hash: asset.transaction_hash.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            token_id = %token_id,
            ip_id = %asset.ip_id,
            verified,
            fallback = outcome.is_fallback(),
            "Registration pipeline complete"
        );

        Ok(RegistrationOutcome::Registered {
            token_id,
            ip_id: asset.ip_id,
            transaction_hash: asset.transaction_hash,
            license_terms_ids: asset.license_terms_ids,
            explorer_url: asset.explorer_url,
            verified,
            fallback: outcome.is_fallback(),
            confidence: outcome.confidence(),
        })
    }

    /// Register an asset on the ledger without verification gating
    ///
    /// Steps, strictly ordered: hash both metadata documents, upload both,
    /// build license terms, mint-and-register. The ledger response is
    /// returned verbatim and never mutated afterward.
    pub async fn register_asset(
        &self,
        metadata: &AssetMetadata,
        license_flavor: LicenseFlavor,
        minting_fee: Option<u64>,
        commercial_rev_share: Option<u8>,
        media_hash: Option<&str>,
    ) -> Result<(RegisteredAsset, String), PipelineError> {
        metadata.validate().map_err(PipelineError::Validation)?;

        let refs = prepare_metadata_refs(
            self.gateway.as_ref(),
            &self.config.endpoints.gateway_public_base,
            metadata,
            media_hash,
        )
        .await?;

        let license_terms = LicenseTermsParams::commercial_remix(
            license_flavor,
            minting_fee,
            commercial_rev_share,
            &self.config.endpoints.royalty_policy,
            &self.config.endpoints.currency_token,
        );

        let response = self
            .ledger
            .mint_and_register(MintAndRegisterRequest {
                spg_contract: self.config.endpoints.spg_contract.clone(),
                ip_metadata_uri: refs.ip_metadata_uri,
                ip_metadata_hash: refs.ip_metadata_hash,
                nft_metadata_uri: refs.nft_metadata_uri,
                nft_metadata_hash: refs.nft_metadata_hash,
                license_terms,
                recipient: metadata.creators[0].address.clone(),
            })
            .await?;

        let explorer_url = format!(
            "{}/ipa/{}",
            self.config.endpoints.explorer_base.trim_end_matches('/'),
            response.ip_id
        );

        Ok((
            RegisteredAsset {
                transaction_hash: response.tx_hash,
                ip_id: response.ip_id,
                license_terms_ids: response.license_terms_ids,
                explorer_url,
            },
            refs.ip_content_id,
        ))
    }
}

fn token_seed_media(metadata: &AssetMetadata) -> Vec<TokenSeedMedia> {
    let mut seed = vec![TokenSeedMedia {
        media_id: "media-1".to_string(),
        url: metadata.media_url.clone(),
    }];
    if let Some(image_url) = &metadata.image_url {
        seed.push(TokenSeedMedia {
            media_id: "media-2".to_string(),
            url: image_url.clone(),
        });
    }
    seed
}

fn build_verification_request(
    token_id: &str,
    creator: &str,
    input: &RegistrationInput,
    seed: &[TokenSeedMedia],
    timestamp: u64,
    chain: &str,
) -> Result<VerificationRequest, PipelineError> {
    let mut metadata_map = serde_json::Map::new();
    metadata_map.insert(
        "title".to_string(),
        serde_json::Value::String(input.metadata.title.clone()),
    );
    metadata_map.insert(
        "description".to_string(),
        serde_json::Value::String(input.metadata.description.clone()),
    );

    let media = seed
        .iter()
        .map(|m| MediaItem {
            media_id: m.media_id.clone(),
            url: m.url.clone(),
            // Only the audio media carries a caller-computed hash
            hash: if m.media_id == "media-1" {
                input.media_sha256.clone()
            } else {
                None
            },
            trust_reason: None,
        })
        .collect();

    Ok(VerificationRequest {
        token_id: token_id.to_string(),
        registration_tx: RegistrationTx {
            hash: synthetic_tx_hash(creator, seed, timestamp)?,
            block_number: 0,
            timestamp,
            chain: chain.to_string(),
        },
        creator_id: creator.to_string(),
        metadata: metadata_map,
        media,
        license_parents: input.license_parents.clone(),
    })
}
