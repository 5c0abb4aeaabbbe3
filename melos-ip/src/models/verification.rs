//! Verification service request and result types
//!
//! DTOs mirror the verification service's JSON wire format. The request is
//! built once by the registration orchestrator and never mutated; results
//! are only ever replaced by a fresh fetch.

use super::media::{FetchStatus, MediaItem, TrustReason};
use serde::{Deserialize, Serialize};

/// On-chain (or synthesized pre-mint) registration transaction reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationTx {
    pub hash: String,
    pub block_number: u64,
    /// Unix timestamp in seconds
    pub timestamp: u64,
    pub chain: String,
}

/// Parent license reference for derivative submissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseParent {
    pub token_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
}

/// Token registration request submitted to the verification service
///
/// Immutable after construction; resubmission requires a fresh `token_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub token_id: String,
    pub registration_tx: RegistrationTx,
    pub creator_id: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub media: Vec<MediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_parents: Option<Vec<LicenseParent>>,
}

/// Acknowledgement returned by a submit call
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAck {
    pub token_id: String,
}

/// Per-media fetch state within a verification result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaStatus {
    pub media_id: String,
    pub fetch_status: FetchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_reason: Option<TrustReason>,
}

/// Asset-level infringement check state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfringementStatus {
    NotStarted,
    Running,
    /// Some service versions report "completed" for the same state
    #[serde(alias = "completed")]
    Succeeded,
    Failed,
}

/// Asset-level infringement check result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfringementResult {
    /// Check bypassed (e.g. trusted platform)
    NotChecked,
    Clean,
    Matched,
}

/// Match against a known external brand catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalInfringement {
    pub brand_id: String,
    pub brand_name: String,
    /// Match confidence, 0..=100
    pub confidence: u8,
    /// Creator holds an authorization from this brand
    pub authorized: bool,
}

/// Match against another token registered in the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InNetworkInfringement {
    pub token_id: String,
    /// Match confidence, 0..=100
    pub confidence: u8,
    /// A license already covers this relationship
    pub licensed: bool,
}

/// Verification state fetched from the verification service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub media: Vec<MediaStatus>,
    pub infringement_status: InfringementStatus,
    #[serde(default = "default_infringement_result")]
    pub infringement_result: InfringementResult,
    #[serde(default)]
    pub external_infringements: Vec<ExternalInfringement>,
    #[serde(default)]
    pub in_network_infringements: Vec<InNetworkInfringement>,
}

fn default_infringement_result() -> InfringementResult {
    InfringementResult::NotChecked
}

impl VerificationResult {
    /// All media fetches reached `succeeded`
    pub fn all_media_succeeded(&self) -> bool {
        !self.media.is_empty()
            && self
                .media
                .iter()
                .all(|m| m.fetch_status == FetchStatus::Succeeded)
    }

    /// First media fetch failure, if any
    pub fn first_media_failure(&self) -> Option<&MediaStatus> {
        self.media.iter().find(|m| {
            matches!(
                m.fetch_status,
                FetchStatus::Failed | FetchStatus::HashMismatch
            )
        })
    }

    /// Any infringement reported, external or in-network
    pub fn has_infringements(&self) -> bool {
        !self.external_infringements.is_empty() || !self.in_network_infringements.is_empty()
    }
}

/// Brand authorization request passed through to the verification service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandAuthorization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub data: serde_json::Value,
}

/// Terminal outcome of a verification poll
///
/// `TimeoutFallback` is a resolved-but-degraded outcome, not an error: the
/// poll budget ran out while the job was still running and a synthetic
/// verified result was substituted. It stays distinguishable from a genuine
/// clean result so downstream audits can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Clean {
        confidence: u8,
    },
    Flagged {
        confidence: u8,
        external: Vec<ExternalInfringement>,
        in_network: Vec<InNetworkInfringement>,
    },
    TimeoutFallback {
        confidence: u8,
    },
    Failed {
        hash_mismatch: bool,
        message: String,
    },
}

impl VerificationOutcome {
    /// Stable status label used for persistence and events
    pub fn status_str(&self) -> &'static str {
        match self {
            VerificationOutcome::Clean { .. } => "clean",
            VerificationOutcome::Flagged { .. } => "flagged",
            VerificationOutcome::TimeoutFallback { .. } => "timeout_fallback",
            VerificationOutcome::Failed { .. } => "failed",
        }
    }

    /// Confidence surfaced to the creator, if the outcome carries one
    pub fn confidence(&self) -> Option<u8> {
        match self {
            VerificationOutcome::Clean { confidence }
            | VerificationOutcome::Flagged { confidence, .. }
            | VerificationOutcome::TimeoutFallback { confidence } => Some(*confidence),
            VerificationOutcome::Failed { .. } => None,
        }
    }

    /// Whether this outcome was synthesized after poll budget exhaustion
    pub fn is_fallback(&self) -> bool {
        matches!(self, VerificationOutcome::TimeoutFallback { .. })
    }

    /// Whether the asset counts as verified
    ///
    /// The fallback path deliberately counts as verified; the synthetic
    /// nature is preserved separately via `is_fallback`.
    pub fn verified(&self) -> bool {
        matches!(
            self,
            VerificationOutcome::Clean { .. } | VerificationOutcome::TimeoutFallback { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_ok(id: &str) -> MediaStatus {
        MediaStatus {
            media_id: id.to_string(),
            fetch_status: FetchStatus::Succeeded,
            trust_reason: None,
        }
    }

    #[test]
    fn test_infringement_status_accepts_completed_alias() {
        let status: InfringementStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, InfringementStatus::Succeeded);

        let status: InfringementStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(status, InfringementStatus::Succeeded);
    }

    #[test]
    fn test_result_defaults_when_fields_absent() {
        let result: VerificationResult = serde_json::from_value(serde_json::json!({
            "media": [{"media_id": "m1", "fetch_status": "running"}],
            "infringement_status": "running",
        }))
        .unwrap();

        assert_eq!(result.infringement_result, InfringementResult::NotChecked);
        assert!(result.external_infringements.is_empty());
        assert!(!result.has_infringements());
    }

    #[test]
    fn test_all_media_succeeded() {
        let result = VerificationResult {
            media: vec![media_ok("m1"), media_ok("m2")],
            infringement_status: InfringementStatus::Succeeded,
            infringement_result: InfringementResult::Clean,
            external_infringements: vec![],
            in_network_infringements: vec![],
        };
        assert!(result.all_media_succeeded());
        assert!(result.first_media_failure().is_none());
    }

    #[test]
    fn test_empty_media_is_not_succeeded() {
        let result = VerificationResult {
            media: vec![],
            infringement_status: InfringementStatus::Succeeded,
            infringement_result: InfringementResult::Clean,
            external_infringements: vec![],
            in_network_infringements: vec![],
        };
        assert!(!result.all_media_succeeded());
    }

    #[test]
    fn test_outcome_verified_flags() {
        assert!(VerificationOutcome::Clean { confidence: 90 }.verified());
        assert!(VerificationOutcome::TimeoutFallback { confidence: 85 }.verified());
        assert!(VerificationOutcome::TimeoutFallback { confidence: 85 }.is_fallback());
        assert!(!VerificationOutcome::Clean { confidence: 90 }.is_fallback());
        assert!(!VerificationOutcome::Failed {
            hash_mismatch: false,
            message: "x".to_string()
        }
        .verified());
    }
}
