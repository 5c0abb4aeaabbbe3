//! Media items submitted for verification

use serde::{Deserialize, Serialize};

/// A single media asset within a verification request
///
/// Immutable once submitted; `media_id` must be unique within one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub media_id: String,

    /// Publicly fetchable URL the verification service downloads from
    pub url: String,

    /// SHA-256 content hash (lowercase hex, 64 chars), if known at submit time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Reason this media is trusted without a full fetch, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_reason: Option<TrustReason>,
}

/// Why a media item is trusted without fingerprint analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrustReason {
    /// Hosted on a platform the verification service already trusts
    TrustedPlatform { platform_name: String },
    /// Creator declared no third-party licenses apply
    NoLicenses,
}

/// Per-media fetch state reported by the verification service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    /// Fetched bytes did not match the submitted content hash
    HashMismatch,
}

impl FetchStatus {
    /// Terminal states end the per-media lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchStatus::Succeeded | FetchStatus::Failed | FetchStatus::HashMismatch
        )
    }
}
