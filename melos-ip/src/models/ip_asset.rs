//! Registered IP asset and license term types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credited creator of an asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    /// Wallet address
    pub address: String,
    /// Share of the work, 0..=100; shares across creators sum to 100
    pub contribution_percent: u8,
}

/// Gating policy applied between verification and ledger registration
///
/// The two policies are deliberately distinct call-site choices, never
/// merged: `SkipOnFlagged` refuses to touch the ledger for flagged content,
/// `RecordOnly` registers regardless and records the flag as metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingPolicy {
    #[default]
    SkipOnFlagged,
    RecordOnly,
}

/// License flavor selecting the commercial-remix template defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseFlavor {
    /// Standard commercial remix: minting fee 1, revenue share 5%
    #[default]
    Standard,
    /// One-time use: no minting fee, no revenue share
    OneTimeUse,
}

impl LicenseFlavor {
    pub fn default_minting_fee(&self) -> u64 {
        match self {
            LicenseFlavor::Standard => 1,
            LicenseFlavor::OneTimeUse => 0,
        }
    }

    pub fn default_rev_share(&self) -> u8 {
        match self {
            LicenseFlavor::Standard => 5,
            LicenseFlavor::OneTimeUse => 0,
        }
    }
}

/// License terms attached to a mint-and-register call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseTermsParams {
    pub minting_fee: u64,
    /// Commercial revenue share, percent 0..=100
    pub commercial_rev_share: u8,
    pub royalty_policy: String,
    pub currency_token: String,
}

impl LicenseTermsParams {
    /// Build commercial-remix terms from a flavor, with optional overrides
    pub fn commercial_remix(
        flavor: LicenseFlavor,
        minting_fee: Option<u64>,
        commercial_rev_share: Option<u8>,
        royalty_policy: &str,
        currency_token: &str,
    ) -> Self {
        Self {
            minting_fee: minting_fee.unwrap_or_else(|| flavor.default_minting_fee()),
            commercial_rev_share: commercial_rev_share
                .unwrap_or_else(|| flavor.default_rev_share()),
            royalty_policy: royalty_policy.to_string(),
            currency_token: currency_token.to_string(),
        }
    }
}

/// Ledger identifiers returned by a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredAsset {
    pub transaction_hash: String,
    pub ip_id: String,
    pub license_terms_ids: Vec<String>,
    pub explorer_url: String,
}

/// A registered IP asset as recorded by this service
///
/// `ip_id` and `transaction_hash` are assigned by the ledger and immutable.
/// `verified` may be updated by a later re-check; the on-ledger record is
/// never retroactively altered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAsset {
    pub ip_id: String,
    pub token_id: Option<String>,
    pub transaction_hash: String,
    pub license_terms_ids: Vec<String>,
    pub creators: Vec<Creator>,
    /// Storage gateway reference of the IP metadata document
    pub media_ref: String,
    pub verified: bool,
    pub verification_token_id: Option<String>,
    /// Lifetime revenue observed for this asset, in currency token base units
    pub total_revenue: i64,
    pub created_at: DateTime<Utc>,
}
