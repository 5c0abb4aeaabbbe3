//! Derivative lineage and revenue claim bookkeeping types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parent to child IP relationship
///
/// Many-to-many: a child may have multiple parents and a parent many
/// children. The ledger enforces a DAG (new assets only reference existing
/// ones), but diamond shapes must not be assumed absent when computing
/// royalty splits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivativeLink {
    pub parent_ip_id: String,
    pub child_ip_id: String,
    pub license_terms_id: String,
    pub created_at: DateTime<Utc>,
}

/// One completed revenue claim (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueClaim {
    pub ancestor_ip_id: String,
    pub claimer: String,
    pub child_ip_ids: Vec<String>,
    pub royalty_policies: Vec<String>,
    pub currency_tokens: Vec<String>,
    /// Amount claimed, in currency token base units
    pub claimed_amount: i64,
    pub created_at: DateTime<Utc>,
}
