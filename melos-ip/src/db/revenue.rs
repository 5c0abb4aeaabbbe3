//! Revenue claim persistence (append-only)

use crate::models::RevenueClaim;
use chrono::{DateTime, Utc};
use melos_common::{Error, Result};
use sqlx::SqlitePool;

/// Append a completed claim
pub async fn insert_claim(pool: &SqlitePool, claim: &RevenueClaim) -> Result<()> {
    let child_ip_ids = serde_json::to_string(&claim.child_ip_ids)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON: {}", e)))?;
    let royalty_policies = serde_json::to_string(&claim.royalty_policies)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON: {}", e)))?;
    let currency_tokens = serde_json::to_string(&claim.currency_tokens)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO revenue_claims
            (ancestor_ip_id, claimer, child_ip_ids, royalty_policies,
             currency_tokens, claimed_amount, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&claim.ancestor_ip_id)
    .bind(&claim.claimer)
    .bind(&child_ip_ids)
    .bind(&royalty_policies)
    .bind(&currency_tokens)
    .bind(claim.claimed_amount)
    .bind(claim.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    tracing::debug!(
        ancestor = %claim.ancestor_ip_id,
        amount = claim.claimed_amount,
        "Revenue claim recorded"
    );
    Ok(())
}

/// Sum of all amounts claimed against an ancestor
pub async fn total_claimed(pool: &SqlitePool, ancestor_ip_id: &str) -> Result<i64> {
    let total: Option<i64> = sqlx::query_scalar(
        "SELECT SUM(claimed_amount) FROM revenue_claims WHERE ancestor_ip_id = ?",
    )
    .bind(ancestor_ip_id)
    .fetch_one(pool)
    .await?;

    Ok(total.unwrap_or(0))
}

/// All claims against an ancestor, oldest first
pub async fn claims_for(pool: &SqlitePool, ancestor_ip_id: &str) -> Result<Vec<RevenueClaim>> {
    let rows: Vec<(String, String, String, String, String, i64, String)> = sqlx::query_as(
        "SELECT ancestor_ip_id, claimer, child_ip_ids, royalty_policies, \
         currency_tokens, claimed_amount, created_at \
         FROM revenue_claims WHERE ancestor_ip_id = ? ORDER BY id",
    )
    .bind(ancestor_ip_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let child_ip_ids: Vec<String> = serde_json::from_str(&row.2)
                .map_err(|e| Error::Internal(format!("Invalid child_ip_ids JSON: {}", e)))?;
            let royalty_policies: Vec<String> = serde_json::from_str(&row.3)
                .map_err(|e| Error::Internal(format!("Invalid royalty_policies JSON: {}", e)))?;
            let currency_tokens: Vec<String> = serde_json::from_str(&row.4)
                .map_err(|e| Error::Internal(format!("Invalid currency_tokens JSON: {}", e)))?;
            let created_at = DateTime::parse_from_rfc3339(&row.6)
                .map_err(|e| Error::Internal(format!("Invalid created_at timestamp: {}", e)))?
                .with_timezone(&Utc);

            Ok(RevenueClaim {
                ancestor_ip_id: row.0,
                claimer: row.1,
                child_ip_ids,
                royalty_policies,
                currency_tokens,
                claimed_amount: row.5,
                created_at,
            })
        })
        .collect()
}
