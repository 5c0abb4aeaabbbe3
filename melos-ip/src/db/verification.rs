//! Verification outcome audit records
//!
//! One row per verification token, updated in place as the poll resolves.
//! The `fallback` flag keeps synthetic timeout results distinguishable from
//! genuine clean results.

use crate::models::{ExternalInfringement, InNetworkInfringement, VerificationOutcome};
use chrono::Utc;
use melos_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

/// Stored verification outcome
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRecord {
    pub token_id: String,
    pub status: String,
    pub confidence: Option<u8>,
    pub fallback: bool,
    pub external_infringements: Vec<ExternalInfringement>,
    pub in_network_infringements: Vec<InNetworkInfringement>,
    pub error: Option<String>,
}

/// Insert or update the record for a token
pub async fn upsert_outcome(
    pool: &SqlitePool,
    token_id: &str,
    outcome: &VerificationOutcome,
) -> Result<()> {
    let (external, in_network) = match outcome {
        VerificationOutcome::Flagged {
            external,
            in_network,
            ..
        } => (external.clone(), in_network.clone()),
        _ => (Vec::new(), Vec::new()),
    };
    let error = match outcome {
        VerificationOutcome::Failed { message, .. } => Some(message.clone()),
        _ => None,
    };

    let external_json = serde_json::to_string(&external)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON: {}", e)))?;
    let in_network_json = serde_json::to_string(&in_network)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON: {}", e)))?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO verification_records
            (token_id, status, confidence, fallback, external_infringements,
             in_network_infringements, error, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(token_id) DO UPDATE SET
            status = excluded.status,
            confidence = excluded.confidence,
            fallback = excluded.fallback,
            external_infringements = excluded.external_infringements,
            in_network_infringements = excluded.in_network_infringements,
            error = excluded.error,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(token_id)
    .bind(outcome.status_str())
    .bind(outcome.confidence().map(|c| c as i64))
    .bind(outcome.is_fallback() as i64)
    .bind(&external_json)
    .bind(&in_network_json)
    .bind(&error)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    tracing::debug!(token_id = %token_id, status = outcome.status_str(), "Verification record stored");
    Ok(())
}

/// Fetch the stored record for a token
pub async fn get_record(pool: &SqlitePool, token_id: &str) -> Result<Option<VerificationRecord>> {
    let row: Option<(String, String, Option<i64>, i64, String, String, Option<String>)> =
        sqlx::query_as(
            "SELECT token_id, status, confidence, fallback, external_infringements, \
             in_network_infringements, error FROM verification_records WHERE token_id = ?",
        )
        .bind(token_id)
        .fetch_optional(pool)
        .await?;

    row.map(|row| {
        let external_infringements: Vec<ExternalInfringement> = serde_json::from_str(&row.4)
            .map_err(|e| Error::Internal(format!("Invalid infringement JSON: {}", e)))?;
        let in_network_infringements: Vec<InNetworkInfringement> = serde_json::from_str(&row.5)
            .map_err(|e| Error::Internal(format!("Invalid infringement JSON: {}", e)))?;

        Ok(VerificationRecord {
            token_id: row.0,
            status: row.1,
            confidence: row.2.map(|c| c as u8),
            fallback: row.3 != 0,
            external_infringements,
            in_network_infringements,
            error: row.6,
        })
    })
    .transpose()
}
