//! IP asset persistence

use crate::models::{Creator, IpAsset};
use chrono::{DateTime, Utc};
use melos_common::{Error, Result};
use sqlx::SqlitePool;

type AssetRow = (
    String,         // ip_id
    Option<String>, // token_id
    String,         // transaction_hash
    String,         // license_terms_ids (JSON)
    String,         // creators (JSON)
    String,         // media_ref
    i64,            // verified
    Option<String>, // verification_token_id
    i64,            // total_revenue
    String,         // created_at
);

const ASSET_COLUMNS: &str = "ip_id, token_id, transaction_hash, license_terms_ids, creators, \
     media_ref, verified, verification_token_id, total_revenue, created_at";

fn row_to_asset(row: AssetRow) -> Result<IpAsset> {
    let license_terms_ids: Vec<String> = serde_json::from_str(&row.3)
        .map_err(|e| Error::Internal(format!("Invalid license_terms_ids JSON: {}", e)))?;
    let creators: Vec<Creator> = serde_json::from_str(&row.4)
        .map_err(|e| Error::Internal(format!("Invalid creators JSON: {}", e)))?;
    let created_at = DateTime::parse_from_rfc3339(&row.9)
        .map_err(|e| Error::Internal(format!("Invalid created_at timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(IpAsset {
        ip_id: row.0,
        token_id: row.1,
        transaction_hash: row.2,
        license_terms_ids,
        creators,
        media_ref: row.5,
        verified: row.6 != 0,
        verification_token_id: row.7,
        total_revenue: row.8,
        created_at,
    })
}

/// Insert a newly registered asset
///
/// Fails with a unique-constraint violation if the token_id was already
/// recorded; callers treat that as "already registered".
pub async fn insert_asset(pool: &SqlitePool, asset: &IpAsset) -> Result<()> {
    let license_terms_ids = serde_json::to_string(&asset.license_terms_ids)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON: {}", e)))?;
    let creators = serde_json::to_string(&asset.creators)
        .map_err(|e| Error::Internal(format!("Failed to serialize JSON: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO ip_assets
            (ip_id, token_id, transaction_hash, license_terms_ids, creators,
             media_ref, verified, verification_token_id, total_revenue, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&asset.ip_id)
    .bind(&asset.token_id)
    .bind(&asset.transaction_hash)
    .bind(&license_terms_ids)
    .bind(&creators)
    .bind(&asset.media_ref)
    .bind(asset.verified as i64)
    .bind(&asset.verification_token_id)
    .bind(asset.total_revenue)
    .bind(asset.created_at.to_rfc3339())
    .bind(asset.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    tracing::debug!(ip_id = %asset.ip_id, "IP asset recorded");
    Ok(())
}

/// Find an asset by its verification token identifier
pub async fn find_by_token_id(pool: &SqlitePool, token_id: &str) -> Result<Option<IpAsset>> {
    let row: Option<AssetRow> = sqlx::query_as(&format!(
        "SELECT {} FROM ip_assets WHERE token_id = ?",
        ASSET_COLUMNS
    ))
    .bind(token_id)
    .fetch_optional(pool)
    .await?;

    row.map(row_to_asset).transpose()
}

/// Find an asset by its ledger-assigned IP identifier
pub async fn find_by_ip_id(pool: &SqlitePool, ip_id: &str) -> Result<Option<IpAsset>> {
    let row: Option<AssetRow> = sqlx::query_as(&format!(
        "SELECT {} FROM ip_assets WHERE ip_id = ?",
        ASSET_COLUMNS
    ))
    .bind(ip_id)
    .fetch_optional(pool)
    .await?;

    row.map(row_to_asset).transpose()
}

/// List assets, newest first
pub async fn list_assets(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<IpAsset>> {
    let rows: Vec<AssetRow> = sqlx::query_as(&format!(
        "SELECT {} FROM ip_assets ORDER BY created_at DESC LIMIT ? OFFSET ?",
        ASSET_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_asset).collect()
}

/// Update the verified flag after a re-check
///
/// The on-ledger record is never altered; only this service's bookkeeping.
pub async fn set_verified(pool: &SqlitePool, ip_id: &str, verified: bool) -> Result<()> {
    sqlx::query("UPDATE ip_assets SET verified = ?, updated_at = ? WHERE ip_id = ?")
        .bind(verified as i64)
        .bind(Utc::now().to_rfc3339())
        .bind(ip_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Record observed lifetime revenue for an asset
pub async fn set_total_revenue(pool: &SqlitePool, ip_id: &str, total_revenue: i64) -> Result<()> {
    sqlx::query("UPDATE ip_assets SET total_revenue = ?, updated_at = ? WHERE ip_id = ?")
        .bind(total_revenue)
        .bind(Utc::now().to_rfc3339())
        .bind(ip_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn sample_asset(ip_id: &str, token_id: &str) -> IpAsset {
        IpAsset {
            ip_id: ip_id.to_string(),
            token_id: Some(token_id.to_string()),
            transaction_hash: "0xtx".to_string(),
            license_terms_ids: vec!["1".to_string()],
            creators: vec![Creator {
                name: "Aria".to_string(),
                address: "0xabc".to_string(),
                contribution_percent: 100,
            }],
            media_ref: "bafy1".to_string(),
            verified: true,
            verification_token_id: Some(token_id.to_string()),
            total_revenue: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trip() {
        let pool = test_pool().await;
        let asset = sample_asset("0xip1", "0xc:1");

        insert_asset(&pool, &asset).await.unwrap();

        let found = find_by_token_id(&pool, "0xc:1").await.unwrap().unwrap();
        assert_eq!(found.ip_id, "0xip1");
        assert_eq!(found.license_terms_ids, vec!["1".to_string()]);
        assert!(found.verified);
        assert_eq!(found.creators[0].name, "Aria");

        let by_ip = find_by_ip_id(&pool, "0xip1").await.unwrap().unwrap();
        assert_eq!(by_ip.token_id.as_deref(), Some("0xc:1"));
    }

    #[tokio::test]
    async fn test_token_id_unique_constraint() {
        let pool = test_pool().await;
        insert_asset(&pool, &sample_asset("0xip1", "0xc:1"))
            .await
            .unwrap();

        let duplicate = insert_asset(&pool, &sample_asset("0xip2", "0xc:1")).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_set_verified_updates_flag() {
        let pool = test_pool().await;
        insert_asset(&pool, &sample_asset("0xip1", "0xc:1"))
            .await
            .unwrap();

        set_verified(&pool, "0xip1", false).await.unwrap();

        let found = find_by_ip_id(&pool, "0xip1").await.unwrap().unwrap();
        assert!(!found.verified);
    }

    #[tokio::test]
    async fn test_list_assets_pagination() {
        let pool = test_pool().await;
        for i in 0..5 {
            insert_asset(&pool, &sample_asset(&format!("0xip{}", i), &format!("0xc:{}", i)))
                .await
                .unwrap();
        }

        let page = list_assets(&pool, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        let rest = list_assets(&pool, 10, 4).await.unwrap();
        assert_eq!(rest.len(), 1);
    }
}
