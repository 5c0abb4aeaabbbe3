//! Derivative lineage persistence

use crate::models::DerivativeLink;
use chrono::{DateTime, Utc};
use melos_common::{Error, Result};
use sqlx::SqlitePool;

type LinkRow = (String, String, String, String);

fn row_to_link(row: LinkRow) -> Result<DerivativeLink> {
    let created_at = DateTime::parse_from_rfc3339(&row.3)
        .map_err(|e| Error::Internal(format!("Invalid created_at timestamp: {}", e)))?
        .with_timezone(&Utc);
    Ok(DerivativeLink {
        parent_ip_id: row.0,
        child_ip_id: row.1,
        license_terms_id: row.2,
        created_at,
    })
}

/// Record one parent to child relationship
pub async fn insert_link(pool: &SqlitePool, link: &DerivativeLink) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO derivative_links (parent_ip_id, child_ip_id, license_terms_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&link.parent_ip_id)
    .bind(&link.child_ip_id)
    .bind(&link.license_terms_id)
    .bind(link.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    tracing::debug!(
        parent = %link.parent_ip_id,
        child = %link.child_ip_id,
        "Derivative link recorded"
    );
    Ok(())
}

/// Children derived from a parent
pub async fn links_for_parent(pool: &SqlitePool, parent_ip_id: &str) -> Result<Vec<DerivativeLink>> {
    let rows: Vec<LinkRow> = sqlx::query_as(
        "SELECT parent_ip_id, child_ip_id, license_terms_id, created_at \
         FROM derivative_links WHERE parent_ip_id = ? ORDER BY id",
    )
    .bind(parent_ip_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_link).collect()
}

/// Parents of a derivative child
pub async fn links_for_child(pool: &SqlitePool, child_ip_id: &str) -> Result<Vec<DerivativeLink>> {
    let rows: Vec<LinkRow> = sqlx::query_as(
        "SELECT parent_ip_id, child_ip_id, license_terms_id, created_at \
         FROM derivative_links WHERE child_ip_id = ? ORDER BY id",
    )
    .bind(child_ip_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_link).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn link(parent: &str, child: &str) -> DerivativeLink {
        DerivativeLink {
            parent_ip_id: parent.to_string(),
            child_ip_id: child.to_string(),
            license_terms_id: "1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_many_to_many_links() {
        let pool = test_pool().await;

        // Diamond shape: two parents, one child; one parent has another child
        insert_link(&pool, &link("0xp1", "0xchild")).await.unwrap();
        insert_link(&pool, &link("0xp2", "0xchild")).await.unwrap();
        insert_link(&pool, &link("0xp1", "0xother")).await.unwrap();

        let parents = links_for_child(&pool, "0xchild").await.unwrap();
        assert_eq!(parents.len(), 2);

        let children = links_for_parent(&pool, "0xp1").await.unwrap();
        assert_eq!(children.len(), 2);
    }
}
