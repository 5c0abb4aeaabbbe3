//! Database access for melos-ip
//!
//! SQLite database in the service root folder. Tables are created at
//! startup; all list-valued columns are stored as JSON text.

pub mod derivatives;
pub mod ip_assets;
pub mod revenue;
pub mod settings;
pub mod verification;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize melos-ip tables
///
/// The UNIQUE constraint on `ip_assets.token_id` is the idempotency guard
/// for mint calls: at most one registration per token identifier.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ip_assets (
            ip_id TEXT PRIMARY KEY,
            token_id TEXT UNIQUE,
            transaction_hash TEXT NOT NULL,
            license_terms_ids TEXT NOT NULL DEFAULT '[]',
            creators TEXT NOT NULL DEFAULT '[]',
            media_ref TEXT NOT NULL DEFAULT '',
            verified INTEGER NOT NULL DEFAULT 0,
            verification_token_id TEXT,
            total_revenue INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS verification_records (
            token_id TEXT PRIMARY KEY,
            status TEXT NOT NULL,
            confidence INTEGER,
            fallback INTEGER NOT NULL DEFAULT 0,
            external_infringements TEXT NOT NULL DEFAULT '[]',
            in_network_infringements TEXT NOT NULL DEFAULT '[]',
            error TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS derivative_links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            parent_ip_id TEXT NOT NULL,
            child_ip_id TEXT NOT NULL,
            license_terms_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS revenue_claims (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ancestor_ip_id TEXT NOT NULL,
            claimer TEXT NOT NULL,
            child_ip_ids TEXT NOT NULL DEFAULT '[]',
            royalty_policies TEXT NOT NULL DEFAULT '[]',
            currency_tokens TEXT NOT NULL DEFAULT '[]',
            claimed_amount INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!(
        "Database tables initialized (settings, ip_assets, verification_records, derivative_links, revenue_claims)"
    );

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    init_tables(&pool).await.unwrap();
    pool
}
