//! Configuration resolution for melos-ip
//!
//! API keys resolve with Database → ENV → TOML priority; the database value
//! is authoritative once set through the settings API.

use melos_common::config::{Endpoints, TomlConfig};
use melos_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Resolved runtime configuration shared by services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub endpoints: Endpoints,
    pub verification_api_key: String,
    pub gateway_api_key: String,
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

async fn resolve_key(
    db: &SqlitePool,
    setting_key: &str,
    env_var: &str,
    toml_value: Option<&String>,
    label: &str,
) -> Result<String> {
    let mut sources = Vec::new();

    // Tier 1: Database (authoritative)
    let db_key = crate::db::settings::get_setting(db, setting_key).await?;
    if db_key.as_deref().is_some_and(is_valid_key) {
        sources.push("database");
    }

    // Tier 2: Environment variable
    let env_key = std::env::var(env_var).ok();
    if env_key.as_deref().is_some_and(is_valid_key) {
        sources.push("environment");
    }

    // Tier 3: TOML config
    if toml_value.map(|k| is_valid_key(k)).unwrap_or(false) {
        sources.push("TOML");
    }

    // Warn if multiple sources (potential misconfiguration)
    if sources.len() > 1 {
        warn!(
            "{} API key found in multiple sources: {}. Using database (highest priority).",
            label,
            sources.join(", ")
        );
    }

    if let Some(key) = db_key.filter(|k| is_valid_key(k)) {
        info!("{} API key loaded from database", label);
        return Ok(key);
    }

    if let Some(key) = env_key.filter(|k| is_valid_key(k)) {
        info!("{} API key loaded from environment variable", label);
        return Ok(key);
    }

    if let Some(key) = toml_value.filter(|k| is_valid_key(k.as_str())) {
        info!("{} API key loaded from TOML config", label);
        return Ok(key.clone());
    }

    Err(Error::Config(format!(
        "{} API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: ~/.config/melos/melos-ip.toml ({} = \"your-key\")",
        label,
        env_var,
        setting_key
    )))
}

/// Resolve the verification service API key from 3-tier configuration
pub async fn resolve_verification_api_key(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<String> {
    resolve_key(
        db,
        crate::db::settings::VERIFICATION_API_KEY,
        "MELOS_VERIFICATION_API_KEY",
        toml_config.verification_api_key.as_ref(),
        "Verification",
    )
    .await
}

/// Resolve the storage gateway API key from 3-tier configuration
pub async fn resolve_gateway_api_key(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<String> {
    resolve_key(
        db,
        crate::db::settings::GATEWAY_API_KEY,
        "MELOS_GATEWAY_API_KEY",
        toml_config.gateway_api_key.as_ref(),
        "Gateway",
    )
    .await
}
