//! Configuration loading and root folder resolution
//!
//! Root folder resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration file contents (`~/.config/melos/melos-ip.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root data folder (database lives here)
    pub root_folder: Option<String>,

    /// Log level filter (e.g. "info", "melos_ip=debug")
    pub log_filter: Option<String>,

    /// Verification service API key
    pub verification_api_key: Option<String>,

    /// Storage gateway API key
    pub gateway_api_key: Option<String>,

    /// External collaborator endpoints
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// External collaborator endpoints and chain parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    /// Verification service API base URL
    pub verification_base: String,
    /// Storage gateway API base URL (uploads)
    pub gateway_api_base: String,
    /// Storage gateway public base URL (content retrieval)
    pub gateway_public_base: String,
    /// IP ledger gateway base URL
    pub ledger_base: String,
    /// Block explorer base URL (for user-facing asset links)
    pub explorer_base: String,
    /// SPG collection contract used for mint-and-register calls
    pub spg_contract: String,
    /// Chain identifier reported in registration transactions
    pub chain: String,
    /// Royalty policy contract address for license terms
    pub royalty_policy: String,
    /// Currency token contract address for license terms
    pub currency_token: String,
    /// Ledger request timeout in seconds
    pub ledger_timeout_secs: u64,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            verification_base: "https://verify.melos.audio/v1".to_string(),
            gateway_api_base: "https://store.melos.audio/api".to_string(),
            gateway_public_base: "https://content.melos.audio".to_string(),
            ledger_base: "https://ledger.melos.audio/v1".to_string(),
            explorer_base: "https://explorer.melos.audio".to_string(),
            spg_contract: "0x0000000000000000000000000000000000000000".to_string(),
            chain: "story".to_string(),
            royalty_policy: "0x0000000000000000000000000000000000000000".to_string(),
            currency_token: "0x0000000000000000000000000000000000000000".to_string(),
            ledger_timeout_secs: 120,
        }
    }
}

/// Resolve root folder for a service
pub fn resolve_root_folder(
    cli_arg: Option<&str>,
    env_var_name: &str,
) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = default_config_path() {
        if let Ok(config) = load_toml_config(&config_path) {
            if let Some(root_folder) = config.root_folder {
                return Ok(PathBuf::from(root_folder));
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Get default configuration file path for the platform
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("melos").join("melos-ip.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("melos"))
        .unwrap_or_else(|| PathBuf::from("./melos_data"))
}

/// Load TOML config from a path
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write TOML config atomically (write to temp file, then rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Ensure the root folder directory exists, creating it if missing
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        tracing::info!(path = %root_folder.display(), "Created root folder");
    }
    Ok(())
}

/// Database path within the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("melos.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_arg_has_priority() {
        let resolved = resolve_root_folder(Some("/tmp/melos-cli"), "MELOS_TEST_UNSET_VAR").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/melos-cli"));
    }

    #[test]
    fn test_toml_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("melos-ip.toml");

        let config = TomlConfig {
            root_folder: Some("/data/melos".to_string()),
            verification_api_key: Some("key-123".to_string()),
            ..Default::default()
        };

        write_toml_config(&config, &path).unwrap();
        let loaded = load_toml_config(&path).unwrap();

        assert_eq!(loaded.root_folder.as_deref(), Some("/data/melos"));
        assert_eq!(loaded.verification_api_key.as_deref(), Some("key-123"));
        assert_eq!(loaded.endpoints.ledger_timeout_secs, 120);
    }

    #[test]
    fn test_database_path() {
        let path = database_path(Path::new("/var/lib/melos"));
        assert_eq!(path, PathBuf::from("/var/lib/melos/melos.db"));
    }
}
