//! melos-ip - IP Registration Microservice
//!
//! Registers creator audio works: content hashing and identifier
//! derivation, infringement verification through the external verification
//! service, and mint/license/royalty calls against the IP ledger.

use anyhow::Result;
use clap::Parser;
use melos_common::events::EventBus;
use melos_ip::config::{resolve_gateway_api_key, resolve_verification_api_key, ServiceConfig};
use melos_ip::services::{
    GatewayClient, HttpLedgerClient, Ledger, StorageGateway, VerificationApi, VerificationClient,
};
use melos_ip::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "melos-ip", about = "Melos IP registration microservice")]
struct Args {
    /// Root data folder (overrides MELOS_ROOT_FOLDER and TOML)
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP listen port
    #[arg(long, default_value_t = 5731)]
    port: u16,

    /// TOML config file path override
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load TOML config (missing file falls back to defaults)
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => melos_common::config::default_config_path()?,
    };
    let toml_config = melos_common::config::load_toml_config(&config_path).unwrap_or_default();

    // Initialize tracing: RUST_LOG wins, then TOML log_filter, then "info"
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(toml_config.log_filter.clone().unwrap_or_else(|| "info".to_string()))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting melos-ip (IP Registration) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve and initialize root folder
    let root_folder =
        melos_common::config::resolve_root_folder(args.root_folder.as_deref(), "MELOS_ROOT_FOLDER")?;
    melos_common::config::ensure_root_folder(&root_folder)?;

    let db_path = melos_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = melos_ip::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Resolve collaborator credentials (Database > ENV > TOML)
    let verification_api_key = resolve_verification_api_key(&db_pool, &toml_config).await?;
    let gateway_api_key = resolve_gateway_api_key(&db_pool, &toml_config).await?;

    let endpoints = toml_config.endpoints.clone();
    let config = Arc::new(ServiceConfig {
        endpoints: endpoints.clone(),
        verification_api_key: verification_api_key.clone(),
        gateway_api_key: gateway_api_key.clone(),
    });

    // Collaborator clients
    let gateway: Arc<dyn StorageGateway> = Arc::new(GatewayClient::new(
        endpoints.gateway_api_base.clone(),
        gateway_api_key,
    )?);
    let verification: Arc<dyn VerificationApi> = Arc::new(VerificationClient::new(
        endpoints.verification_base.clone(),
        verification_api_key,
    )?);
    let ledger: Arc<dyn Ledger> = Arc::new(HttpLedgerClient::new(
        endpoints.ledger_base.clone(),
        Duration::from_secs(endpoints.ledger_timeout_secs),
    )?);

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    let state = AppState::new(db_pool, event_bus, gateway, verification, ledger, config);
    let app = melos_ip::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("Listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
