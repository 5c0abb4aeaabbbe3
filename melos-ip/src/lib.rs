//! melos-ip library interface
//!
//! Exposes the registration pipeline, collaborator clients and HTTP API for
//! the melos IP registration microservice.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use config::ServiceConfig;
use melos_common::events::EventBus;
use services::{
    DerivativeManager, Ledger, RegistrationOrchestrator, StorageGateway, VerificationApi,
    VerificationPoller,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub event_bus: EventBus,
    pub orchestrator: Arc<RegistrationOrchestrator>,
    pub derivatives: Arc<DerivativeManager>,
    pub verification: Arc<dyn VerificationApi>,
    pub config: Arc<ServiceConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        gateway: Arc<dyn StorageGateway>,
        verification: Arc<dyn VerificationApi>,
        ledger: Arc<dyn Ledger>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        let poller = VerificationPoller::new(verification.clone());
        let orchestrator = Arc::new(RegistrationOrchestrator::new(
            db.clone(),
            event_bus.clone(),
            gateway.clone(),
            verification.clone(),
            ledger.clone(),
            poller,
            config.clone(),
        ));
        let derivatives = Arc::new(DerivativeManager::new(
            db.clone(),
            event_bus.clone(),
            gateway,
            ledger,
            config.clone(),
        ));

        Self {
            db,
            event_bus,
            orchestrator,
            derivatives,
            verification,
            config,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::assets::routes())
        .merge(api::derivatives::routes())
        .merge(api::royalties::routes())
        .merge(api::verification::routes())
        .merge(api::health::routes())
        .route("/events", get(api::events::event_stream))
        .with_state(state)
}
