//! Pipeline services for melos-ip

pub mod content_hasher;
pub mod derivative_manager;
pub mod ledger_client;
pub mod registration_orchestrator;
pub mod storage_client;
pub mod verification_client;
pub mod verification_poller;

pub use derivative_manager::{DerivativeManager, PendingRevenue, RegisteredDerivative};
pub use ledger_client::{HttpLedgerClient, Ledger, LedgerError};
pub use registration_orchestrator::{
    RegistrationInput, RegistrationOrchestrator, RegistrationOutcome,
};
pub use storage_client::{GatewayClient, GatewayError, StorageGateway};
pub use verification_client::{VerificationApi, VerificationClient, VerificationError};
pub use verification_poller::VerificationPoller;

use thiserror::Error;

/// Pipeline-level error taxonomy
///
/// Validation errors fail fast and are never retried. Upstream errors carry
/// status and body; the only automatic retry in the system is the
/// verification poller's own bounded loop. Ledger errors are never retried
/// since resubmission risks duplicate on-chain state.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Asset already registered for token {0}")]
    AlreadyRegistered(String),

    /// Uploaded content differs from what was fingerprinted
    #[error("Hash mismatch: {0}")]
    HashMismatch(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Common(#[from] melos_common::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
