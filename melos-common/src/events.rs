//! Event types for the melos event system
//!
//! Registration pipeline lifecycle events broadcast over an in-process bus
//! and forwarded to SSE subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Melos event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MelosEvent {
    /// Registration pipeline accepted a new asset
    RegistrationStarted {
        token_id: String,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Verification request accepted by the verification service
    VerificationSubmitted {
        token_id: String,
        media_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Verification poll reached a terminal outcome
    VerificationResolved {
        token_id: String,
        status: String,
        confidence: Option<u8>,
        fallback: bool,
        timestamp: DateTime<Utc>,
    },

    /// Asset registered against the IP ledger
    AssetRegistered {
        token_id: String,
        ip_id: String,
        transaction_hash: String,
        timestamp: DateTime<Utc>,
    },

    /// Derivative relationship registered
    DerivativeRegistered {
        child_ip_id: String,
        parent_ip_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// Revenue claim completed
    RevenueClaimed {
        ancestor_ip_id: String,
        claimer: String,
        claimed_amount: i64,
        timestamp: DateTime<Utc>,
    },
}

impl MelosEvent {
    /// Event type name used as the SSE event field
    pub fn event_name(&self) -> &'static str {
        match self {
            MelosEvent::RegistrationStarted { .. } => "RegistrationStarted",
            MelosEvent::VerificationSubmitted { .. } => "VerificationSubmitted",
            MelosEvent::VerificationResolved { .. } => "VerificationResolved",
            MelosEvent::AssetRegistered { .. } => "AssetRegistered",
            MelosEvent::DerivativeRegistered { .. } => "DerivativeRegistered",
            MelosEvent::RevenueClaimed { .. } => "RevenueClaimed",
        }
    }
}

/// Broadcast event bus shared by services and SSE handlers
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MelosEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MelosEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: MelosEvent,
    ) -> Result<usize, broadcast::error::SendError<MelosEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MelosEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
