//! Verification poller
//!
//! Drives a submitted verification job to a terminal outcome with a bounded
//! polling loop: up to 10 status fetches spaced 1 second apart. When the
//! budget runs out while the job is still running, a synthetic verified
//! outcome is substituted so the creator is not blocked indefinitely. That
//! fallback carries its own marker and a distinct confidence so it can never
//! be mistaken for a genuine clean result downstream.

use crate::models::{InfringementResult, InfringementStatus, VerificationOutcome};
use crate::services::verification_client::VerificationApi;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Maximum status fetches before the fallback kicks in
pub const MAX_POLL_ATTEMPTS: u32 = 10;

/// Fixed delay between status fetches
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Confidence reported for a synthesized timeout fallback result
pub const FALLBACK_CONFIDENCE: u8 = 85;

/// Confidence reported for a genuine clean result
pub const CLEAN_CONFIDENCE: u8 = 90;

/// Confidence reported when the infringement check was bypassed
pub const NOT_CHECKED_CONFIDENCE: u8 = 95;

/// Bounded-retry poller over the verification service
pub struct VerificationPoller {
    api: Arc<dyn VerificationApi>,
    max_attempts: u32,
    poll_interval: Duration,
}

impl VerificationPoller {
    pub fn new(api: Arc<dyn VerificationApi>) -> Self {
        Self {
            api,
            max_attempts: MAX_POLL_ATTEMPTS,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the poll budget (tests and operator tuning)
    pub fn with_budget(api: Arc<dyn VerificationApi>, max_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            api,
            max_attempts,
            poll_interval,
        }
    }

    /// Poll until a terminal outcome or budget exhaustion
    ///
    /// Cancellation is cooperative, checked once per loop iteration so an
    /// in-flight status fetch is never torn down.
    pub async fn poll(&self, token_id: &str, cancel_token: &CancellationToken) -> VerificationOutcome {
        let mut job_observed = false;
        let mut last_error: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            if cancel_token.is_cancelled() {
                tracing::info!(token_id = %token_id, attempt, "Verification poll cancelled");
                return VerificationOutcome::Failed {
                    hash_mismatch: false,
                    message: "verification poll cancelled".to_string(),
                };
            }

            match self.api.fetch_status(token_id).await {
                Ok(result) => {
                    job_observed = true;

                    if let Some(media) = result.first_media_failure() {
                        let hash_mismatch = media.fetch_status
                            == crate::models::FetchStatus::HashMismatch;
                        let message = if hash_mismatch {
                            format!(
                                "media {} hash mismatch: content may have been modified after upload",
                                media.media_id
                            )
                        } else {
                            format!("media {} fetch failed, try again", media.media_id)
                        };
                        tracing::warn!(token_id = %token_id, media_id = %media.media_id, hash_mismatch, "Verification failed");
                        return VerificationOutcome::Failed {
                            hash_mismatch,
                            message,
                        };
                    }

                    if result.infringement_status == InfringementStatus::Failed {
                        tracing::warn!(token_id = %token_id, "Infringement analysis failed");
                        return VerificationOutcome::Failed {
                            hash_mismatch: false,
                            message: "infringement analysis failed, try again".to_string(),
                        };
                    }

                    if result.all_media_succeeded()
                        && result.infringement_status == InfringementStatus::Succeeded
                    {
                        if result.has_infringements() {
                            let confidence = result
                                .external_infringements
                                .iter()
                                .map(|i| i.confidence)
                                .chain(result.in_network_infringements.iter().map(|i| i.confidence))
                                .max()
                                .unwrap_or(0);
                            tracing::info!(
                                token_id = %token_id,
                                external = result.external_infringements.len(),
                                in_network = result.in_network_infringements.len(),
                                confidence,
                                "Verification resolved: flagged"
                            );
                            return VerificationOutcome::Flagged {
                                confidence,
                                external: result.external_infringements,
                                in_network: result.in_network_infringements,
                            };
                        }

                        let confidence =
                            if result.infringement_result == InfringementResult::NotChecked {
                                NOT_CHECKED_CONFIDENCE
                            } else {
                                CLEAN_CONFIDENCE
                            };
                        tracing::info!(token_id = %token_id, confidence, "Verification resolved: clean");
                        return VerificationOutcome::Clean { confidence };
                    }

                    tracing::debug!(
                        token_id = %token_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        "Verification still running"
                    );
                }
                Err(e) => {
                    // Upstream errors are retried only within this bounded loop
                    last_error = Some(e.to_string());
                    tracing::warn!(
                        token_id = %token_id,
                        attempt,
                        error = %e,
                        "Verification status fetch failed"
                    );
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        if !job_observed {
            let message = format!(
                "verification service unreachable: {}",
                last_error.unwrap_or_else(|| "no response".to_string())
            );
            tracing::error!(token_id = %token_id, "Verification poll exhausted without a response");
            return VerificationOutcome::Failed {
                hash_mismatch: false,
                message,
            };
        }

        tracing::warn!(
            token_id = %token_id,
            attempts = self.max_attempts,
            "Verification timed out, substituting fallback result"
        );
        VerificationOutcome::TimeoutFallback {
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}
