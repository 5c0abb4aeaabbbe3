//! Royalty and license API handlers
//!
//! POST /royalties/claim, GET /royalties/:ip_id/pending, POST /licenses/mint

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::services::ledger_client::{MintLicenseTokensRequest, MintLicenseTokensResponse};
use crate::services::PendingRevenue;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/royalties/claim", post(claim_revenue))
        .route("/royalties/:ip_id/pending", get(pending_revenue))
        .route("/licenses/mint", post(mint_license_tokens))
}

/// POST /royalties/claim request
///
/// `child_ip_ids` and `royalty_policies` may be omitted: the claim then runs
/// against the ancestor alone.
#[derive(Debug, Deserialize)]
pub struct ClaimRevenueBody {
    pub ancestor_ip_id: String,
    pub claimer: String,
    #[serde(default)]
    pub child_ip_ids: Vec<String>,
    #[serde(default)]
    pub royalty_policies: Vec<String>,
    #[serde(default)]
    pub currency_tokens: Vec<String>,
}

/// POST /royalties/claim response
#[derive(Debug, Serialize)]
pub struct ClaimRevenueApiResponse {
    pub ancestor_ip_id: String,
    pub claimed_amount: i64,
}

/// POST /royalties/claim
pub async fn claim_revenue(
    State(state): State<AppState>,
    Json(body): Json<ClaimRevenueBody>,
) -> ApiResult<Json<ClaimRevenueApiResponse>> {
    let ancestor_ip_id = body.ancestor_ip_id.clone();
    let claimed_amount = state
        .derivatives
        .claim_revenue(
            body.ancestor_ip_id,
            body.claimer,
            body.child_ip_ids,
            body.royalty_policies,
            body.currency_tokens,
        )
        .await?;
    Ok(Json(ClaimRevenueApiResponse {
        ancestor_ip_id,
        claimed_amount,
    }))
}

/// GET /royalties/:ip_id/pending
pub async fn pending_revenue(
    State(state): State<AppState>,
    Path(ip_id): Path<String>,
) -> ApiResult<Json<PendingRevenue>> {
    let pending = state.derivatives.pending_revenue(&ip_id).await?;
    Ok(Json(pending))
}

/// POST /licenses/mint
pub async fn mint_license_tokens(
    State(state): State<AppState>,
    Json(request): Json<MintLicenseTokensRequest>,
) -> ApiResult<Json<MintLicenseTokensResponse>> {
    let response = state.derivatives.mint_license_tokens(request).await?;
    Ok(Json(response))
}
