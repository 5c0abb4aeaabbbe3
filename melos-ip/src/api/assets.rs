//! Asset registration API handlers
//!
//! POST /assets/register, GET /assets, GET /assets/:token_id

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::IpAsset;
use crate::services::{RegistrationInput, RegistrationOutcome};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets/register", post(register_asset))
        .route("/assets", get(list_assets))
        .route("/assets/:token_id", get(get_asset))
}

/// POST /assets/register
///
/// Runs the full verify-then-register pipeline and returns a tagged outcome:
/// `registered` with the ledger identifiers, or `flagged` with the full
/// infringement detail when the gating policy skipped registration.
pub async fn register_asset(
    State(state): State<AppState>,
    Json(input): Json<RegistrationInput>,
) -> ApiResult<Json<RegistrationOutcome>> {
    let cancel_token = CancellationToken::new();
    let outcome = state
        .orchestrator
        .register_verified(input, &cancel_token)
        .await?;
    Ok(Json(outcome))
}

/// GET /assets query parameters
#[derive(Debug, Deserialize)]
pub struct ListAssetsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /assets response
#[derive(Debug, Serialize)]
pub struct ListAssetsResponse {
    pub assets: Vec<IpAsset>,
    pub limit: i64,
    pub offset: i64,
}

/// GET /assets
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<ListAssetsQuery>,
) -> ApiResult<Json<ListAssetsResponse>> {
    let limit = query.limit.clamp(1, 200);
    let assets = db::ip_assets::list_assets(&state.db, limit, query.offset.max(0)).await?;
    Ok(Json(ListAssetsResponse {
        assets,
        limit,
        offset: query.offset.max(0),
    }))
}

/// GET /assets/:token_id response
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub asset: IpAsset,
    pub verification: Option<db::verification::VerificationRecord>,
}

/// GET /assets/:token_id
pub async fn get_asset(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> ApiResult<Json<AssetResponse>> {
    let asset = db::ip_assets::find_by_token_id(&state.db, &token_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("asset for token {}", token_id)))?;

    let verification = match &asset.verification_token_id {
        Some(verification_token_id) => {
            db::verification::get_record(&state.db, verification_token_id).await?
        }
        None => None,
    };

    Ok(Json(AssetResponse {
        asset,
        verification,
    }))
}
