//! Verification API handlers
//!
//! GET /verification/:token_id, POST /verification/:token_id/authorize

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::BrandAuthorization;
use crate::services::PipelineError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/verification/:token_id", get(get_verification))
        .route("/verification/:token_id/authorize", post(authorize_brand))
}

/// GET /verification/:token_id
///
/// Returns the stored poll outcome, including the fallback marker that
/// distinguishes synthetic timeout results from genuine clean ones.
pub async fn get_verification(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> ApiResult<Json<db::verification::VerificationRecord>> {
    let record = db::verification::get_record(&state.db, &token_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("verification record for {}", token_id)))?;
    Ok(Json(record))
}

/// POST /verification/:token_id/authorize
///
/// Pass-through to the verification service's brand authorization endpoint.
pub async fn authorize_brand(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
    Json(authorization): Json<BrandAuthorization>,
) -> ApiResult<Json<serde_json::Value>> {
    if authorization.brand_id.is_none() && authorization.brand_name.is_none() {
        return Err(ApiError::BadRequest(
            "either brand_id or brand_name is required".to_string(),
        ));
    }

    state
        .verification
        .authorize(&token_id, &authorization)
        .await
        .map_err(PipelineError::from)?;

    tracing::info!(token_id = %token_id, "Brand authorization recorded");
    Ok(Json(json!({ "token_id": token_id, "authorized": true })))
}
