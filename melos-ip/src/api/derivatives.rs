//! Derivative registration API handlers
//!
//! POST /derivatives/register, GET /derivatives/:ip_id

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::ApiResult;
use crate::models::{AssetMetadata, DerivativeLink};
use crate::services::RegisteredDerivative;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/derivatives/register", post(register_derivative))
        .route("/derivatives/:ip_id", get(get_lineage))
}

/// POST /derivatives/register request
#[derive(Debug, Deserialize)]
pub struct RegisterDerivativeBody {
    pub parent_ip_ids: Vec<String>,
    pub license_terms_ids: Vec<String>,
    pub metadata: AssetMetadata,
}

/// POST /derivatives/register
pub async fn register_derivative(
    State(state): State<AppState>,
    Json(body): Json<RegisterDerivativeBody>,
) -> ApiResult<Json<RegisteredDerivative>> {
    let registered = state
        .derivatives
        .register_derivative(body.parent_ip_ids, body.license_terms_ids, body.metadata)
        .await?;
    Ok(Json(registered))
}

/// GET /derivatives/:ip_id response
#[derive(Debug, Serialize)]
pub struct LineageResponse {
    pub ip_id: String,
    /// Links where this asset is the child
    pub parents: Vec<DerivativeLink>,
    /// Links where this asset is the parent
    pub children: Vec<DerivativeLink>,
}

/// GET /derivatives/:ip_id
pub async fn get_lineage(
    State(state): State<AppState>,
    Path(ip_id): Path<String>,
) -> ApiResult<Json<LineageResponse>> {
    let parents = db::derivatives::links_for_child(&state.db, &ip_id).await?;
    let children = db::derivatives::links_for_parent(&state.db, &ip_id).await?;
    Ok(Json(LineageResponse {
        ip_id,
        parents,
        children,
    }))
}
