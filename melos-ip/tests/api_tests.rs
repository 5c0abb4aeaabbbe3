//! HTTP API tests against the full router with mock collaborators

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use helpers::*;
use http_body_util::BodyExt;
use melos_ip::build_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body() -> Value {
    json!({
        "metadata": {
            "title": "Midnight Symphony",
            "description": "A nocturne in three movements",
            "creators": [{
                "name": "Aria Vale",
                "address": "0xabc0000000000000000000000000000000000001",
                "contribution_percent": 100
            }],
            "media_url": "https://content.example/midnight-symphony.mp3",
            "media_mime": "audio/mpeg",
            "image_url": "https://content.example/midnight-symphony.png"
        },
        "timestamp": 1700000000u64
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let pool = test_pool().await;
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        Arc::new(MockLedger::default()),
    )
    .await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "melos-ip");
}

#[tokio::test]
async fn test_register_route_clean_flow() {
    let pool = test_pool().await;
    let gateway = Arc::new(MockGateway::default());
    let ledger = Arc::new(MockLedger::default());
    let state = build_state(
        pool,
        gateway.clone(),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        ledger.clone(),
    )
    .await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/assets/register")
                .header("content-type", "application/json")
                .body(Body::from(register_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "registered");
    assert_eq!(body["verified"], true);
    assert_eq!(body["fallback"], false);
    assert!(body["ip_id"].as_str().unwrap().starts_with("0xip"));
    assert_eq!(body["license_terms_ids"].as_array().unwrap().len(), 1);
    assert_eq!(gateway.upload_count(), 2);
    assert_eq!(ledger.mint_count(), 1);
}

#[tokio::test]
async fn test_register_route_flagged_response() {
    let pool = test_pool().await;
    let ledger = Arc::new(MockLedger::default());
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::Flagged(88))),
        ledger.clone(),
    )
    .await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/assets/register")
                .header("content-type", "application/json")
                .body(Body::from(register_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "flagged");
    assert_eq!(body["confidence"], 88);
    assert_eq!(
        body["external_infringements"][0]["brand_name"],
        "SomeLabel"
    );
    assert_eq!(ledger.mint_count(), 0);
}

#[tokio::test]
async fn test_register_route_hash_mismatch_is_422() {
    let pool = test_pool().await;
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::HashMismatch)),
        Arc::new(MockLedger::default()),
    )
    .await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/assets/register")
                .header("content-type", "application/json")
                .body(Body::from(register_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "HASH_MISMATCH");
}

#[tokio::test]
async fn test_get_unknown_asset_is_404() {
    let pool = test_pool().await;
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        Arc::new(MockLedger::default()),
    )
    .await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/assets/0xmissing:1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_claim_route_with_defaults() {
    let pool = test_pool().await;
    let ledger = Arc::new(MockLedger::default());
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        ledger.clone(),
    )
    .await;
    let app = build_router(state);

    // child_ip_ids and royalty_policies omitted: claims against the
    // ancestor alone
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/royalties/claim")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "ancestor_ip_id": "0xip1",
                        "claimer": "0xabc0000000000000000000000000000000000001"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["claimed_amount"], 350);
    assert_eq!(ledger.claim_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_derivative_route_records_lineage() {
    let pool = test_pool().await;
    let ledger = Arc::new(MockLedger::default());
    let state = build_state(
        pool.clone(),
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        ledger,
    )
    .await;
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/derivatives/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "parent_ip_ids": ["0xparent1", "0xparent2"],
                        "license_terms_ids": ["42"],
                        "metadata": register_body()["metadata"]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let child_ip_id = body["child_ip_id"].as_str().unwrap().to_string();
    assert!(child_ip_id.starts_with("0xchild"));

    let lineage = app
        .oneshot(
            Request::builder()
                .uri(format!("/derivatives/{}", child_ip_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(lineage.status(), StatusCode::OK);
    let lineage_body = body_json(lineage).await;
    assert_eq!(lineage_body["parents"].as_array().unwrap().len(), 2);
}
