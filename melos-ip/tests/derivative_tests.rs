//! Derivative and revenue manager integration tests

mod helpers;

use helpers::*;
use melos_ip::db;
use melos_ip::services::ledger_client::MintLicenseTokensRequest;
use melos_ip::services::PipelineError;
use std::sync::Arc;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_register_derivative_records_one_link_per_parent() {
    let pool = test_pool().await;
    let gateway = Arc::new(MockGateway::default());
    let ledger = Arc::new(MockLedger::default());
    let state = build_state(
        pool.clone(),
        gateway.clone(),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        ledger.clone(),
    )
    .await;

    let registered = state
        .derivatives
        .register_derivative(
            vec!["0xparent1".to_string(), "0xparent2".to_string()],
            vec!["42".to_string()],
            sample_metadata(),
        )
        .await
        .unwrap();

    assert_eq!(ledger.derivative_calls.load(Ordering::SeqCst), 1);
    // Derivative metadata goes through the same two-document upload
    assert_eq!(gateway.upload_count(), 2);

    let parents = db::derivatives::links_for_child(&pool, &registered.child_ip_id)
        .await
        .unwrap();
    assert_eq!(parents.len(), 2);
    // Single terms id covers all parents
    assert!(parents.iter().all(|l| l.license_terms_id == "42"));

    // The child is recorded as an asset of its own, unverified
    let child = db::ip_assets::find_by_ip_id(&pool, &registered.child_ip_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!child.verified);
    assert_eq!(child.token_id, None);
}

#[tokio::test]
async fn test_register_derivative_requires_parents() {
    let pool = test_pool().await;
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        Arc::new(MockLedger::default()),
    )
    .await;

    let result = state
        .derivatives
        .register_derivative(vec![], vec!["42".to_string()], sample_metadata())
        .await;

    assert!(matches!(result, Err(PipelineError::Validation(_))));
}

#[tokio::test]
async fn test_claim_revenue_tolerates_empty_children_and_policies() {
    let pool = test_pool().await;
    let ledger = Arc::new(MockLedger::default());
    let state = build_state(
        pool.clone(),
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        ledger.clone(),
    )
    .await;

    let claimed = state
        .derivatives
        .claim_revenue(
            "0xip1".to_string(),
            "0xclaimer".to_string(),
            vec![],
            vec![],
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(claimed, 350);
    assert_eq!(ledger.claim_calls.load(Ordering::SeqCst), 1);

    // The claim is appended with the configured currency token defaulted in
    let claims = db::revenue::claims_for(&pool, "0xip1").await.unwrap();
    assert_eq!(claims.len(), 1);
    assert!(claims[0].child_ip_ids.is_empty());
    assert_eq!(claims[0].currency_tokens.len(), 1);
}

#[tokio::test]
async fn test_pending_revenue_is_earned_minus_claimed() {
    let pool = test_pool().await;
    let state = build_state(
        pool.clone(),
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        Arc::new(MockLedger::default()),
    )
    .await;

    // Seed an asset with observed lifetime revenue
    db::ip_assets::insert_asset(
        &pool,
        &melos_ip::models::IpAsset {
            ip_id: "0xip1".to_string(),
            token_id: Some("0xc:1".to_string()),
            transaction_hash: "0xtx".to_string(),
            license_terms_ids: vec!["42".to_string()],
            creators: sample_metadata().creators,
            media_ref: "bafy1".to_string(),
            verified: true,
            verification_token_id: None,
            total_revenue: 0,
            created_at: chrono::Utc::now(),
        },
    )
    .await
    .unwrap();
    db::ip_assets::set_total_revenue(&pool, "0xip1", 1000)
        .await
        .unwrap();

    // Two claims (the mock ledger grants 350 each)
    for _ in 0..2 {
        state
            .derivatives
            .claim_revenue(
                "0xip1".to_string(),
                "0xclaimer".to_string(),
                vec![],
                vec![],
                vec![],
            )
            .await
            .unwrap();
    }

    let pending = state.derivatives.pending_revenue("0xip1").await.unwrap();
    assert_eq!(pending.total_revenue_earned, 1000);
    assert_eq!(pending.total_claimed, 700);
    assert_eq!(pending.pending_revenue, 300);
}

#[tokio::test]
async fn test_pending_revenue_unknown_asset_is_not_found() {
    let pool = test_pool().await;
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        Arc::new(MockLedger::default()),
    )
    .await;

    let result = state.derivatives.pending_revenue("0xnobody").await;
    assert!(matches!(
        result,
        Err(PipelineError::Common(melos_common::Error::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_mint_license_tokens_requires_positive_amount() {
    let pool = test_pool().await;
    let ledger = Arc::new(MockLedger::default());
    let state = build_state(
        pool,
        Arc::new(MockGateway::default()),
        Arc::new(MockVerification::new(VerifyBehavior::CleanFirstFetch)),
        ledger.clone(),
    )
    .await;

    let result = state
        .derivatives
        .mint_license_tokens(MintLicenseTokensRequest {
            licensor_ip_id: "0xip1".to_string(),
            license_terms_id: "42".to_string(),
            amount: 0,
            max_minting_fee: 1,
            max_revenue_share: 5,
            receiver: "0xabc".to_string(),
        })
        .await;

    assert!(matches!(result, Err(PipelineError::Validation(_))));
    assert_eq!(ledger.license_calls.load(Ordering::SeqCst), 0);

    let minted = state
        .derivatives
        .mint_license_tokens(MintLicenseTokensRequest {
            licensor_ip_id: "0xip1".to_string(),
            license_terms_id: "42".to_string(),
            amount: 3,
            max_minting_fee: 1,
            max_revenue_share: 5,
            receiver: "0xabc".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(minted.license_token_ids.len(), 3);
}
