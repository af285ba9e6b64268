//! Collaborators wired into a session.

use async_trait::async_trait;
use lastwish_core::{
    reduce, Action, NewWallet, ReducerConfig, ServiceConfig, SessionState, TokenAsset,
};
use lastwish_services::{
    demo_assets, discover_or_demo, verify_or_unconfirmed, AssetDiscovery, DiscoveredAssets,
    HttpBackend, MockPaymentProcessor, OpStatus, OperationTracker, PaymentQuote, PaymentReceipt,
    PaymentVerifier, ServiceError,
};
use lastwish_test_utils::{sample_nfts, sample_tokens};
use std::time::Duration;

struct FixedDiscovery(DiscoveredAssets);

#[async_trait]
impl AssetDiscovery for FixedDiscovery {
    async fn discover(&self, _address: &str) -> Result<DiscoveredAssets, ServiceError> {
        Ok(self.0.clone())
    }
}

struct ApprovingVerifier;

#[async_trait]
impl PaymentVerifier for ApprovingVerifier {
    async fn verify(&self, _tx_hash: &str) -> Result<PaymentReceipt, ServiceError> {
        Ok(PaymentReceipt {
            confirmed: true,
            ..PaymentReceipt::default()
        })
    }
}

fn install(state: SessionState, assets: DiscoveredAssets) -> SessionState {
    let config = ReducerConfig::default();
    assets
        .into_actions()
        .into_iter()
        .try_fold(state, |state, action| reduce(state, action, &config))
        .unwrap()
}

#[tokio::test]
async fn discovered_inventory_installs_into_session() {
    let found = DiscoveredAssets {
        tokens: sample_tokens(),
        nfts: sample_nfts(),
    };
    let assets = discover_or_demo(&FixedDiscovery(found), "0x1").await;
    let state = install(SessionState::new(), assets);
    assert_eq!(state.asset_keys().len(), 3);
}

#[tokio::test]
async fn duplicate_discovery_does_not_poison_session() {
    let found = DiscoveredAssets {
        tokens: vec![
            TokenAsset::new(1, "0xAbC", "X", 18, "1"),
            TokenAsset::new(1, "0xabc", "X", 18, "1"),
        ],
        nfts: vec![],
    };
    let assets = discover_or_demo(&FixedDiscovery(found), "0x1").await;
    let state = install(SessionState::new(), assets);
    assert_eq!(state.tokens.len(), 1);
}

#[tokio::test]
async fn unreachable_backend_falls_back_to_demo() {
    let backend = HttpBackend::from_config(&ServiceConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
    })
    .unwrap();
    let assets = discover_or_demo(&backend, "0x742d35cc6634c0532925a3b844bc454e4438f44e").await;
    assert_eq!(assets, demo_assets());
}

#[tokio::test]
async fn simulated_payment_confirms_session() {
    let quote = PaymentQuote::default();
    let processor = MockPaymentProcessor::new(Duration::ZERO);
    let mut tracker = OperationTracker::new("payment");

    let amount = quote.quote(true);
    let tx_hash = tracker.run(processor.pay(amount)).await.unwrap();
    assert_eq!(tracker.status(), &OpStatus::Succeeded);

    let receipt = verify_or_unconfirmed(&ApprovingVerifier, &tx_hash).await;
    let state = reduce(
        SessionState::new(),
        Action::SetPayment(receipt.into_payment(tx_hash, amount)),
        &ReducerConfig::default(),
    )
    .unwrap();
    assert!(state.is_paid());
}

#[tokio::test]
async fn wallet_then_demo_inventory() {
    let state = reduce(
        SessionState::new(),
        Action::AddWallet(NewWallet::new("0xabc")),
        &ReducerConfig::default(),
    )
    .unwrap();
    let state = install(state, demo_assets());
    assert_eq!(state.tokens.len(), 2);
    assert_eq!(state.nfts.len(), 2);
}
