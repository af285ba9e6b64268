//! Sessions saved by the earlier browser store keep their plan.

use lastwish_core::{
    Action, AssetKey, BeneficiaryId, KeyValueStore, LastWishConfig, MemoryStore, NftAsset,
    Session,
};
use lastwish_document::{Readiness, Requirement};
use lastwish_test_utils::{LEGACY_ALICE, LEGACY_BLOB, LEGACY_BOB, LEGACY_KEY};
use pretty_assertions::assert_eq;

fn hydrated() -> Session<MemoryStore> {
    let store = MemoryStore::new();
    store.set(LEGACY_KEY, LEGACY_BLOB).unwrap();
    Session::open(store, &LastWishConfig::default())
}

fn usdc() -> AssetKey {
    AssetKey::token(1, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
}

fn cool_cat() -> AssetKey {
    AssetKey::nft(1, "0x1a92f7381b9f03921564a437210bb9396471050c", "1234")
}

#[test]
fn legacy_blob_hydrates_with_plan_intact() {
    let session = hydrated();
    let state = session.state();
    let alice = BeneficiaryId::parse(LEGACY_ALICE).unwrap();
    let bob = BeneficiaryId::parse(LEGACY_BOB).unwrap();

    assert_eq!(state.owner.full_name, "Jane Doe");
    assert_eq!(state.wallets.len(), 1);
    assert_eq!(state.wallets[0].ens_name.as_deref(), Some("janedoe.eth"));
    assert_eq!(state.beneficiaries.ids(), vec![alice, bob]);
    assert_eq!(state.nfts[0].collection_name.as_deref(), Some("Cool Cats"));

    let token = state.assignments.get(&usdc()).unwrap();
    assert_eq!(token.percentage_of(alice), 60.0);
    assert_eq!(token.percentage_of(bob), 40.0);
    assert!(state.assignments.is_complete(&usdc()));
    assert!(state.assignments.is_complete(&cool_cat()));
    assert_eq!(
        state.payment.as_ref().and_then(|p| p.transaction_hash.as_deref()),
        Some("0xabababababababababababababababababababababababababababababababab")
    );
}

#[test]
fn legacy_plan_is_ready_except_payment_confirmation() {
    let session = hydrated();
    let readiness = Readiness::evaluate(session.state());
    assert_eq!(readiness.missing(), vec![Requirement::Payment]);
}

#[test]
fn legacy_assignments_survive_inventory_refresh() {
    let mut session = hydrated();
    let nfts = session.state().nfts.clone();
    session.dispatch(Action::SetNfts(nfts)).unwrap();
    session
        .dispatch(Action::SetNfts(vec![NftAsset::new(
            1,
            "0x1A92f7381B9F03921564a437210bB9396471050C",
            "1234",
        )]))
        .unwrap();

    let state = session.state();
    assert_eq!(state.assignments.len(), 2);
    assert!(state.assignments.all_complete());
}

#[test]
fn legacy_blob_resaves_in_current_shape() {
    let session = hydrated();
    session.save().unwrap();
    let saved = session.store().get(LEGACY_KEY).unwrap().unwrap();
    assert!(saved.contains("1:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48:token"));
    assert!(saved.contains("\"percentage\":60.0"));

    let store = MemoryStore::new();
    store.set(LEGACY_KEY, &saved).unwrap();
    let reopened = Session::open(store, &LastWishConfig::default());
    assert_eq!(reopened.state(), session.state());
}
