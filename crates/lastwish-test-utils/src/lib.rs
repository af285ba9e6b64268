//! Testing utilities for LastWish workspace
//!
//! Shared fixtures: sample assets, a populated session, and fixed
//! timestamps for reproducible documents.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use lastwish_core::{
    reduce, Action, AssetKey, BeneficiaryId, BeneficiaryProfile, NewWallet, NftAsset, OwnerPatch,
    Payment, ReducerConfig, SessionState, TokenAsset,
};

pub const OWNER_NAME: &str = "Jane Doe";
pub const WALLET_ADDRESS: &str = "0x742d35cc6634c0532925a3b844bc454e4438f44e";

pub fn sample_tokens() -> Vec<TokenAsset> {
    vec![
        TokenAsset::new(1, "0x0000000000000000000000000000000000000000", "ETH", 18, "2.5")
            .with_name("Ethereum")
            .with_value_usd(6250.0),
        TokenAsset::new(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6, "1000")
            .with_name("USD Coin")
            .with_value_usd(1000.0),
    ]
}

pub fn sample_nfts() -> Vec<NftAsset> {
    vec![NftAsset::new(1, "0x1A92f7381B9F03921564a437210bB9396471050C", "1234")
        .with_collection("Cool Cats")
        .with_display_name("Cool Cat #1234")]
}

pub fn eth_key() -> AssetKey {
    sample_tokens()[0].key()
}

pub fn usdc_key() -> AssetKey {
    sample_tokens()[1].key()
}

pub fn nft_key() -> AssetKey {
    sample_nfts()[0].key()
}

pub fn apply(state: SessionState, action: Action) -> SessionState {
    reduce(state, action, &ReducerConfig::default()).unwrap()
}

/// Owner, one wallet, the sample inventory, and the named beneficiaries.
/// Nothing committed, nothing paid.
pub fn session_with(beneficiaries: &[&str]) -> (SessionState, Vec<BeneficiaryId>) {
    let mut state = SessionState::new();
    state = apply(
        state,
        Action::SetOwner(
            OwnerPatch::name(OWNER_NAME)
                .with_primary_wallet(WALLET_ADDRESS)
                .with_instructions("Hardware wallet is in the safe."),
        ),
    );
    state = apply(
        state,
        Action::AddWallet(
            NewWallet::new(WALLET_ADDRESS)
                .with_ens("janedoe.eth")
                .with_blockchain("ethereum")
                .with_wallet_type("MetaMask"),
        ),
    );
    state = apply(state, Action::SetTokens(sample_tokens()));
    state = apply(state, Action::SetNfts(sample_nfts()));
    for name in beneficiaries {
        state = apply(
            state,
            Action::AddBeneficiary(
                BeneficiaryProfile::new(*name)
                    .with_address(format!("{}.eth", name.to_lowercase()))
                    .with_relationship("Family"),
            ),
        );
    }
    let ids = state.beneficiaries.ids();
    (state, ids)
}

/// Every requirement met: default splits committed and payment confirmed.
pub fn ready_session() -> (SessionState, Vec<BeneficiaryId>) {
    let (state, ids) = session_with(&["Alice", "Bob"]);
    let draft = state.draft();
    let state = apply(state, Action::CommitDraft(draft));
    let state = apply(state, Action::SetPayment(confirmed_payment()));
    (state, ids)
}

pub fn confirmed_payment() -> Payment {
    Payment {
        transaction_hash: Some(format!("0x{}", "ab".repeat(32))),
        confirmed: Some(true),
        amount: Some(0.0001),
    }
}

/// Session blob as written by the earlier browser store: nanoid ids,
/// checksummed addresses in keys, `pct` shares, `primaryWallet`, `ens`,
/// `collection`/`name` and `txHash`.
pub const LEGACY_BLOB: &str = r#"{
  "owner": { "fullName": "Jane Doe", "primaryWallet": "0x742d35Cc6634C0532925a3b844Bc454e4438f44e" },
  "wallets": [
    { "id": "V1StGXR8_Z5jdHi6B-myT", "address": "0x742d35Cc6634C0532925a3b844Bc454e4438f44e", "ens": "janedoe.eth" }
  ],
  "tokens": [
    { "chainId": 1, "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "symbol": "USDC", "decimals": 6, "balance": "1000" }
  ],
  "nfts": [
    { "chainId": 1, "contract": "0x1A92f7381B9F03921564a437210bB9396471050C", "tokenId": "1234", "collection": "Cool Cats", "name": "Cool Cat #1234" }
  ],
  "beneficiaries": [
    { "id": "mP3kq9Zx1TfLw0YbC4uRs", "name": "Alice", "addressOrEns": "alice.eth", "email": "alice@example.com", "relationship": "Daughter" },
    { "id": "Qe7nV2hJ8dKs5GtXa6WpL", "name": "Bob", "addressOrEns": "0x1111111111111111111111111111111111111111", "relationship": "Son" }
  ],
  "assignments": [
    { "assetKey": "1:0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48:token", "splits": [
      { "beneficiaryId": "mP3kq9Zx1TfLw0YbC4uRs", "pct": 60 },
      { "beneficiaryId": "Qe7nV2hJ8dKs5GtXa6WpL", "pct": 40 }
    ] },
    { "assetKey": "1:0x1A92f7381B9F03921564a437210bB9396471050C:1234", "splits": [
      { "beneficiaryId": "mP3kq9Zx1TfLw0YbC4uRs", "pct": 100 }
    ] }
  ],
  "payment": { "txHash": "0xabababababababababababababababababababababababababababababababab" }
}"#;

/// Storage key used by [`LEGACY_BLOB`]
pub const LEGACY_KEY: &str = "lastwish";

/// Nanoid of the first beneficiary in [`LEGACY_BLOB`]
pub const LEGACY_ALICE: &str = "mP3kq9Zx1TfLw0YbC4uRs";

/// Nanoid of the second beneficiary in [`LEGACY_BLOB`]
pub const LEGACY_BOB: &str = "Qe7nV2hJ8dKs5GtXa6WpL";

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
}
