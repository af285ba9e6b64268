//! End-to-end tests for the assignment reconciliation rules.
//!
//! Each scenario drives the session reducer the way the UI would (add
//! assets, add beneficiaries, edit, commit) and checks the resulting
//! assignment table.

use lastwish_core::prelude::*;
use lastwish_core::{is_complete_total, StateError};
use proptest::prelude::*;

fn run(state: SessionState, action: Action, config: &ReducerConfig) -> SessionState {
    reduce(state, action, config).expect("action should be accepted")
}

/// Session with one token, one NFT and the given beneficiaries.
fn seeded(names: &[&str], config: &ReducerConfig) -> (SessionState, Vec<BeneficiaryId>) {
    let mut state = run(
        SessionState::new(),
        Action::SetTokens(vec![TokenAsset::new(1, "0xabc", "ETH", 18, "2.5")]),
        config,
    );
    state = run(
        state,
        Action::SetNfts(vec![NftAsset::new(1, "0xdef", "1234").with_collection("Cool Cats")]),
        config,
    );
    for name in names {
        state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new(*name)), config);
    }
    let ids = state.beneficiaries.ids();
    (state, ids)
}

fn commit_draft(state: SessionState, config: &ReducerConfig) -> SessionState {
    let draft = state.draft();
    run(state, Action::CommitDraft(draft), config)
}

/// Three beneficiaries, no edits: each gets a third and the asset is complete.
#[test]
fn three_way_equal_split_is_complete() {
    let config = ReducerConfig::default();
    let (state, ids) = seeded(&["A", "B", "C"], &config);
    let key = AssetKey::token(1, "0xabc");

    let draft = state.draft();
    let assignment = draft.get(&key).unwrap();
    let got: Vec<_> = assignment.splits.iter().map(|s| s.beneficiary_id).collect();
    assert_eq!(got, ids);
    for split in &assignment.splits {
        assert!((split.percentage - 33.333_333).abs() < 1e-4);
    }
    assert!((draft.total_percentage(&key) - 100.0).abs() < 1e-9);
    assert!(draft.is_complete(&key));
}

/// Removing a beneficiary leaves no dangling references in any assignment.
#[test]
fn removal_prunes_every_assignment() {
    for policy in [RebalancePolicy::PreserveManual, RebalancePolicy::Always] {
        let config = ReducerConfig::default().with_rebalance_policy(policy);
        let (state, ids) = seeded(&["A", "B", "C"], &config);
        let mut state = commit_draft(state, &config);
        state = run(
            state,
            Action::SetPercentage {
                asset_key: AssetKey::nft(1, "0xdef", "1234"),
                beneficiary_id: ids[1],
                percentage: 50.0,
            },
            &config,
        );

        state = run(state, Action::RemoveBeneficiary(ids[1]), &config);

        for assignment in state.assignments.iter() {
            for split in &assignment.splits {
                assert!(
                    state.beneficiaries.contains(split.beneficiary_id),
                    "{policy:?}: dangling split in {}",
                    assignment.asset_key
                );
            }
        }
    }
}

/// Removing an unknown beneficiary is a silent no-op.
#[test]
fn removing_unknown_beneficiary_is_noop() {
    let config = ReducerConfig::default();
    let (state, _) = seeded(&["A"], &config);
    let state = commit_draft(state, &config);
    let before = state.clone();
    let after = run(state, Action::RemoveBeneficiary(BeneficiaryId::new()), &config);
    assert_eq!(after, before);
}

/// Policy: untouched assignments follow the beneficiary list, edited ones keep
/// their numbers.
#[test]
fn preserve_manual_policy_keeps_edits() {
    let config = ReducerConfig::default().with_rebalance_policy(RebalancePolicy::PreserveManual);
    let (state, ids) = seeded(&["A", "B"], &config);
    let mut state = commit_draft(state, &config);
    let nft = AssetKey::nft(1, "0xdef", "1234");
    let token = AssetKey::token(1, "0xabc");

    state = run(
        state,
        Action::CommitAssignment(Assignment::manual(
            nft.clone(),
            vec![Split::new(ids[0], 90.0), Split::new(ids[1], 10.0)],
        )),
        &config,
    );
    state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new("C")), &config);

    let token_splits = &state.assignments.get(&token).unwrap().splits;
    assert_eq!(token_splits.len(), 3);
    assert!(state.assignments.is_complete(&token));

    let nft_assignment = state.assignments.get(&nft).unwrap();
    assert_eq!(nft_assignment.percentage_of(ids[0]), 90.0);
    assert_eq!(nft_assignment.splits.len(), 2);
    assert!(state.assignments.is_complete(&nft));
}

/// Policy: every assignment is reset to equal shares, edits included.
#[test]
fn always_policy_resets_edits() {
    let config = ReducerConfig::default().with_rebalance_policy(RebalancePolicy::Always);
    let (state, ids) = seeded(&["A", "B"], &config);
    let mut state = commit_draft(state, &config);
    let nft = AssetKey::nft(1, "0xdef", "1234");

    state = run(
        state,
        Action::SetPercentage {
            asset_key: nft.clone(),
            beneficiary_id: ids[0],
            percentage: 90.0,
        },
        &config,
    );
    state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new("C")), &config);

    let assignment = state.assignments.get(&nft).unwrap();
    assert_eq!(assignment.splits.len(), 3);
    assert!(!assignment.manually_edited);
    assert!((assignment.percentage_of(ids[0]) - 100.0 / 3.0).abs() < 1e-9);
}

/// Manual edits drift the total instead of renormalizing; the drift is
/// reported, not rejected.
#[test]
fn manual_edit_drifts_total_without_error() {
    let config = ReducerConfig::default();
    let (state, ids) = seeded(&["A", "B"], &config);
    let state = commit_draft(state, &config);
    let token = AssetKey::token(1, "0xabc");

    let state = run(
        state,
        Action::SetPercentage {
            asset_key: token.clone(),
            beneficiary_id: ids[0],
            percentage: 60.0,
        },
        &config,
    );
    assert!((state.assignments.total_percentage(&token) - 110.0).abs() < 1e-9);
    assert!(!state.assignments.is_complete(&token));
    assert_eq!(state.assignments.incomplete_keys(), vec![token]);
}

/// Saving the same splits twice keeps a single entry for the key.
#[test]
fn committing_twice_is_idempotent() {
    let config = ReducerConfig::default();
    let (state, ids) = seeded(&["A"], &config);
    let assignment = Assignment::manual(AssetKey::token(1, "0xabc"), vec![Split::new(ids[0], 100.0)]);

    let state = run(state, Action::CommitAssignment(assignment.clone()), &config);
    let state = run(state, Action::CommitAssignment(assignment.clone()), &config);

    assert_eq!(state.assignments.len(), 1);
    assert_eq!(state.assignments.get(&assignment.asset_key), Some(&assignment));
}

/// Committing against an asset that is not in the inventory is refused.
#[test]
fn commit_for_unknown_asset_rejected() {
    let config = ReducerConfig::default();
    let (state, ids) = seeded(&["A"], &config);
    let ghost = AssetKey::token(5, "0x999");
    let err = reduce(
        state,
        Action::CommitAssignment(Assignment::manual(ghost.clone(), vec![Split::new(ids[0], 100.0)])),
        &config,
    )
    .unwrap_err();
    assert_eq!(err, StateError::UnknownAsset(ghost));
}

/// Mixed-case addresses collapse onto one key and count as duplicates.
#[test]
fn case_variant_addresses_collide() {
    let err = reduce(
        SessionState::new(),
        Action::SetTokens(vec![
            TokenAsset::new(1, "0xAbC", "A", 18, "1"),
            TokenAsset::new(1, "0xaBc", "B", 18, "1"),
        ]),
        &ReducerConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, StateError::DuplicateAsset(AssetKey::token(1, "0xabc")));
}

/// The session survives a JSON round trip unchanged, manual flags included.
#[test]
fn session_blob_round_trip() {
    let config = ReducerConfig::default();
    let (state, ids) = seeded(&["A", "B"], &config);
    let state = commit_draft(state, &config);
    let state = run(
        state,
        Action::SetPercentage {
            asset_key: AssetKey::token(1, "0xabc"),
            beneficiary_id: ids[1],
            percentage: 25.0,
        },
        &config,
    );

    let blob = serde_json::to_string(&state).unwrap();
    let back: SessionState = serde_json::from_str(&blob).unwrap();
    assert_eq!(back, state);
}

#[test]
fn completeness_window() {
    assert!(is_complete_total(99.95));
    assert!(is_complete_total(100.05));
    assert!(!is_complete_total(89.0));
    assert!(!is_complete_total(110.0));
}

proptest! {
    #[test]
    fn prop_keys_are_deterministic(
        chain in 1u64..100_000,
        contract in "0x[0-9a-fA-F]{40}",
        token_id in "[0-9]{1,12}",
    ) {
        let token = TokenAsset::new(chain, contract.clone(), "T", 18, "1");
        prop_assert_eq!(token.key(), token.clone().key());

        let nft = NftAsset::new(chain, contract.clone(), token_id.clone());
        prop_assert_eq!(nft.key(), NftAsset::new(chain, contract.to_lowercase(), token_id).key());
        prop_assert_ne!(token.key(), nft.key());
    }

    #[test]
    fn prop_equal_split_sums_to_hundred(n in 1usize..50) {
        let ids: Vec<BeneficiaryId> = (0..n).map(|_| BeneficiaryId::new()).collect();
        let key = AssetKey::token(1, "0xabc");
        let mut table = AssignmentTable::new();
        table.populate_defaults([&key], &ids);

        let assignment = table.get(&key).unwrap();
        prop_assert_eq!(assignment.splits.len(), n);
        for split in &assignment.splits {
            prop_assert!((split.percentage - 100.0 / n as f64).abs() < 1e-9);
        }
        prop_assert!(table.is_complete(&key));
    }

    #[test]
    fn prop_completeness_matches_epsilon(total in 0.0f64..200.0) {
        prop_assert_eq!(is_complete_total(total), (total - 100.0).abs() < 0.1);
    }
}

/// Editing one share of an uncommitted asset keeps the equal shares the
/// other beneficiaries were shown.
#[test]
fn first_edit_on_uncommitted_asset_seeds_equal_shares() {
    let config = ReducerConfig::default();
    let (state, ids) = seeded(&["A", "B"], &config);
    let token = AssetKey::token(1, "0xabc");
    assert!(!state.assignments.contains(&token));

    let state = run(
        state,
        Action::SetPercentage {
            asset_key: token.clone(),
            beneficiary_id: ids[0],
            percentage: 70.0,
        },
        &config,
    );
    let assignment = state.assignments.get(&token).unwrap();
    assert_eq!(assignment.splits.len(), 2);
    assert_eq!(assignment.percentage_of(ids[0]), 70.0);
    assert_eq!(assignment.percentage_of(ids[1]), 50.0);
    assert!(assignment.manually_edited);
    assert!((state.assignments.total_percentage(&token) - 120.0).abs() < 1e-9);
}

/// An out-of-range share on an uncommitted asset leaves nothing behind.
#[test]
fn rejected_first_edit_does_not_seed() {
    let config = ReducerConfig::default();
    let (mut state, ids) = seeded(&["A", "B"], &config);
    let before = state.clone();
    let err = state
        .dispatch(
            Action::SetPercentage {
                asset_key: AssetKey::token(1, "0xabc"),
                beneficiary_id: ids[0],
                percentage: 140.0,
            },
            &config,
        )
        .unwrap_err();
    assert!(matches!(err, StateError::InvalidPercentage { .. }));
    assert_eq!(state, before);
}

/// Actions decoded from JSON with a checksummed address hit the stored key.
#[test]
fn decoded_action_with_mixed_case_key_is_accepted() {
    let config = ReducerConfig::default();
    let (state, ids) = seeded(&["A"], &config);
    let state = run(
        state,
        Action::SetTokens(vec![TokenAsset::new(
            1,
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "USDC",
            6,
            "10",
        )]),
        &config,
    );
    let json = serde_json::json!({
        "type": "set_percentage",
        "payload": {
            "asset_key": "1:0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48:token",
            "beneficiary_id": ids[0],
            "percentage": 100.0,
        }
    });
    let action: Action = serde_json::from_value(json).unwrap();
    let state = run(state, action, &config);
    let key = AssetKey::token(1, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    assert!(state.assignments.is_complete(&key));
}
