//! Session state and reducer
//!
//! [`SessionState`] is the whole plan as a plain value. Every mutation is an
//! [`Action`] applied by [`reduce`], which takes the state by value and
//! returns the next state; [`SessionState::dispatch`] does the same in
//! place. A rejected action never leaves a half-applied state behind.

use crate::asset::{ensure_unique_keys, Asset, AssetKey, NftAsset, TokenAsset};
use crate::assignment::{check_percentage, Assignment, AssignmentTable, RebalancePolicy};
use crate::error::StateError;
use crate::registry::BeneficiaryRegistry;
use crate::types::{
    AddressKind, BeneficiaryId, BeneficiaryPatch, BeneficiaryProfile, NewWallet, Owner,
    OwnerPatch, Payment, Wallet, WalletId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The complete estate plan for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub owner: Owner,
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub tokens: Vec<TokenAsset>,
    #[serde(default)]
    pub nfts: Vec<NftAsset>,
    #[serde(default)]
    pub beneficiaries: BeneficiaryRegistry,
    /// Committed assignments only; see [`SessionState::draft`]
    #[serde(default)]
    pub assignments: AssignmentTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

impl SessionState {
    /// Create empty session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens then NFTs, as one list
    #[must_use]
    pub fn assets(&self) -> Vec<Asset> {
        self.tokens
            .iter()
            .cloned()
            .map(Asset::Token)
            .chain(self.nfts.iter().cloned().map(Asset::Nft))
            .collect()
    }

    /// Keys of every asset in inventory order
    #[must_use]
    pub fn asset_keys(&self) -> Vec<AssetKey> {
        self.tokens
            .iter()
            .map(TokenAsset::key)
            .chain(self.nfts.iter().map(NftAsset::key))
            .collect()
    }

    /// Look up an asset by key
    #[must_use]
    pub fn asset(&self, key: &AssetKey) -> Option<Asset> {
        self.tokens
            .iter()
            .find(|t| &t.key() == key)
            .cloned()
            .map(Asset::Token)
            .or_else(|| self.nfts.iter().find(|n| &n.key() == key).cloned().map(Asset::Nft))
    }

    /// Address used for asset discovery
    ///
    /// The owner's primary wallet if set, otherwise the first connected
    /// wallet.
    #[must_use]
    pub fn primary_address(&self) -> Option<&str> {
        self.owner
            .primary_wallet_address
            .as_deref()
            .or_else(|| self.wallets.first().map(|w| w.address.as_str()))
    }

    /// Editing view of the assignments
    ///
    /// Committed assignments for assets still in the inventory, plus an
    /// equal split for every asset that has none yet.
    #[must_use]
    pub fn draft(&self) -> AssignmentTable {
        let keys = self.asset_keys();
        let mut table = self.assignments.clone();
        table.retain_assets(&keys.iter().cloned().collect());
        table.populate_defaults(&keys, &self.beneficiaries.ids());
        table
    }

    /// Check if payment has been confirmed
    #[inline]
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment.as_ref().is_some_and(Payment::is_confirmed)
    }

    fn asset_key_set(&self) -> HashSet<AssetKey> {
        self.asset_keys().into_iter().collect()
    }
}

/// Settings the reducer consults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerConfig {
    /// Policy applied when beneficiaries are added or removed
    pub rebalance_policy: RebalancePolicy,
}

impl ReducerConfig {
    /// With rebalance policy
    #[inline]
    #[must_use]
    pub fn with_rebalance_policy(mut self, policy: RebalancePolicy) -> Self {
        self.rebalance_policy = policy;
        self
    }
}

/// Every mutation a session supports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    /// Merge owner fields
    SetOwner(OwnerPatch),
    /// Connect or record a wallet
    AddWallet(NewWallet),
    /// Forget a wallet
    RemoveWallet(WalletId),
    /// Replace the token inventory
    SetTokens(Vec<TokenAsset>),
    /// Replace the NFT inventory
    SetNfts(Vec<NftAsset>),
    /// Drop one asset and its assignment
    RemoveAsset(AssetKey),
    /// Register a beneficiary
    AddBeneficiary(BeneficiaryProfile),
    /// Merge beneficiary fields
    UpdateBeneficiary {
        id: BeneficiaryId,
        patch: BeneficiaryPatch,
    },
    /// Remove a beneficiary and prune their splits
    RemoveBeneficiary(BeneficiaryId),
    /// Edit one split directly in the committed table
    SetPercentage {
        asset_key: AssetKey,
        beneficiary_id: BeneficiaryId,
        percentage: f64,
    },
    /// Save one assignment (last writer wins)
    CommitAssignment(Assignment),
    /// Save every entry of an edited draft
    CommitDraft(AssignmentTable),
    /// Delete one assignment
    RemoveAssignment(AssetKey),
    /// Record payment outcome
    SetPayment(Payment),
    /// Start over
    Reset,
}

impl Action {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetOwner(_) => "set_owner",
            Self::AddWallet(_) => "add_wallet",
            Self::RemoveWallet(_) => "remove_wallet",
            Self::SetTokens(_) => "set_tokens",
            Self::SetNfts(_) => "set_nfts",
            Self::RemoveAsset(_) => "remove_asset",
            Self::AddBeneficiary(_) => "add_beneficiary",
            Self::UpdateBeneficiary { .. } => "update_beneficiary",
            Self::RemoveBeneficiary(_) => "remove_beneficiary",
            Self::SetPercentage { .. } => "set_percentage",
            Self::CommitAssignment(_) => "commit_assignment",
            Self::CommitDraft(_) => "commit_draft",
            Self::RemoveAssignment(_) => "remove_assignment",
            Self::SetPayment(_) => "set_payment",
            Self::Reset => "reset",
        }
    }
}

/// Apply one action, state in, state out
///
/// # Errors
/// Returns a [`StateError`] when the action is rejected. The input state is
/// consumed either way; use [`SessionState::dispatch`] to keep it.
pub fn reduce(
    mut state: SessionState,
    action: Action,
    config: &ReducerConfig,
) -> Result<SessionState, StateError> {
    state.dispatch(action, config)?;
    Ok(state)
}

impl SessionState {
    /// Apply one action in place
    ///
    /// # Errors
    /// Returns a [`StateError`] when the action is rejected; `self` is then
    /// left exactly as it was.
    pub fn dispatch(&mut self, action: Action, config: &ReducerConfig) -> Result<(), StateError> {
        let name = action.name();
        match apply(self, action, config) {
            Ok(()) => {
                tracing::debug!(action = name, "session updated");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(action = name, error = %e, "action rejected");
                Err(e)
            }
        }
    }
}

// Each arm validates before touching `state`, so an Err leaves it unchanged.
fn apply(state: &mut SessionState, action: Action, config: &ReducerConfig) -> Result<(), StateError> {
    match action {
        Action::SetOwner(patch) => state.owner.apply(patch),
        Action::AddWallet(wallet) => {
            if wallet.address.trim().is_empty() {
                return Err(StateError::blank("address"));
            }
            state.wallets.push(wallet.into_wallet());
        }
        Action::RemoveWallet(id) => state.wallets.retain(|w| w.id != id),
        Action::SetTokens(tokens) => {
            ensure_unique_keys(
                tokens
                    .iter()
                    .map(TokenAsset::key)
                    .chain(state.nfts.iter().map(NftAsset::key)),
            )?;
            state.tokens = tokens;
            drop_orphans(state);
        }
        Action::SetNfts(nfts) => {
            ensure_unique_keys(
                state
                    .tokens
                    .iter()
                    .map(TokenAsset::key)
                    .chain(nfts.iter().map(NftAsset::key)),
            )?;
            state.nfts = nfts;
            drop_orphans(state);
        }
        Action::RemoveAsset(key) => {
            if !state.asset_key_set().contains(&key) {
                return Err(StateError::UnknownAsset(key));
            }
            state.tokens.retain(|t| t.key() != key);
            state.nfts.retain(|n| n.key() != key);
            state.assignments.remove(&key);
        }
        Action::AddBeneficiary(profile) => {
            if let Some(address) = profile.address_or_ens.as_deref() {
                if AddressKind::classify(address) == AddressKind::Other {
                    tracing::warn!(address, "beneficiary address is neither hex nor ENS");
                }
            }
            let added = state.beneficiaries.add(profile)?;
            tracing::debug!(id = %added.id, "beneficiary added");
            rebalance(state, config);
        }
        Action::UpdateBeneficiary { id, patch } => {
            state.beneficiaries.update(id, patch)?;
        }
        Action::RemoveBeneficiary(id) => {
            if state.beneficiaries.remove(id).is_some() {
                let pruned = state.assignments.prune_beneficiary(id);
                tracing::debug!(%id, pruned, "beneficiary removed");
                rebalance(state, config);
            }
        }
        Action::SetPercentage {
            asset_key,
            beneficiary_id,
            percentage,
        } => {
            check_refs(state, &asset_key, &[beneficiary_id])?;
            check_percentage(percentage)?;
            if !state.assignments.contains(&asset_key) {
                let seeded = Assignment::equal(asset_key.clone(), &state.beneficiaries.ids());
                state.assignments.commit(seeded);
            }
            state
                .assignments
                .set_percentage(&asset_key, beneficiary_id, percentage)?;
        }
        Action::CommitAssignment(assignment) => {
            let ids: Vec<_> = assignment.splits.iter().map(|s| s.beneficiary_id).collect();
            check_refs(state, &assignment.asset_key, &ids)?;
            state.assignments.commit(assignment);
        }
        Action::CommitDraft(draft) => {
            for assignment in draft.iter() {
                let ids: Vec<_> = assignment.splits.iter().map(|s| s.beneficiary_id).collect();
                check_refs(state, &assignment.asset_key, &ids)?;
            }
            for assignment in Vec::from(draft) {
                state.assignments.commit(assignment);
            }
        }
        Action::RemoveAssignment(key) => {
            state.assignments.remove(&key);
        }
        Action::SetPayment(payment) => state.payment = Some(payment),
        Action::Reset => *state = SessionState::default(),
    }
    Ok(())
}

fn check_refs(
    state: &SessionState,
    asset_key: &AssetKey,
    beneficiaries: &[BeneficiaryId],
) -> Result<(), StateError> {
    if !state.asset_key_set().contains(asset_key) {
        return Err(StateError::UnknownAsset(asset_key.clone()));
    }
    if let Some(missing) = beneficiaries
        .iter()
        .find(|id| !state.beneficiaries.contains(**id))
    {
        return Err(StateError::UnknownBeneficiary(*missing));
    }
    Ok(())
}

fn rebalance(state: &mut SessionState, config: &ReducerConfig) {
    let report = state
        .assignments
        .rebalance(&state.beneficiaries.ids(), config.rebalance_policy);
    tracing::debug!(
        rebalanced = report.rebalanced.len(),
        preserved = report.preserved.len(),
        policy = ?config.rebalance_policy,
        "assignments rebalanced"
    );
}

fn drop_orphans(state: &mut SessionState) {
    let keys = state.asset_key_set();
    let dropped = state.assignments.retain_assets(&keys);
    if !dropped.is_empty() {
        tracing::debug!(count = dropped.len(), "dropped assignments for vanished assets");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: SessionState, action: Action) -> SessionState {
        reduce(state, action, &ReducerConfig::default()).unwrap()
    }

    fn with_assets() -> SessionState {
        let state = run(
            SessionState::new(),
            Action::SetTokens(vec![TokenAsset::new(1, "0xabc", "ETH", 18, "1")]),
        );
        run(state, Action::SetNfts(vec![NftAsset::new(1, "0xdef", "7")]))
    }

    #[test]
    fn add_wallet_requires_address() {
        let err = reduce(
            SessionState::new(),
            Action::AddWallet(NewWallet::new(" ")),
            &ReducerConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn primary_address_falls_back_to_first_wallet() {
        let state = run(SessionState::new(), Action::AddWallet(NewWallet::new("0x1")));
        assert_eq!(state.primary_address(), Some("0x1"));
        let state = run(state, Action::SetOwner(OwnerPatch::default().with_primary_wallet("0x2")));
        assert_eq!(state.primary_address(), Some("0x2"));
    }

    #[test]
    fn set_tokens_rejects_collision_with_nfts() {
        let state = run(SessionState::new(), Action::SetNfts(vec![NftAsset::new(1, "0xa", "token")]));
        let err = reduce(
            state,
            Action::SetTokens(vec![TokenAsset::new(1, "0xA", "X", 0, "1")]),
            &ReducerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StateError::DuplicateAsset(_)));
    }

    #[test]
    fn draft_defaults_uncommitted_assets() {
        let state = with_assets();
        let state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new("A")));
        let state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new("B")));
        assert!(state.assignments.is_empty());

        let draft = state.draft();
        assert_eq!(draft.len(), 2);
        assert!(draft.all_complete());
    }

    #[test]
    fn commit_draft_saves_every_entry() {
        let state = with_assets();
        let state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new("A")));
        let draft = state.draft();
        let state = run(state, Action::CommitDraft(draft.clone()));
        let state = run(state, Action::CommitDraft(draft));
        assert_eq!(state.assignments.len(), 2);
    }

    #[test]
    fn set_percentage_checks_references() {
        let state = with_assets();
        let err = reduce(
            state,
            Action::SetPercentage {
                asset_key: AssetKey::token(1, "0xabc"),
                beneficiary_id: BeneficiaryId::new(),
                percentage: 10.0,
            },
            &ReducerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StateError::UnknownBeneficiary(_)));
    }

    #[test]
    fn remove_asset_drops_assignment() {
        let state = with_assets();
        let state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new("A")));
        let draft = state.draft();
        let state = run(state, Action::CommitDraft(draft));
        let key = AssetKey::nft(1, "0xdef", "7");
        let state = run(state, Action::RemoveAsset(key.clone()));
        assert!(state.asset(&key).is_none());
        assert!(!state.assignments.contains(&key));
    }

    #[test]
    fn replacing_inventory_drops_orphans() {
        let state = with_assets();
        let state = run(state, Action::AddBeneficiary(BeneficiaryProfile::new("A")));
        let draft = state.draft();
        let state = run(state, Action::CommitDraft(draft));
        let state = run(state, Action::SetNfts(Vec::new()));
        assert_eq!(state.assignments.len(), 1);
        assert!(state.assignments.contains(&AssetKey::token(1, "0xabc")));
    }

    #[test]
    fn dispatch_leaves_state_on_error() {
        let mut state = with_assets();
        let before = state.clone();
        let err = state.dispatch(
            Action::SetTokens(vec![
                TokenAsset::new(1, "0x1", "A", 0, "1"),
                TokenAsset::new(1, "0x1", "B", 0, "1"),
            ]),
            &ReducerConfig::default(),
        );
        assert!(err.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn reset_clears_everything() {
        let state = with_assets();
        let state = run(state, Action::Reset);
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn action_serializes_tagged() {
        let action = Action::RemoveAssignment(AssetKey::token(1, "0xabc"));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "remove_assignment");
        assert_eq!(json["payload"], "1:0xabc:token");
    }
}
