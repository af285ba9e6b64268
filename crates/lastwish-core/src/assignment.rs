//! Assignment table
//!
//! Maps each [`AssetKey`] to the ordered beneficiary splits for that asset.
//!
//! # Behaviour
//! - Assets without an assignment get an equal split over all current
//!   beneficiaries ([`AssignmentTable::populate_defaults`]).
//! - A manual edit replaces one split and marks the assignment as edited;
//!   the other splits are never renormalized.
//! - When beneficiaries change, [`AssignmentTable::rebalance`] recomputes
//!   equal shares according to a [`RebalancePolicy`].
//! - Totals are advisory: an incomplete assignment is reported, never
//!   rejected.

use crate::asset::AssetKey;
use crate::error::StateError;
use crate::types::BeneficiaryId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance used when checking that splits add up to 100
pub const COMPLETENESS_EPSILON: f64 = 0.1;

/// Full share in percent
pub const FULL_SHARE: f64 = 100.0;

/// One beneficiary's share of one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub beneficiary_id: BeneficiaryId,
    #[serde(alias = "pct")]
    pub percentage: f64,
}

impl Split {
    /// Create split
    #[inline]
    #[must_use]
    pub fn new(beneficiary_id: BeneficiaryId, percentage: f64) -> Self {
        Self {
            beneficiary_id,
            percentage,
        }
    }
}

/// All splits for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub asset_key: AssetKey,
    pub splits: Vec<Split>,
    /// Set by any direct percentage edit; cleared only by a forced rebalance
    #[serde(default)]
    pub manually_edited: bool,
}

impl Assignment {
    /// Equal split across the given beneficiaries
    #[must_use]
    pub fn equal(asset_key: AssetKey, beneficiaries: &[BeneficiaryId]) -> Self {
        Self {
            asset_key,
            splits: equal_splits(beneficiaries),
            manually_edited: false,
        }
    }

    /// Assignment with explicit splits, treated as a manual edit
    #[must_use]
    pub fn manual(asset_key: AssetKey, splits: Vec<Split>) -> Self {
        Self {
            asset_key,
            splits,
            manually_edited: true,
        }
    }

    /// Sum of split percentages
    #[inline]
    #[must_use]
    pub fn total(&self) -> f64 {
        self.splits.iter().map(|s| s.percentage).sum()
    }

    /// Check if splits add up to 100 within [`COMPLETENESS_EPSILON`]
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        is_complete_total(self.total())
    }

    /// Percentage held by a beneficiary (0 when absent)
    #[must_use]
    pub fn percentage_of(&self, id: BeneficiaryId) -> f64 {
        self.splits
            .iter()
            .find(|s| s.beneficiary_id == id)
            .map_or(0.0, |s| s.percentage)
    }

    /// Check if any split references the beneficiary
    #[inline]
    #[must_use]
    pub fn references(&self, id: BeneficiaryId) -> bool {
        self.splits.iter().any(|s| s.beneficiary_id == id)
    }
}

/// Equal percentages for each beneficiary, empty when there are none
#[must_use]
pub fn equal_splits(beneficiaries: &[BeneficiaryId]) -> Vec<Split> {
    if beneficiaries.is_empty() {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let share = FULL_SHARE / beneficiaries.len() as f64;
    beneficiaries.iter().map(|id| Split::new(*id, share)).collect()
}

/// Reject shares outside `0..=100` or not finite
///
/// # Errors
/// Returns [`StateError::InvalidPercentage`]
pub fn check_percentage(percentage: f64) -> Result<(), StateError> {
    if percentage.is_finite() && (0.0..=FULL_SHARE).contains(&percentage) {
        Ok(())
    } else {
        Err(StateError::InvalidPercentage { value: percentage })
    }
}

/// Completeness check on a raw total
#[inline]
#[must_use]
pub fn is_complete_total(total: f64) -> bool {
    (total - FULL_SHARE).abs() < COMPLETENESS_EPSILON
}

/// What happens to existing assignments when beneficiaries change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalancePolicy {
    /// Recompute equal shares only for assignments never edited by hand;
    /// edited ones just lose removed beneficiaries
    #[default]
    PreserveManual,

    /// Recompute equal shares for every assignment, discarding edits
    Always,
}

/// Outcome of a rebalance pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebalanceReport {
    /// Assignments reset to equal shares
    pub rebalanced: Vec<AssetKey>,
    /// Edited assignments left in place (possibly pruned)
    pub preserved: Vec<AssetKey>,
}

/// Ordered map of asset key to assignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Assignment>", into = "Vec<Assignment>")]
pub struct AssignmentTable {
    entries: IndexMap<AssetKey, Assignment>,
}

impl From<Vec<Assignment>> for AssignmentTable {
    // Later entries win, matching commit semantics.
    fn from(list: Vec<Assignment>) -> Self {
        let mut table = Self::new();
        for assignment in list {
            table.commit(assignment);
        }
        table
    }
}

impl From<AssignmentTable> for Vec<Assignment> {
    fn from(table: AssignmentTable) -> Self {
        table.entries.into_values().collect()
    }
}

impl AssignmentTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Give every asset without an assignment an equal split
    ///
    /// Existing assignments are left untouched. Returns the keys that were
    /// populated.
    pub fn populate_defaults<'a, I>(
        &mut self,
        asset_keys: I,
        beneficiaries: &[BeneficiaryId],
    ) -> Vec<AssetKey>
    where
        I: IntoIterator<Item = &'a AssetKey>,
    {
        let mut populated = Vec::new();
        for key in asset_keys {
            if !self.entries.contains_key(key) {
                self.entries
                    .insert(key.clone(), Assignment::equal(key.clone(), beneficiaries));
                populated.push(key.clone());
            }
        }
        populated
    }

    /// Set one beneficiary's share of one asset
    ///
    /// Replaces that entry (appending it if absent) and marks the assignment
    /// as manually edited. Other entries keep their values, so the total may
    /// drift away from 100.
    ///
    /// # Errors
    /// Returns [`StateError::InvalidPercentage`] unless `0 <= percentage <= 100`
    pub fn set_percentage(
        &mut self,
        asset_key: &AssetKey,
        beneficiary_id: BeneficiaryId,
        percentage: f64,
    ) -> Result<(), StateError> {
        check_percentage(percentage)?;
        let assignment = self
            .entries
            .entry(asset_key.clone())
            .or_insert_with(|| Assignment::manual(asset_key.clone(), Vec::new()));
        match assignment
            .splits
            .iter_mut()
            .find(|s| s.beneficiary_id == beneficiary_id)
        {
            Some(split) => split.percentage = percentage,
            None => assignment.splits.push(Split::new(beneficiary_id, percentage)),
        }
        assignment.manually_edited = true;
        Ok(())
    }

    /// Replace any prior assignment for the same key
    ///
    /// Last writer wins; the entry moves to the end of the table.
    pub fn commit(&mut self, assignment: Assignment) {
        self.entries.shift_remove(&assignment.asset_key);
        self.entries.insert(assignment.asset_key.clone(), assignment);
    }

    /// Remove the assignment for a key
    pub fn remove(&mut self, asset_key: &AssetKey) -> Option<Assignment> {
        self.entries.shift_remove(asset_key)
    }

    /// Drop every split referencing the beneficiary
    ///
    /// Returns the number of assignments that changed.
    pub fn prune_beneficiary(&mut self, id: BeneficiaryId) -> usize {
        let mut changed = 0;
        for assignment in self.entries.values_mut() {
            let before = assignment.splits.len();
            assignment.splits.retain(|s| s.beneficiary_id != id);
            if assignment.splits.len() != before {
                changed += 1;
            }
        }
        changed
    }

    /// Bring every assignment in line with the current beneficiary set
    ///
    /// Splits for ids not in `beneficiaries` are always dropped.
    pub fn rebalance(
        &mut self,
        beneficiaries: &[BeneficiaryId],
        policy: RebalancePolicy,
    ) -> RebalanceReport {
        let current: HashSet<BeneficiaryId> = beneficiaries.iter().copied().collect();
        let mut report = RebalanceReport::default();

        for (key, assignment) in &mut self.entries {
            let reset = match policy {
                RebalancePolicy::Always => true,
                RebalancePolicy::PreserveManual => !assignment.manually_edited,
            };
            if reset {
                assignment.splits = equal_splits(beneficiaries);
                assignment.manually_edited = false;
                report.rebalanced.push(key.clone());
            } else {
                assignment
                    .splits
                    .retain(|s| current.contains(&s.beneficiary_id));
                report.preserved.push(key.clone());
            }
        }
        report
    }

    /// Keep only assignments whose asset is in `asset_keys`
    ///
    /// Returns the keys that were dropped.
    pub fn retain_assets(&mut self, asset_keys: &HashSet<AssetKey>) -> Vec<AssetKey> {
        let dropped: Vec<AssetKey> = self
            .entries
            .keys()
            .filter(|k| !asset_keys.contains(*k))
            .cloned()
            .collect();
        self.entries.retain(|k, _| asset_keys.contains(k));
        dropped
    }

    /// Sum of splits for a key (0 if the key has no assignment)
    #[must_use]
    pub fn total_percentage(&self, asset_key: &AssetKey) -> f64 {
        self.entries.get(asset_key).map_or(0.0, Assignment::total)
    }

    /// Check if the key's splits add up to 100
    #[must_use]
    pub fn is_complete(&self, asset_key: &AssetKey) -> bool {
        is_complete_total(self.total_percentage(asset_key))
    }

    /// Check if every assignment in the table is complete
    #[must_use]
    pub fn all_complete(&self) -> bool {
        self.entries.values().all(Assignment::is_complete)
    }

    /// Keys whose splits do not add up to 100
    #[must_use]
    pub fn incomplete_keys(&self) -> Vec<AssetKey> {
        self.entries
            .values()
            .filter(|a| !a.is_complete())
            .map(|a| a.asset_key.clone())
            .collect()
    }

    /// Check if any assignment references a beneficiary
    #[must_use]
    pub fn references(&self, id: BeneficiaryId) -> bool {
        self.entries.values().any(|a| a.references(id))
    }

    /// Look up by key
    #[inline]
    #[must_use]
    pub fn get(&self, asset_key: &AssetKey) -> Option<&Assignment> {
        self.entries.get(asset_key)
    }

    /// Check if key has an assignment
    #[inline]
    #[must_use]
    pub fn contains(&self, asset_key: &AssetKey) -> bool {
        self.entries.contains_key(asset_key)
    }

    /// Number of assignments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in table order
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.entries.values()
    }
}
