//! Beneficiary registry
//!
//! Provides [`BeneficiaryRegistry`], the ordered collection of beneficiaries
//! that assignments refer to by id. Removal here does not touch
//! assignments; the session reducer prunes them afterwards.

use crate::error::StateError;
use crate::types::{Beneficiary, BeneficiaryId, BeneficiaryPatch, BeneficiaryProfile};
use serde::{Deserialize, Serialize};

/// Ordered beneficiary collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeneficiaryRegistry {
    entries: Vec<Beneficiary>,
}

impl BeneficiaryRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a beneficiary with a freshly generated id
    ///
    /// Only the name is checked. Email and address values are stored as
    /// given, malformed or not.
    ///
    /// # Errors
    /// Returns [`StateError::InvalidInput`] if the name is blank
    pub fn add(&mut self, profile: BeneficiaryProfile) -> Result<Beneficiary, StateError> {
        if profile.name.trim().is_empty() {
            return Err(StateError::blank("name"));
        }
        let beneficiary = profile.into_beneficiary(self.fresh_id());
        self.entries.push(beneficiary.clone());
        Ok(beneficiary)
    }

    /// Remove a beneficiary, returning it if it existed
    pub fn remove(&mut self, id: BeneficiaryId) -> Option<Beneficiary> {
        let idx = self.entries.iter().position(|b| b.id == id)?;
        Some(self.entries.remove(idx))
    }

    /// Merge a patch into an existing beneficiary
    ///
    /// # Errors
    /// - `StateError::UnknownBeneficiary` if the id is not registered
    /// - `StateError::InvalidInput` if the patch blanks the name
    pub fn update(
        &mut self,
        id: BeneficiaryId,
        patch: BeneficiaryPatch,
    ) -> Result<&Beneficiary, StateError> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(StateError::blank("name"));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StateError::UnknownBeneficiary(id))?;
        entry.apply(patch);
        Ok(entry)
    }

    /// Look up by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: BeneficiaryId) -> Option<&Beneficiary> {
        self.entries.iter().find(|b| b.id == id)
    }

    /// Check if id is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: BeneficiaryId) -> bool {
        self.get(id).is_some()
    }

    /// Registered ids in insertion order
    #[must_use]
    pub fn ids(&self) -> Vec<BeneficiaryId> {
        self.entries.iter().map(|b| b.id).collect()
    }

    /// Name for an id, if registered
    #[inline]
    #[must_use]
    pub fn name_of(&self, id: BeneficiaryId) -> Option<&str> {
        self.get(id).map(|b| b.name.as_str())
    }

    /// Number of beneficiaries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Beneficiary> {
        self.entries.iter()
    }

    // ULIDs from one process are unique in practice; hydrated blobs may
    // carry ids from elsewhere, so check anyway.
    fn fresh_id(&self) -> BeneficiaryId {
        loop {
            let id = BeneficiaryId::new();
            if !self.contains(id) {
                return id;
            }
        }
    }
}
