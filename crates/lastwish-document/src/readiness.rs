//! Requirements checklist for final generation
//!
//! Provides [`Readiness`], evaluated from a session before the final
//! document is produced, and [`DocumentSummary`] for previews.

use lastwish_core::SessionState;
use serde::{Deserialize, Serialize};

/// One step of the plan that must be done before final generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Owner has a full name
    OwnerProfile,
    /// At least one wallet
    Wallet,
    /// At least one beneficiary
    Beneficiary,
    /// At least one committed assignment
    Assignments,
    /// Every asset has a committed assignment totalling 100%
    CompleteAssignments,
    /// Payment confirmed
    Payment,
}

impl Requirement {
    /// All requirements in checklist order
    pub const ALL: [Requirement; 6] = [
        Requirement::OwnerProfile,
        Requirement::Wallet,
        Requirement::Beneficiary,
        Requirement::Assignments,
        Requirement::CompleteAssignments,
        Requirement::Payment,
    ];

    /// Checklist label
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::OwnerProfile => "owner profile completed",
            Self::Wallet => "at least one wallet connected",
            Self::Beneficiary => "at least one beneficiary added",
            Self::Assignments => "asset assignments saved",
            Self::CompleteAssignments => "every asset assigned in full (100%)",
            Self::Payment => "payment confirmed",
        }
    }
}

/// Evaluated checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    checks: Vec<(Requirement, bool)>,
}

impl Readiness {
    /// Evaluate every requirement against a session
    #[must_use]
    pub fn evaluate(state: &SessionState) -> Self {
        let checks = Requirement::ALL
            .iter()
            .map(|r| (*r, holds(*r, state)))
            .collect();
        Self { checks }
    }

    /// Check if every requirement holds
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.checks.iter().all(|(_, ok)| *ok)
    }

    /// Unmet requirements in checklist order
    #[must_use]
    pub fn missing(&self) -> Vec<Requirement> {
        self.checks
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(r, _)| *r)
            .collect()
    }

    /// Whether a single requirement holds
    #[must_use]
    pub fn holds(&self, requirement: Requirement) -> bool {
        self.checks
            .iter()
            .any(|(r, ok)| *r == requirement && *ok)
    }

    /// Iterate over `(requirement, met)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Requirement, bool)> + '_ {
        self.checks.iter().copied()
    }
}

fn holds(requirement: Requirement, state: &SessionState) -> bool {
    match requirement {
        Requirement::OwnerProfile => state.owner.is_complete(),
        Requirement::Wallet => !state.wallets.is_empty(),
        Requirement::Beneficiary => !state.beneficiaries.is_empty(),
        Requirement::Assignments => !state.assignments.is_empty(),
        Requirement::CompleteAssignments => {
            let keys = state.asset_keys();
            !keys.is_empty() && keys.iter().all(|k| state.assignments.is_complete(k))
        }
        Requirement::Payment => state.is_paid(),
    }
}

/// Counts shown in a document preview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub wallets: usize,
    pub tokens: usize,
    pub nfts: usize,
    pub beneficiaries: usize,
    pub assignments: usize,
}

impl DocumentSummary {
    /// Summarize a session
    #[must_use]
    pub fn of(state: &SessionState) -> Self {
        Self {
            wallets: state.wallets.len(),
            tokens: state.tokens.len(),
            nfts: state.nfts.len(),
            beneficiaries: state.beneficiaries.len(),
            assignments: state.assignments.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_misses_everything() {
        let readiness = Readiness::evaluate(&SessionState::new());
        assert!(!readiness.is_ready());
        assert_eq!(readiness.missing(), Requirement::ALL.to_vec());
    }

    #[test]
    fn summary_of_empty_session() {
        assert_eq!(DocumentSummary::of(&SessionState::new()), DocumentSummary::default());
    }

    #[test]
    fn descriptions_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for r in Requirement::ALL {
            assert!(seen.insert(r.description()));
        }
    }
}
