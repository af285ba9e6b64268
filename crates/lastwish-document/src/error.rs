//! Error types for document generation

use crate::readiness::Requirement;

/// Final document generation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Strict policy and some requirements are unmet
    #[error("plan not ready: {}", describe(.missing))]
    NotReady {
        /// Unmet requirements, in checklist order
        missing: Vec<Requirement>,
    },
}

impl GenerationError {
    /// Unmet requirements carried by the error
    #[inline]
    #[must_use]
    pub fn missing(&self) -> &[Requirement] {
        match self {
            Self::NotReady { missing } => missing,
        }
    }
}

fn describe(missing: &[Requirement]) -> String {
    missing
        .iter()
        .map(|r| r.description())
        .collect::<Vec<_>>()
        .join("; ")
}
