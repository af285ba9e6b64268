//! Error types for LastWish Core
//!
//! Covers:
//! - Rejected user input (blank names, out-of-range percentages)
//! - Asset key collisions and unknown references
//! - Session persistence failures
//! - Configuration loading

use crate::asset::AssetKey;
use crate::types::BeneficiaryId;

/// Errors raised while mutating session state
///
/// Every variant leaves the state it was raised against untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    /// A required field was missing or blank
    #[error("invalid input: {field} {reason}")]
    InvalidInput {
        /// Offending field
        field: &'static str,
        /// Human-readable reason
        reason: String,
    },

    /// Percentage was negative, above 100 or not a number
    #[error("invalid percentage {value} (expected 0..=100)")]
    InvalidPercentage { value: f64 },

    /// Two assets in one inventory share a composite key
    #[error("duplicate asset key: {0}")]
    DuplicateAsset(AssetKey),

    /// Asset key is not in the inventory
    #[error("unknown asset: {0}")]
    UnknownAsset(AssetKey),

    /// Beneficiary id is not in the registry
    #[error("unknown beneficiary: {0}")]
    UnknownBeneficiary(BeneficiaryId),

    /// Asset key string could not be parsed
    #[error("malformed asset key: {0}")]
    MalformedKey(String),
}

impl StateError {
    /// Shorthand for a blank required field
    #[inline]
    #[must_use]
    pub fn blank(field: &'static str) -> Self {
        Self::InvalidInput {
            field,
            reason: "is required".to_string(),
        }
    }

    /// Check if error came from user input (shown as an inline warning)
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::InvalidPercentage { .. } | Self::MalformedKey(_)
        )
    }
}

/// Errors raised by the key-value persistence layer
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Underlying storage I/O failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Blob could not be encoded or decoded
    #[error("session blob encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Storage key is not usable by the backend
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::LastWishConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but a value is out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Human-readable reason
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_error_display() {
        let err = StateError::blank("name");
        assert_eq!(err.to_string(), "invalid input: name is required");
    }

    #[test]
    fn state_error_is_input_error() {
        assert!(StateError::blank("name").is_input_error());
        assert!(StateError::InvalidPercentage { value: -1.0 }.is_input_error());
        assert!(!StateError::DuplicateAsset(AssetKey::from_raw("1:0xabc:token")).is_input_error());
    }

    #[test]
    fn persistence_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = PersistenceError::from(json_err);
        assert!(err.to_string().starts_with("session blob encoding failed"));
    }
}
