//! Configuration
//!
//! [`LastWishConfig`] gathers every tunable of the workspace. It has sane
//! defaults, builder-style overrides, and can be loaded from TOML:
//!
//! ```toml
//! rebalance_policy = "preserve_manual"
//! generation_policy = "strict"
//! storage_key = "lastwish"
//!
//! [services]
//! base_url = "http://localhost:8888/.netlify/functions"
//! timeout_secs = 10
//!
//! [payment]
//! base_price_eth = 0.0001
//! ens_discount = 0.2
//! ```

use crate::assignment::RebalancePolicy;
use crate::error::ConfigError;
use crate::session::ReducerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default key under which the session blob is stored
pub const DEFAULT_STORAGE_KEY: &str = "lastwish";

/// Whether unmet requirements block final document generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPolicy {
    /// Refuse to generate until every requirement holds
    #[default]
    Strict,
    /// Always generate; unmet requirements become warnings
    Advisory,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastWishConfig {
    /// Applied when beneficiaries are added or removed
    pub rebalance_policy: RebalancePolicy,
    /// Applied when generating the final document
    pub generation_policy: GenerationPolicy,
    /// Key for the persisted session blob
    pub storage_key: String,
    /// Backend endpoints
    pub services: ServiceConfig,
    /// Pricing
    pub payment: PaymentConfig,
}

impl LastWishConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the text is not valid or a value is out of
    /// range
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading config");
        Self::from_toml_str(&text)
    }

    /// With rebalance policy
    #[inline]
    #[must_use]
    pub fn with_rebalance_policy(mut self, policy: RebalancePolicy) -> Self {
        self.rebalance_policy = policy;
        self
    }

    /// With generation policy
    #[inline]
    #[must_use]
    pub fn with_generation_policy(mut self, policy: GenerationPolicy) -> Self {
        self.generation_policy = policy;
        self
    }

    /// With storage key
    #[inline]
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// With services base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.services.base_url = url.into();
        self
    }

    /// Reducer settings derived from this config
    #[inline]
    #[must_use]
    pub fn reducer(&self) -> ReducerConfig {
        ReducerConfig::default().with_rebalance_policy(self.rebalance_policy)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.services.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "services.timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.payment.ens_discount) {
            return Err(ConfigError::Invalid {
                field: "payment.ens_discount",
                reason: format!("{} not in 0..1", self.payment.ens_discount),
            });
        }
        if !(self.payment.base_price_eth.is_finite() && self.payment.base_price_eth >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "payment.base_price_eth",
                reason: "must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for LastWishConfig {
    fn default() -> Self {
        Self {
            rebalance_policy: RebalancePolicy::default(),
            generation_policy: GenerationPolicy::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            services: ServiceConfig::default(),
            payment: PaymentConfig::default(),
        }
    }
}

/// Backend endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL the discovery, resolution and payment paths hang off
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888/.netlify/functions".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Pricing settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Price of final generation in ETH
    pub base_price_eth: f64,
    /// Fractional discount for owners holding an ENS name
    pub ens_discount: f64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_price_eth: 0.0001,
            ens_discount: 0.20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = LastWishConfig::new();
        assert_eq!(config.rebalance_policy, RebalancePolicy::PreserveManual);
        assert_eq!(config.generation_policy, GenerationPolicy::Strict);
        assert_eq!(config.storage_key, "lastwish");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_partial_toml() {
        let config = LastWishConfig::from_toml_str(
            r#"
            rebalance_policy = "always"

            [services]
            timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.rebalance_policy, RebalancePolicy::Always);
        assert_eq!(config.services.timeout_secs, 3);
        assert_eq!(config.generation_policy, GenerationPolicy::Strict);
        assert_eq!(config.reducer().rebalance_policy, RebalancePolicy::Always);
    }

    #[test]
    fn config_rejects_bad_values() {
        let err = LastWishConfig::from_toml_str("[payment]\nens_discount = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "payment.ens_discount", .. }));

        let err = LastWishConfig::from_toml_str("storage_key = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "storage_key", .. }));

        assert!(matches!(
            LastWishConfig::from_toml_str("generation_policy = \"maybe\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn config_builder() {
        let config = LastWishConfig::new()
            .with_generation_policy(GenerationPolicy::Advisory)
            .with_storage_key("plan")
            .with_base_url("https://example.org/api");
        assert_eq!(config.generation_policy, GenerationPolicy::Advisory);
        assert_eq!(config.storage_key, "plan");
        assert_eq!(config.services.base_url, "https://example.org/api");
    }

    #[test]
    fn config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lastwish.toml");
        std::fs::write(&path, "generation_policy = \"advisory\"\n").unwrap();
        let config = LastWishConfig::load(&path).unwrap();
        assert_eq!(config.generation_policy, GenerationPolicy::Advisory);
    }
}
