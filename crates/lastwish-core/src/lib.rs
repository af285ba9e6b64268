//! LastWish Core - estate plan state
//!
//! Everything a digital estate plan holds, and the rules that keep it
//! consistent:
//! - Deterministic asset keys joining tokens and NFTs to assignments
//! - A beneficiary registry
//! - Per-asset percentage splits with equal-share defaults, manual
//!   overrides, and rebalancing when beneficiaries change
//! - A reducer over the whole session, plus JSON-blob persistence
//!
//! # Example
//!
//! ```rust
//! use lastwish_core::prelude::*;
//!
//! let config = ReducerConfig::default();
//! let state = SessionState::new();
//! let state = reduce(
//!     state,
//!     Action::SetTokens(vec![TokenAsset::new(1, "0xabc", "ETH", 18, "2.5")]),
//!     &config,
//! )
//! .unwrap();
//! let state = reduce(state, Action::AddBeneficiary(BeneficiaryProfile::new("Ana")), &config).unwrap();
//!
//! let draft = state.draft();
//! assert!(draft.is_complete(&AssetKey::token(1, "0xabc")));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod asset;
pub mod assignment;
pub mod config;
pub mod error;
pub mod persistence;
pub mod registry;
pub mod session;
pub mod types;

// Re-exports for convenience
pub use asset::{ensure_unique_keys, Asset, AssetKey, NftAsset, TokenAsset};
pub use assignment::{
    equal_splits, is_complete_total, Assignment, AssignmentTable, RebalancePolicy,
    RebalanceReport, Split, COMPLETENESS_EPSILON,
};
pub use config::{GenerationPolicy, LastWishConfig, PaymentConfig, ServiceConfig};
pub use error::{ConfigError, PersistenceError, StateError};
pub use persistence::{load_state, DispatchError, FileStore, KeyValueStore, MemoryStore, Session};
pub use registry::BeneficiaryRegistry;
pub use session::{reduce, Action, ReducerConfig, SessionState};
pub use types::{
    AddressKind, Beneficiary, BeneficiaryId, BeneficiaryPatch, BeneficiaryProfile, NewWallet,
    Owner, OwnerPatch, Payment, Wallet, WalletId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with LastWish Core
    pub use crate::{
        reduce, Action, Asset, AssetKey, Assignment, AssignmentTable, BeneficiaryId,
        BeneficiaryProfile, LastWishConfig, NewWallet, NftAsset, OwnerPatch, RebalancePolicy,
        ReducerConfig, SessionState, Split, TokenAsset,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
