//! LastWish Services - external collaborators
//!
//! Async traits for the calls an estate plan makes outside the process,
//! each with a reqwest-backed implementation in [`http`] and a fallback
//! that never fails:
//! - [`AssetDiscovery`] / [`discover_or_demo`]
//! - [`NameResolver`] / [`resolve_or_none`]
//! - [`PaymentVerifier`] / [`verify_or_unconfirmed`]
//! - [`DocumentPinner`] / [`pin_or_local`]
//!
//! [`PaymentQuote`] and [`MockPaymentProcessor`] cover the pricing side;
//! [`OperationTracker`] exposes in-flight state.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod discovery;
pub mod error;
pub mod http;
pub mod names;
pub mod payment;
pub mod pinning;
pub mod status;

pub use discovery::{demo_assets, discover_or_demo, AssetDiscovery, DiscoveredAssets};
pub use error::ServiceError;
pub use http::HttpBackend;
pub use names::{looks_like_ens, resolve_or_none, NameResolver};
pub use payment::{
    verify_or_unconfirmed, MockPaymentProcessor, PaymentQuote, PaymentReceipt, PaymentVerifier,
};
pub use pinning::{local_cid, pin_or_local, DocumentPinner, PinnedDocument, LOCAL_CID_PREFIX};
pub use status::{OpStatus, OperationTracker};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
