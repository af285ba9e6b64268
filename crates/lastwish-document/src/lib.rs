//! LastWish Document - estate document generation
//!
//! Turns a [`lastwish_core::SessionState`] into a legal-style digital asset
//! inheritance addendum. Generation is split in two:
//! - [`Readiness`] evaluates the requirements checklist
//! - [`assemble`] renders whatever the session holds into sections
//!
//! [`generate`] combines them under a [`lastwish_core::GenerationPolicy`].
//!
//! # Example
//!
//! ```rust
//! use lastwish_core::{GenerationPolicy, SessionState};
//! use lastwish_document::{generate, DocumentMeta};
//!
//! let state = SessionState::new();
//! assert!(generate(&state, GenerationPolicy::Strict, DocumentMeta::generate()).is_err());
//!
//! let draft = generate(&state, GenerationPolicy::Advisory, DocumentMeta::generate()).unwrap();
//! assert!(draft.render_text().contains("None specified."));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod assembler;
pub mod error;
pub mod generate;
pub mod readiness;

pub use assembler::{
    assemble, format_percentage, DocumentMeta, EstateDocument, Section, SignatureBlock,
    NONE_SPECIFIED,
};
pub use error::GenerationError;
pub use generate::{generate, preview};
pub use readiness::{DocumentSummary, Readiness, Requirement};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
