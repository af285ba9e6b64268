//! ENS name resolution

use crate::error::ServiceError;
use async_trait::async_trait;
use lastwish_core::AddressKind;

/// Maps a human-readable name to an address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Address for `name`, `None` if it does not resolve
    async fn resolve(&self, name: &str) -> Result<Option<String>, ServiceError>;
}

/// Check if a value should be sent to the resolver
#[inline]
#[must_use]
pub fn looks_like_ens(value: &str) -> bool {
    AddressKind::classify(value) == AddressKind::Ens
}

/// Resolve, treating any failure as "no address"
pub async fn resolve_or_none<R>(resolver: &R, name: &str) -> Option<String>
where
    R: NameResolver + ?Sized,
{
    if !looks_like_ens(name) {
        return None;
    }
    match resolver.resolve(name).await {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!(name, error = %e, "name resolution failed");
            None
        }
    }
}
