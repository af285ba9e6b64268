//! Asset discovery
//!
//! Looks up the tokens and NFTs held by an address. The inventory feeds
//! straight into the session as `SetTokens` / `SetNfts`, so whatever comes
//! back is deduplicated by asset key first.

use crate::error::ServiceError;
use async_trait::async_trait;
use lastwish_core::{Action, AssetKey, NftAsset, TokenAsset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inventory returned for one address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredAssets {
    #[serde(default)]
    pub tokens: Vec<TokenAsset>,
    #[serde(default)]
    pub nfts: Vec<NftAsset>,
}

impl DiscoveredAssets {
    /// Check if nothing was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.nfts.is_empty()
    }

    /// Drop repeated keys, first occurrence wins; returns the dropped keys
    pub fn dedup(&mut self) -> Vec<AssetKey> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        self.tokens.retain(|t| {
            let key = t.key();
            seen.insert(key.clone()) || {
                dropped.push(key);
                false
            }
        });
        self.nfts.retain(|n| {
            let key = n.key();
            seen.insert(key.clone()) || {
                dropped.push(key);
                false
            }
        });
        dropped
    }

    /// Session actions that install this inventory
    #[must_use]
    pub fn into_actions(self) -> [Action; 2] {
        [Action::SetTokens(self.tokens), Action::SetNfts(self.nfts)]
    }
}

/// Source of wallet inventories
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetDiscovery: Send + Sync {
    /// Tokens and NFTs held by `address`
    async fn discover(&self, address: &str) -> Result<DiscoveredAssets, ServiceError>;
}

/// Discover, falling back to [`demo_assets`] on any failure
///
/// The result never contains duplicate keys.
pub async fn discover_or_demo<D>(discovery: &D, address: &str) -> DiscoveredAssets
where
    D: AssetDiscovery + ?Sized,
{
    let mut assets = match discovery.discover(address).await {
        Ok(assets) => assets,
        Err(e) => {
            tracing::warn!(address, error = %e, "asset discovery failed, using demo inventory");
            demo_assets()
        }
    };
    let dropped = assets.dedup();
    if !dropped.is_empty() {
        tracing::warn!(count = dropped.len(), "dropped duplicate assets from discovery");
    }
    assets
}

/// Fixed inventory used when discovery is unavailable
#[must_use]
pub fn demo_assets() -> DiscoveredAssets {
    DiscoveredAssets {
        tokens: vec![
            TokenAsset::new(
                1,
                "0x0000000000000000000000000000000000000000",
                "ETH",
                18,
                "1500000000000000000",
            )
            .with_name("Ethereum"),
            TokenAsset::new(
                1,
                "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                "USDC",
                6,
                "1000000000",
            )
            .with_name("USD Coin"),
        ],
        nfts: vec![
            NftAsset::new(1, "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d", "1234")
                .with_collection("Bored Ape Yacht Club")
                .with_display_name("Bored Ape #1234"),
            NftAsset::new(1, "0x60e4d786628fea6478f785a6d7e704777c86a7c6", "5678")
                .with_collection("Mutant Ape Yacht Club")
                .with_display_name("Mutant Ape #5678"),
        ],
    }
}
