//! Asset identity
//!
//! Provides [`AssetKey`], the composite identifier joining assets to their
//! assignments, and the [`Asset`] sum type over fungible tokens and NFTs.
//!
//! # Key format
//! - Token: `{chain_id}:{contract_address}:token`
//! - NFT: `{chain_id}:{contract_address}:{token_id}`
//!
//! Contract addresses are lowercased before keying, so `0xABC` and `0xabc`
//! name the same asset. Token ids are kept verbatim.

use crate::error::StateError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Suffix used in place of a token id for fungible tokens
pub const TOKEN_SUFFIX: &str = "token";

/// Composite asset identifier
///
/// Deserialization goes through [`FromStr`], so keys read from a blob or an
/// action get the same normalization as keys built from assets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetKey(String);

impl AssetKey {
    /// Key for a fungible token
    #[must_use]
    pub fn token(chain_id: u64, contract_address: &str) -> Self {
        Self(format!(
            "{chain_id}:{}:{TOKEN_SUFFIX}",
            normalize_address(contract_address)
        ))
    }

    /// Key for a single NFT
    #[must_use]
    pub fn nft(chain_id: u64, contract_address: &str, token_id: &str) -> Self {
        Self(format!(
            "{chain_id}:{}:{}",
            normalize_address(contract_address),
            token_id.trim()
        ))
    }

    /// Wrap a string without checking or normalizing it
    #[inline]
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the key string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into chain id, contract address and suffix
    ///
    /// # Errors
    /// Returns [`StateError::MalformedKey`] if the key does not have three
    /// non-empty parts or the chain id is not numeric
    pub fn parts(&self) -> Result<(u64, &str, &str), StateError> {
        let mut it = self.0.splitn(3, ':');
        let (Some(chain), Some(contract), Some(suffix)) = (it.next(), it.next(), it.next()) else {
            return Err(StateError::MalformedKey(self.0.clone()));
        };
        if contract.is_empty() || suffix.is_empty() {
            return Err(StateError::MalformedKey(self.0.clone()));
        }
        let chain_id = chain
            .parse::<u64>()
            .map_err(|_| StateError::MalformedKey(self.0.clone()))?;
        Ok((chain_id, contract, suffix))
    }

    /// Check if the key names a fungible token
    #[inline]
    #[must_use]
    pub fn is_token(&self) -> bool {
        self.0.ends_with(":token")
    }
}

impl Display for AssetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetKey {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = Self(s.trim().to_string());
        let (chain_id, contract, suffix) = key.parts()?;
        if suffix == TOKEN_SUFFIX {
            Ok(Self::token(chain_id, contract))
        } else {
            Ok(Self::nft(chain_id, contract, suffix))
        }
    }
}

impl TryFrom<String> for AssetKey {
    type Error = StateError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<AssetKey> for String {
    fn from(key: AssetKey) -> Self {
        key.0
    }
}

fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Fungible token holding snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAsset {
    pub chain_id: u64,
    #[serde(alias = "address")]
    pub contract_address: String,
    pub symbol: String,
    #[serde(default)]
    pub decimals: u8,
    /// Balance as a decimal string (never parsed)
    #[serde(default)]
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_usd: Option<f64>,
}

impl TokenAsset {
    /// Create token snapshot
    #[must_use]
    pub fn new(
        chain_id: u64,
        contract_address: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        balance: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            contract_address: contract_address.into(),
            symbol: symbol.into(),
            decimals,
            balance: balance.into(),
            name: None,
            value_usd: None,
        }
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With USD valuation
    #[inline]
    #[must_use]
    pub fn with_value_usd(mut self, value: f64) -> Self {
        self.value_usd = Some(value);
        self
    }

    /// Composite key
    #[inline]
    #[must_use]
    pub fn key(&self) -> AssetKey {
        AssetKey::token(self.chain_id, &self.contract_address)
    }
}

/// Non-fungible token holding snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAsset {
    pub chain_id: u64,
    #[serde(alias = "contract")]
    pub contract_address: String,
    pub token_id: String,
    #[serde(default, alias = "collection", skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NftAsset {
    /// Create NFT snapshot
    #[must_use]
    pub fn new(chain_id: u64, contract_address: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            chain_id,
            contract_address: contract_address.into(),
            token_id: token_id.into(),
            collection_name: None,
            display_name: None,
            image_url: None,
        }
    }

    /// With collection name
    #[inline]
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection_name = Some(collection.into());
        self
    }

    /// With item display name
    #[inline]
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// With image URL
    #[inline]
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Composite key
    #[inline]
    #[must_use]
    pub fn key(&self) -> AssetKey {
        AssetKey::nft(self.chain_id, &self.contract_address, &self.token_id)
    }
}

/// Any holding that can be assigned to beneficiaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Asset {
    /// Fungible token balance
    Token(TokenAsset),
    /// Single NFT
    Nft(NftAsset),
}

impl Asset {
    /// Composite key
    #[inline]
    #[must_use]
    pub fn key(&self) -> AssetKey {
        match self {
            Self::Token(t) => t.key(),
            Self::Nft(n) => n.key(),
        }
    }

    /// Human-readable label
    ///
    /// Tokens render as `SYMBOL (Name)`, NFTs as `Name (Collection)` with
    /// `NFT #id` standing in for a missing name.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Token(t) => match &t.name {
                Some(name) => format!("{} ({name})", t.symbol),
                None => t.symbol.clone(),
            },
            Self::Nft(n) => {
                let name = n
                    .display_name
                    .clone()
                    .unwrap_or_else(|| format!("NFT #{}", n.token_id));
                match &n.collection_name {
                    Some(collection) => format!("{name} ({collection})"),
                    None => name,
                }
            }
        }
    }

    /// Chain the asset lives on
    #[inline]
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Token(t) => t.chain_id,
            Self::Nft(n) => n.chain_id,
        }
    }
}

impl From<TokenAsset> for Asset {
    fn from(t: TokenAsset) -> Self {
        Self::Token(t)
    }
}

impl From<NftAsset> for Asset {
    fn from(n: NftAsset) -> Self {
        Self::Nft(n)
    }
}

/// Reject an inventory in which two entries share a key
///
/// # Errors
/// Returns [`StateError::DuplicateAsset`] naming the first repeated key
pub fn ensure_unique_keys<I>(keys: I) -> Result<(), StateError>
where
    I: IntoIterator<Item = AssetKey>,
{
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            return Err(StateError::DuplicateAsset(key));
        }
    }
    Ok(())
}
