//! Core types for LastWish
//!
//! Defines the session's non-asset records:
//! - Identifiers for wallets and beneficiaries
//! - Owner profile and patches
//! - Wallets and beneficiaries
//! - Payment record

use crate::error::StateError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

/// Unique beneficiary identifier (ULID for sortability)
///
/// Deserializes from a ULID or from any other non-empty id string; see
/// [`parse_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BeneficiaryId(pub Ulid);

impl BeneficiaryId {
    /// Generate new beneficiary ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a stored id
    ///
    /// # Errors
    /// Returns [`StateError::InvalidInput`] for a blank id
    pub fn parse(raw: &str) -> Result<Self, StateError> {
        parse_id(raw, "beneficiary id").map(Self)
    }
}

impl<'de> Deserialize<'de> for BeneficiaryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

impl Default for BeneficiaryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BeneficiaryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique wallet identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WalletId(pub Ulid);

impl WalletId {
    /// Generate new wallet ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a stored id
    ///
    /// # Errors
    /// Returns [`StateError::InvalidInput`] for a blank id
    pub fn parse(raw: &str) -> Result<Self, StateError> {
        parse_id(raw, "wallet id").map(Self)
    }
}

impl<'de> Deserialize<'de> for WalletId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// Read an id written either by this crate (a ULID) or by an older store
/// that used other string ids (e.g. nanoid).
///
/// Non-ULID strings are mapped to a ULID taken from the first 16 bytes of
/// their SHA-256 digest, so every reference to the same string in a blob
/// lands on the same id.
pub fn parse_id(raw: &str, field: &'static str) -> Result<Ulid, StateError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StateError::blank(field));
    }
    if let Ok(ulid) = Ulid::from_string(raw) {
        return Ok(ulid);
    }
    let digest = Sha256::digest(raw.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Ok(Ulid::from_bytes(bytes))
}

impl Default for WalletId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WalletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The person making the plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// Full legal name
    #[serde(default)]
    pub full_name: String,
    /// Wallet used for asset discovery when set
    #[serde(default, alias = "primaryWallet", skip_serializing_if = "Option::is_none")]
    pub primary_wallet_address: Option<String>,
    /// Free-form instructions rendered into the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl Owner {
    /// Merge a patch, overwriting only the fields it carries
    pub fn apply(&mut self, patch: OwnerPatch) {
        if let Some(name) = patch.full_name {
            self.full_name = name;
        }
        if let Some(wallet) = patch.primary_wallet_address {
            self.primary_wallet_address = non_blank(wallet);
        }
        if let Some(instructions) = patch.special_instructions {
            self.special_instructions = non_blank(instructions);
        }
    }

    /// Check if the profile has a usable name
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
    }
}

/// Partial owner update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerPatch {
    pub full_name: Option<String>,
    pub primary_wallet_address: Option<String>,
    pub special_instructions: Option<String>,
}

impl OwnerPatch {
    /// Patch that sets the full name
    #[inline]
    #[must_use]
    pub fn name(full_name: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            ..Self::default()
        }
    }

    /// With primary wallet address
    #[inline]
    #[must_use]
    pub fn with_primary_wallet(mut self, address: impl Into<String>) -> Self {
        self.primary_wallet_address = Some(address.into());
        self
    }

    /// With special instructions
    #[inline]
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.special_instructions = Some(instructions.into());
        self
    }
}

/// A wallet the owner controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: WalletId,
    pub address: String,
    #[serde(default, alias = "ens", skip_serializing_if = "Option::is_none")]
    pub ens_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
}

/// Input for adding a wallet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWallet {
    pub address: String,
    pub ens_name: Option<String>,
    pub blockchain: Option<String>,
    pub wallet_type: Option<String>,
}

impl NewWallet {
    /// Create wallet input from an address
    #[inline]
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// With ENS name
    #[inline]
    #[must_use]
    pub fn with_ens(mut self, ens: impl Into<String>) -> Self {
        self.ens_name = Some(ens.into());
        self
    }

    /// With blockchain label
    #[inline]
    #[must_use]
    pub fn with_blockchain(mut self, chain: impl Into<String>) -> Self {
        self.blockchain = Some(chain.into());
        self
    }

    /// With wallet type label (e.g. "MetaMask")
    #[inline]
    #[must_use]
    pub fn with_wallet_type(mut self, kind: impl Into<String>) -> Self {
        self.wallet_type = Some(kind.into());
        self
    }

    /// Materialize into a wallet with a fresh id
    #[must_use]
    pub fn into_wallet(self) -> Wallet {
        Wallet {
            id: WalletId::new(),
            address: self.address.trim().to_string(),
            ens_name: self.ens_name.and_then(non_blank),
            blockchain: self.blockchain.and_then(non_blank),
            wallet_type: self.wallet_type.and_then(non_blank),
        }
    }
}

/// A person who inherits some share of the assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    pub id: BeneficiaryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_or_ens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_address: Option<String>,
    /// Legacy plan-wide share; not consulted by the assignment table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_percentage: Option<f64>,
}

/// Beneficiary attributes supplied by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryProfile {
    pub name: String,
    pub address_or_ens: Option<String>,
    pub email: Option<String>,
    pub relationship: Option<String>,
    pub phone_number: Option<String>,
    pub physical_address: Option<String>,
    pub allocation_percentage: Option<f64>,
}

impl BeneficiaryProfile {
    /// Create profile with a name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With wallet address or ENS name
    #[inline]
    #[must_use]
    pub fn with_address(mut self, address_or_ens: impl Into<String>) -> Self {
        self.address_or_ens = Some(address_or_ens.into());
        self
    }

    /// With email
    #[inline]
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With relationship to the owner
    #[inline]
    #[must_use]
    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    /// With phone number
    #[inline]
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    /// With postal address
    #[inline]
    #[must_use]
    pub fn with_physical_address(mut self, address: impl Into<String>) -> Self {
        self.physical_address = Some(address.into());
        self
    }

    pub(crate) fn into_beneficiary(self, id: BeneficiaryId) -> Beneficiary {
        Beneficiary {
            id,
            name: self.name.trim().to_string(),
            address_or_ens: self.address_or_ens.and_then(non_blank),
            email: self.email.and_then(non_blank),
            relationship: self.relationship.and_then(non_blank),
            phone_number: self.phone_number.and_then(non_blank),
            physical_address: self.physical_address.and_then(non_blank),
            allocation_percentage: self.allocation_percentage,
        }
    }
}

/// Partial beneficiary update
///
/// `Some("")` clears an optional field; `None` leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryPatch {
    pub name: Option<String>,
    pub address_or_ens: Option<String>,
    pub email: Option<String>,
    pub relationship: Option<String>,
    pub phone_number: Option<String>,
    pub physical_address: Option<String>,
    pub allocation_percentage: Option<f64>,
}

impl Beneficiary {
    pub(crate) fn apply(&mut self, patch: BeneficiaryPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(v) = patch.address_or_ens {
            self.address_or_ens = non_blank(v);
        }
        if let Some(v) = patch.email {
            self.email = non_blank(v);
        }
        if let Some(v) = patch.relationship {
            self.relationship = non_blank(v);
        }
        if let Some(v) = patch.phone_number {
            self.phone_number = non_blank(v);
        }
        if let Some(v) = patch.physical_address {
            self.physical_address = non_blank(v);
        }
        if patch.allocation_percentage.is_some() {
            self.allocation_percentage = patch.allocation_percentage;
        }
    }
}

/// Payment made to unlock final document generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, alias = "txHash", skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl Payment {
    /// Check if the payment is confirmed
    #[inline]
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.unwrap_or(false)
    }
}

/// Shape of a wallet address string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// `0x` followed by 40 hex digits
    Hex,
    /// Dotted name ending in `.eth`
    Ens,
    /// Anything else (accepted, but flagged)
    Other,
}

static HEX_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap_or_else(|e| panic!("hex address pattern: {e}"))
});

static ENS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9-]+\.)+eth$").unwrap_or_else(|e| panic!("ens name pattern: {e}"))
});

impl AddressKind {
    /// Classify an address or name
    #[must_use]
    pub fn classify(value: &str) -> Self {
        let value = value.trim();
        if HEX_ADDRESS.is_match(value) {
            Self::Hex
        } else if ENS_NAME.is_match(&value.to_lowercase()) {
            Self::Ens
        } else {
            Self::Other
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
