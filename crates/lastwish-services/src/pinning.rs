//! Pinning generated documents to IPFS
//!
//! The pin endpoint takes the document JSON and answers with a content id.
//! When it is unreachable or misbehaves, [`pin_or_local`] falls back to a
//! locally derived id so generation never blocks on the network.

use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix of locally derived content ids
pub const LOCAL_CID_PREFIX: &str = "Qm";

const LOCAL_CID_DIGITS: usize = 44;

/// Where a pinned document can be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedDocument {
    pub cid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// True when the id was derived locally instead of by the pin service
    #[serde(default)]
    pub local: bool,
}

/// Stores a document and returns its content id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentPinner: Send + Sync {
    async fn pin(&self, document: &serde_json::Value) -> Result<PinnedDocument, ServiceError>;
}

/// Content id derived from the pretty-printed document
///
/// `Qm` followed by the first 44 hex digits of its SHA-256. Stable for
/// identical documents; not a real IPFS multihash.
#[must_use]
pub fn local_cid(document: &serde_json::Value) -> String {
    let text = serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string());
    let digest = hex::encode(Sha256::digest(text.as_bytes()));
    format!("{LOCAL_CID_PREFIX}{}", &digest[..LOCAL_CID_DIGITS])
}

/// Pin, falling back to [`local_cid`] on any failure
pub async fn pin_or_local<P>(pinner: &P, document: &serde_json::Value) -> PinnedDocument
where
    P: DocumentPinner + ?Sized,
{
    match pinner.pin(document).await {
        Ok(pinned) => {
            tracing::info!(cid = %pinned.cid, "document pinned");
            pinned
        }
        Err(e) => {
            let cid = local_cid(document);
            tracing::warn!(error = %e, %cid, "pinning failed, using local content id");
            PinnedDocument {
                cid,
                url: None,
                local: true,
            }
        }
    }
}
