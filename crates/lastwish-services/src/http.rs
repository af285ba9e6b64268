//! HTTP backend for the serverless endpoints
//!
//! One [`HttpBackend`] serves every collaborator trait; each call is a
//! small JSON exchange against `{base_url}/<endpoint>`.

use crate::discovery::{AssetDiscovery, DiscoveredAssets};
use crate::error::ServiceError;
use crate::names::NameResolver;
use crate::payment::{PaymentReceipt, PaymentVerifier};
use crate::pinning::{DocumentPinner, PinnedDocument};
use async_trait::async_trait;
use lastwish_core::ServiceConfig;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ASSETS: &str = "assets";
const ENS_RESOLVE: &str = "ens-resolve";
const PAYMENT_VERIFY: &str = "payment-verify";
const IPFS_PIN: &str = "ipfs-pin";

/// reqwest client bound to a base URL
#[derive(Debug, Clone)]
pub struct HttpBackend {
    inner: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build from service settings
    ///
    /// # Errors
    /// Returns [`ServiceError::InvalidInput`] for an empty base URL and
    /// [`ServiceError::Http`] if the client cannot be built
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ServiceError::blank("base_url"));
        }
        let inner = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { inner, base_url })
    }

    /// Base URL without trailing slash
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    async fn exchange<R: DeserializeOwned>(
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<R, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    tx_hash: &'a str,
}

#[derive(Debug, Serialize)]
struct PinRequest<'a> {
    json: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    cid: Option<String>,
    url: Option<String>,
}

impl PinResponse {
    fn into_pinned(self) -> Result<PinnedDocument, ServiceError> {
        match self.cid.filter(|c| !c.trim().is_empty()) {
            Some(cid) => Ok(PinnedDocument {
                cid,
                url: self.url,
                local: false,
            }),
            None => Err(ServiceError::Contract {
                endpoint: IPFS_PIN.to_string(),
                reason: "missing cid".to_string(),
            }),
        }
    }
}

#[async_trait]
impl AssetDiscovery for HttpBackend {
    async fn discover(&self, address: &str) -> Result<DiscoveredAssets, ServiceError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ServiceError::blank("address"));
        }
        let request = self.inner.get(self.url(ASSETS)).query(&[("address", address)]);
        let assets: DiscoveredAssets = Self::exchange(ASSETS, request).await?;
        tracing::debug!(
            address,
            tokens = assets.tokens.len(),
            nfts = assets.nfts.len(),
            "assets discovered"
        );
        Ok(assets)
    }
}

#[async_trait]
impl NameResolver for HttpBackend {
    async fn resolve(&self, name: &str) -> Result<Option<String>, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::blank("name"));
        }
        let request = self.inner.get(self.url(ENS_RESOLVE)).query(&[("name", name)]);
        let body: ResolveResponse = Self::exchange(ENS_RESOLVE, request).await?;
        Ok(body.address.filter(|a| !a.trim().is_empty()))
    }
}

#[async_trait]
impl PaymentVerifier for HttpBackend {
    async fn verify(&self, tx_hash: &str) -> Result<PaymentReceipt, ServiceError> {
        let tx_hash = tx_hash.trim();
        if tx_hash.is_empty() {
            return Err(ServiceError::blank("tx_hash"));
        }
        let request = self
            .inner
            .post(self.url(PAYMENT_VERIFY))
            .json(&VerifyRequest { tx_hash });
        let receipt: PaymentReceipt = Self::exchange(PAYMENT_VERIFY, request).await?;
        tracing::info!(tx_hash, confirmed = receipt.confirmed, "payment verified");
        Ok(receipt)
    }
}

#[async_trait]
impl DocumentPinner for HttpBackend {
    async fn pin(&self, document: &serde_json::Value) -> Result<PinnedDocument, ServiceError> {
        if document.is_null() {
            return Err(ServiceError::blank("document"));
        }
        let request = self
            .inner
            .post(self.url(IPFS_PIN))
            .json(&PinRequest { json: document });
        let body: PinResponse = Self::exchange(IPFS_PIN, request).await?;
        body.into_pinned()
    }
}
