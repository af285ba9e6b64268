//! Payment quoting, verification, and the simulated processor

use crate::error::ServiceError;
use async_trait::async_trait;
use lastwish_core::{Payment, PaymentConfig};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Price for final generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentQuote {
    base_price_eth: f64,
    ens_discount: f64,
}

impl PaymentQuote {
    /// Quote from pricing settings
    #[inline]
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            base_price_eth: config.base_price_eth,
            ens_discount: config.ens_discount,
        }
    }

    /// Price in ETH, discounted for ENS holders
    #[must_use]
    pub fn quote(&self, has_ens: bool) -> f64 {
        if has_ens {
            self.base_price_eth * (1.0 - self.ens_discount)
        } else {
            self.base_price_eth
        }
    }
}

impl Default for PaymentQuote {
    fn default() -> Self {
        Self::new(&PaymentConfig::default())
    }
}

/// Verification result for one transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
}

impl PaymentReceipt {
    /// Session payment record for this receipt
    #[must_use]
    pub fn into_payment(self, tx_hash: impl Into<String>, amount: f64) -> Payment {
        Payment {
            transaction_hash: Some(tx_hash.into()),
            confirmed: Some(self.confirmed),
            amount: Some(amount),
        }
    }
}

/// Confirms a payment transaction on-chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, tx_hash: &str) -> Result<PaymentReceipt, ServiceError>;
}

/// Verify, degrading any failure to an unconfirmed receipt
pub async fn verify_or_unconfirmed<V>(verifier: &V, tx_hash: &str) -> PaymentReceipt
where
    V: PaymentVerifier + ?Sized,
{
    match verifier.verify(tx_hash).await {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::warn!(tx_hash, error = %e, "payment verification failed");
            PaymentReceipt::default()
        }
    }
}

/// Simulated payment flow for demos and tests
#[derive(Debug, Clone)]
pub struct MockPaymentProcessor {
    delay: Duration,
}

impl MockPaymentProcessor {
    /// Processor that answers after `delay`
    #[inline]
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Pretend to send `amount` ETH and return a fresh transaction hash
    ///
    /// # Errors
    /// Returns [`ServiceError::InvalidInput`] for a non-positive amount
    pub async fn pay(&self, amount: f64) -> Result<String, ServiceError> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(ServiceError::InvalidInput {
                field: "amount",
                reason: format!("{amount} is not a positive number"),
            });
        }
        tokio::time::sleep(self.delay).await;
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let tx_hash = format!("0x{}", hex::encode(bytes));
        tracing::info!(amount, %tx_hash, "simulated payment sent");
        Ok(tx_hash)
    }
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
