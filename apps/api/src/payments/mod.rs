//! Pro-plan payments — checkout parameters for the client-side Paystack widget and
//! pluggable confirmation of completed transactions.
//!
//! `AppState` holds an `Arc<dyn PaymentVerifier>`:
//! - `PaystackVerifier` when `PAYSTACK_SECRET_KEY` is configured (server-side verification)
//! - `TrustingVerifier` otherwise, which accepts any reference the client reports

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub mod handlers;
pub mod paystack;

pub use paystack::PaystackVerifier;

/// Pro plan price in kobo (5000 NGN).
pub const PRO_PLAN_PRICE_KOBO: u64 = 500_000;
pub const PRO_PLAN_CURRENCY: &str = "NGN";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment rejected: {0}")]
    Rejected(String),

    #[error("Payments are not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),
}

/// A transaction the verifier accepted as paying for the pro plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentConfirmation {
    pub reference: String,
    pub amount: u64,
    pub currency: String,
    /// "paystack" | "trusted-client"
    pub verified_by: &'static str,
}

/// Parameters the client passes to the payment widget.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub reference: String,
    pub email: String,
    pub amount: u64,
    pub currency: &'static str,
    pub public_key: String,
}

impl CheckoutSession {
    pub fn new(email: &str, public_key: &str) -> Self {
        Self {
            reference: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            amount: PRO_PLAN_PRICE_KOBO,
            currency: PRO_PLAN_CURRENCY,
            public_key: public_key.to_string(),
        }
    }
}

/// Confirms that `reference` is a completed pro-plan payment made by `email`.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, reference: &str, email: &str)
        -> Result<PaymentConfirmation, PaymentError>;

    fn name(&self) -> &'static str;
}

/// Accepts every reference as paid. Grants pro on the client's word alone, so it is only
/// wired in when no Paystack secret key is configured.
pub struct TrustingVerifier;

#[async_trait]
impl PaymentVerifier for TrustingVerifier {
    async fn verify(
        &self,
        reference: &str,
        email: &str,
    ) -> Result<PaymentConfirmation, PaymentError> {
        warn!("Granting pro to {email} on unverified payment reference {reference}");
        Ok(PaymentConfirmation {
            reference: reference.to_string(),
            amount: PRO_PLAN_PRICE_KOBO,
            currency: PRO_PLAN_CURRENCY.to_string(),
            verified_by: "trusted-client",
        })
    }

    fn name(&self) -> &'static str {
        "trusted-client"
    }
}
