use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{
    PaymentConfirmation, PaymentError, PaymentVerifier, PRO_PLAN_CURRENCY, PRO_PLAN_PRICE_KOBO,
};

const PAYSTACK_API_URL: &str = "https://api.paystack.co";

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: bool,
    message: String,
    data: Option<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct Transaction {
    pub status: String,
    pub reference: String,
    pub amount: u64,
    pub currency: String,
    pub customer: Customer,
}

#[derive(Debug, Deserialize)]
pub struct Customer {
    pub email: String,
}

/// Verifies transactions server-side against the Paystack API.
#[derive(Clone)]
pub struct PaystackVerifier {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl PaystackVerifier {
    pub fn new(secret_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            secret_key,
            base_url: PAYSTACK_API_URL.to_string(),
        })
    }
}

/// Checks a verified transaction against the pro plan and the paying account.
pub fn check_transaction(
    tx: &Transaction,
    email: &str,
) -> Result<PaymentConfirmation, PaymentError> {
    if tx.status != "success" {
        return Err(PaymentError::Rejected(format!(
            "transaction {} has status '{}'",
            tx.reference, tx.status
        )));
    }
    if tx.currency != PRO_PLAN_CURRENCY {
        return Err(PaymentError::Rejected(format!(
            "expected currency {PRO_PLAN_CURRENCY}, got {}",
            tx.currency
        )));
    }
    if tx.amount < PRO_PLAN_PRICE_KOBO {
        return Err(PaymentError::Rejected(format!(
            "amount {} is below the plan price {PRO_PLAN_PRICE_KOBO}",
            tx.amount
        )));
    }
    // Accounts are keyed by the exact email, so `A@x.com` and `a@x.com` are different payers.
    if tx.customer.email != email {
        return Err(PaymentError::Rejected(
            "transaction belongs to a different customer".to_string(),
        ));
    }

    Ok(PaymentConfirmation {
        reference: tx.reference.clone(),
        amount: tx.amount,
        currency: tx.currency.clone(),
        verified_by: "paystack",
    })
}

#[async_trait]
impl PaymentVerifier for PaystackVerifier {
    async fn verify(
        &self,
        reference: &str,
        email: &str,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{reference}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 || status.as_u16() == 400 {
            let body = response.text().await.unwrap_or_default();
            warn!("Paystack rejected reference {reference}: {body}");
            return Err(PaymentError::Rejected(format!("unknown reference {reference}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(format!("Paystack returned {status}: {body}")));
        }

        let body: VerifyResponse = response.json().await?;
        let tx = match body.data {
            Some(tx) if body.status => tx,
            _ => return Err(PaymentError::Rejected(body.message)),
        };

        let confirmation = check_transaction(&tx, email)?;
        info!(
            "Paystack confirmed {} {} for {email} (ref {})",
            confirmation.amount, confirmation.currency, confirmation.reference
        );
        Ok(confirmation)
    }

    fn name(&self) -> &'static str {
        "paystack"
    }
}
