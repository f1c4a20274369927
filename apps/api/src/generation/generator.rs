//! Gated generation pipeline.
//!
//! Flow: resume session → paywall gate → render prompt → reserve one generation →
//!       LLM generate → return markdown + updated account.
//!
//! The reservation is taken under the store's table lock before the LLM call, so
//! concurrent requests cannot spend the same generation twice. A failed call is refunded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{find_service, render_prompt, ServiceId};
use crate::entitlements::handlers::require_signed_in;
use crate::entitlements::{Account, EntitlementError, EntitlementStore};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;

const PAYWALL_MESSAGE: &str = "You've used all your free generations. Upgrade to Pro to continue.";

/// Request body for a generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub service_id: ServiceId,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub service_id: ServiceId,
    pub title: &'static str,
    /// Generated text, formatted as Markdown.
    pub output: String,
    pub account: Account,
}

/// Runs one generation for the account signed in on `store`'s device.
pub async fn generate(
    store: &EntitlementStore,
    llm: &dyn TextGenerator,
    request: GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let account = require_signed_in(store).await?;

    if !account.can_generate() {
        return Err(AppError::PaymentRequired(PAYWALL_MESSAGE.to_string()));
    }

    let service = find_service(request.service_id)
        .ok_or_else(|| AppError::NotFound(format!("Service {:?} not found", request.service_id)))?;
    let prompt = render_prompt(service, &request.inputs)?;

    let account = match store.reserve_generation(&account.email).await {
        Ok(account) => account,
        Err(EntitlementError::QuotaExhausted(_)) => {
            return Err(AppError::PaymentRequired(PAYWALL_MESSAGE.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Generating {:?} for {} (pro={}, remaining={})",
        service.id, account.email, account.is_pro, account.generations_remaining
    );
    let output = match llm.generate(&prompt).await {
        Ok(output) => output,
        Err(e) => {
            if let Err(refund_err) = store.refund_generation(&account.email).await {
                warn!("Could not refund generation for {}: {refund_err}", account.email);
            }
            return Err(e.into());
        }
    };

    Ok(GenerateResponse {
        service_id: service.id,
        title: service.title,
        output,
        account,
    })
}
