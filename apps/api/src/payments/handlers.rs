//! Axum route handlers for the pro upgrade flow.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entitlements::handlers::require_signed_in;
use crate::entitlements::Account;
use crate::errors::AppError;
use crate::payments::{CheckoutSession, PaymentConfirmation, PaymentError};
use crate::routes::device::DeviceId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmUpgradeRequest {
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmUpgradeResponse {
    pub account: Account,
    pub payment: PaymentConfirmation,
}

/// POST /api/v1/upgrade/checkout
///
/// Returns the parameters for the payment widget, bound to the signed-in account.
pub async fn handle_checkout(
    State(state): State<AppState>,
    device: DeviceId,
) -> Result<Json<CheckoutSession>, AppError> {
    let store = state.entitlements.for_device(device.as_str());
    let account = require_signed_in(&store).await?;

    if account.is_pro {
        return Err(AppError::Validation("account is already pro".to_string()));
    }

    let public_key = state
        .config
        .paystack_public_key
        .as_deref()
        .ok_or(PaymentError::NotConfigured)?;

    let checkout = CheckoutSession::new(&account.email, public_key);
    store
        .record_checkout(&checkout.reference, &account.email)
        .await?;
    info!(
        "Checkout {} opened for {}",
        checkout.reference, account.email
    );
    Ok(Json(checkout))
}

/// POST /api/v1/upgrade/confirm
///
/// Verifies the reported payment and only then grants pro status. The reference must be
/// one this server issued to the signed-in account through checkout.
pub async fn handle_confirm_upgrade(
    State(state): State<AppState>,
    device: DeviceId,
    Json(request): Json<ConfirmUpgradeRequest>,
) -> Result<Json<ConfirmUpgradeResponse>, AppError> {
    let reference = request.reference.trim();
    if reference.is_empty() {
        return Err(AppError::Validation("reference cannot be empty".to_string()));
    }

    let store = state.entitlements.for_device(device.as_str());
    let account = require_signed_in(&store).await?;

    match store.checkout_email(reference).await? {
        Some(issued_to) if issued_to == account.email => {}
        _ => {
            warn!(
                "Rejected upgrade for {}: reference {reference} was not issued to them",
                account.email
            );
            return Err(AppError::PaymentRequired(
                "unknown checkout reference".to_string(),
            ));
        }
    }

    let payment = state.payments.verify(reference, &account.email).await?;
    let account = store.upgrade_to_pro(&account.email).await?;
    store.close_checkout(reference).await?;

    Ok(Json(ConfirmUpgradeResponse { account, payment }))
}
