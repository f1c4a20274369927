//! Axum route handlers for the session lifecycle.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::entitlements::{Account, EntitlementStore};
use crate::errors::AppError;
use crate::routes::device::DeviceId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub account: Option<Account>,
}

/// GET /api/v1/session
///
/// Restores the device's session; `account` is null when signed out.
pub async fn handle_resume_session(
    State(state): State<AppState>,
    device: DeviceId,
) -> Result<Json<SessionResponse>, AppError> {
    let account = state
        .entitlements
        .for_device(device.as_str())
        .resume_session()
        .await?;
    Ok(Json(SessionResponse { account }))
}

/// POST /api/v1/session
///
/// Signs in (creating the account on first use). The email is trimmed here.
pub async fn handle_login(
    State(state): State<AppState>,
    device: DeviceId,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }

    let account = state
        .entitlements
        .for_device(device.as_str())
        .login_or_create(email)
        .await?;
    Ok(Json(SessionResponse {
        account: Some(account),
    }))
}

/// DELETE /api/v1/session
pub async fn handle_logout(
    State(state): State<AppState>,
    device: DeviceId,
) -> Result<StatusCode, AppError> {
    state
        .entitlements
        .for_device(device.as_str())
        .logout()
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolves the device's signed-in account or fails with `Unauthorized`.
pub async fn require_signed_in(store: &EntitlementStore) -> Result<Account, AppError> {
    store.resume_session().await?.ok_or(AppError::Unauthorized)
}
