use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::entitlements::EntitlementError;
use crate::llm_client::LlmError;
use crate::payments::PaymentError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Entitlement error: {0}")]
    Entitlement(#[from] EntitlementError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::Rejected(msg) => AppError::PaymentRequired(msg),
            PaymentError::NotConfigured => {
                AppError::PaymentProvider("payments are not configured".to_string())
            }
            other => AppError::PaymentProvider(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Sign in required".to_string(),
            ),
            AppError::PaymentRequired(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_REQUIRED", msg.clone())
            }
            AppError::Entitlement(EntitlementError::QuotaExhausted(_)) => (
                StatusCode::PAYMENT_REQUIRED,
                "PAYMENT_REQUIRED",
                "You've used all your free generations. Upgrade to Pro to continue.".to_string(),
            ),
            AppError::Entitlement(EntitlementError::InvalidEmail) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Email must not be empty".to_string(),
            ),
            AppError::Entitlement(EntitlementError::AccountNotFound(email)) => {
                tracing::error!("Account {email} missing for an active session");
                (
                    StatusCode::NOT_FOUND,
                    "ACCOUNT_NOT_FOUND",
                    format!("Account {email} not found"),
                )
            }
            AppError::Entitlement(EntitlementError::PersistenceUnavailable(msg)) => {
                tracing::error!("Persistence error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PERSISTENCE_UNAVAILABLE",
                    "Account storage is unavailable".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "Failed to generate content. Please try again.".to_string(),
                )
            }
            AppError::PaymentProvider(msg) => {
                tracing::error!("Payment provider error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PAYMENT_PROVIDER_ERROR",
                    "Could not confirm the payment".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
