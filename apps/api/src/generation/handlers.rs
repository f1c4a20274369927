//! Axum route handlers for the service catalog and generation.

use axum::{extract::State, Json};

use crate::catalog::{Service, SERVICES};
use crate::errors::AppError;
use crate::generation::generator::{generate, GenerateRequest, GenerateResponse};
use crate::routes::device::DeviceId;
use crate::state::AppState;

/// GET /api/v1/services
pub async fn handle_list_services() -> Json<&'static [Service]> {
    Json(SERVICES)
}

/// POST /api/v1/generate
///
/// Renders the chosen service's prompt, calls the LLM and charges one free generation.
/// Free accounts with no generations left get 402 before any LLM call.
pub async fn handle_generate(
    State(state): State<AppState>,
    device: DeviceId,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let store = state.entitlements.for_device(device.as_str());
    let response = generate(&store, state.llm.as_ref(), request).await?;
    Ok(Json(response))
}
