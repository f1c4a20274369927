use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

/// Header carrying the client's device identifier. Session pointers are scoped per device,
/// the way browser local storage is.
pub const DEVICE_HEADER: &str = "x-device-id";
const MAX_DEVICE_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_device_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DEVICE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for DeviceId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(DEVICE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if !is_valid_device_id(id) {
            return Err(AppError::Validation(format!(
                "{DEVICE_HEADER} header must be 1-{MAX_DEVICE_ID_LEN} characters of [A-Za-z0-9_-]"
            )));
        }
        Ok(DeviceId(id.to_string()))
    }
}
