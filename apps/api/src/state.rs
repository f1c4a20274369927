use std::sync::Arc;

use crate::config::Config;
use crate::entitlements::EntitlementStore;
use crate::llm_client::TextGenerator;
use crate::payments::PaymentVerifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Unscoped store; handlers call `for_device` to get the caller's session view.
    pub entitlements: EntitlementStore,
    /// LlmClient in production, a fake in tests.
    pub llm: Arc<dyn TextGenerator>,
    /// PaystackVerifier when a secret key is configured, TrustingVerifier otherwise.
    pub payments: Arc<dyn PaymentVerifier>,
    pub config: Config,
}
