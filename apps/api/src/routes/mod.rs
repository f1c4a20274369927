pub mod device;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::entitlements::handlers as session;
use crate::generation::handlers as generation;
use crate::payments::handlers as upgrade;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/services", get(generation::handle_list_services))
        .route(
            "/api/v1/session",
            get(session::handle_resume_session)
                .post(session::handle_login)
                .delete(session::handle_logout),
        )
        .route("/api/v1/generate", post(generation::handle_generate))
        .route("/api/v1/upgrade/checkout", post(upgrade::handle_checkout))
        .route(
            "/api/v1/upgrade/confirm",
            post(upgrade::handle_confirm_upgrade),
        )
        .with_state(state)
}
