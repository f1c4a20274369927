mod catalog;
mod config;
mod entitlements;
mod errors;
mod generation;
mod kv;
mod llm_client;
mod payments;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::entitlements::EntitlementStore;
use crate::kv::{KeyValueStore, MemoryKv, RedisKv};
use crate::llm_client::LlmClient;
use crate::payments::{PaymentVerifier, PaystackVerifier, TrustingVerifier};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Marine Career API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize account storage
    let kv = build_kv(&config).await?;
    info!("Account storage initialized (backend: {})", kv.backend());
    let entitlements = EntitlementStore::new(kv);

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize payment verification
    let payments = build_payment_verifier(&config)?;
    info!("Payment verifier initialized ({})", payments.name());
    if config.paystack_public_key.is_none() {
        warn!("PAYSTACK_PUBLIC_KEY not set; checkout is disabled");
    }

    // Build app state
    let state = AppState {
        entitlements,
        llm: Arc::new(llm),
        payments,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the deployed web origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when `REDIS_URL` is set; otherwise process memory. Either way the account table
/// lock is process-local, so run one API instance per backend.
async fn build_kv(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match &config.redis_url {
        Some(url) => Ok(Arc::new(RedisKv::connect(url).await?)),
        None => {
            warn!("REDIS_URL not set; accounts and sessions will not survive a restart");
            Ok(Arc::new(MemoryKv::new()))
        }
    }
}

/// Server-side Paystack verification when a secret key is configured.
fn build_payment_verifier(config: &Config) -> Result<Arc<dyn PaymentVerifier>> {
    match &config.paystack_secret_key {
        Some(secret) => Ok(Arc::new(PaystackVerifier::new(secret.clone())?)),
        None => {
            warn!(
                "PAYSTACK_SECRET_KEY not set; pro upgrades will be granted on client-reported \
                 payments without verification"
            );
            Ok(Arc::new(TrustingVerifier))
        }
    }
}
