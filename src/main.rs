//! Doorstep Sim - role-play sales training server
//!
//! Plays a simulated homeowner against a trainee rep, one session per
//! trainee, and keeps the negotiation on a fixed stage track.

mod affect;
mod api;
mod close_type;
mod coach;
mod config;
mod generation;
mod llm;
mod orchestrator;
mod profile;
mod session;
mod stall_breaker;
mod state_machine;

use api::{create_router, AppState};
use config::SimConfig;
use llm::ModelRegistry;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doorstep_sim=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = SimConfig::from_env();

    let llm_registry = ModelRegistry::new(&config.llm);
    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM configured. Set OPENAI_API_KEY or LLM_GATEWAY.");
    }

    tracing::info!(
        ttl_secs = config.store.ttl.as_secs(),
        capacity = config.store.capacity,
        generation_timeout_secs = config.generation_timeout.as_secs(),
        require_session_id = config.require_session_id,
        "Session store configured"
    );

    let state = AppState::new(&config, &llm_registry);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true).deflate(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Doorstep Sim listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
