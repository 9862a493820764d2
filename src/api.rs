//! HTTP API for the role-play simulator
//!
//! Thin axum layer over the orchestrator: request parsing, session id
//! resolution and error mapping.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::coach::Coach;
use crate::config::SimConfig;
use crate::generation::{GenerationService, LlmGenerationService, UnavailableGenerationService};
use crate::llm::ModelRegistry;
use crate::orchestrator::Orchestrator;
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: &SimConfig, llm_registry: &ModelRegistry) -> Self {
        let generator: Arc<dyn GenerationService> = match llm_registry.default() {
            Some(llm) => Arc::new(LlmGenerationService::new(llm, config.temperature)),
            None => Arc::new(UnavailableGenerationService),
        };
        let coach = Coach::new(llm_registry.coach(), config.hint_timeout);

        let orchestrator = Orchestrator::new(
            Arc::new(SessionStore::new(config.store)),
            generator,
            coach,
        )
        .with_generation_timeout(config.generation_timeout)
        .with_required_session_id(config.require_session_id);

        Self::from_orchestrator(Arc::new(orchestrator))
    }

    pub fn from_orchestrator(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}
