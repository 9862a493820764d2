//! Generation service contract
//!
//! The orchestrator hands the service everything it knows about the session
//! and gets back a proposed customer turn. Nothing in the result is trusted;
//! see [`output`] for the structural checks and the orchestrator for the
//! coercion applied afterwards.

mod llm_backed;
pub mod output;
mod prompt;

pub use llm_backed::{LlmGenerationService, DEFAULT_TEMPERATURE};
pub use output::GenerationOutput;

use crate::llm::LlmError;
use crate::profile::CustomerProfile;
use crate::session::{SimState, Turn};
use crate::state_machine::SimFlags;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Snapshot of a session handed to the generation service
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub customer_profile: CustomerProfile,
    pub state: SimState,
    pub flags: SimFlags,
    /// Turns logged before the latest rep line
    pub transcript: Vec<Turn>,
    pub rep_line: String,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service failed: {0}")]
    Llm(#[from] LlmError),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed generation output: {0}")]
    Malformed(String),
    #[error("no generation model configured")]
    Unavailable,
}

/// Produces the simulated customer's next turn
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, ctx: &GenerationContext) -> Result<GenerationOutput, GenerationError>;
}

/// Stand-in used when no model is configured; every turn fails cleanly
pub struct UnavailableGenerationService;

#[async_trait]
impl GenerationService for UnavailableGenerationService {
    async fn generate(&self, _ctx: &GenerationContext) -> Result<GenerationOutput, GenerationError> {
        Err(GenerationError::Unavailable)
    }
}

#[cfg(test)]
pub(crate) fn testing_context(rep_line: &str) -> GenerationContext {
    use crate::session::TrainingConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    GenerationContext {
        customer_profile: crate::profile::generate(&mut StdRng::seed_from_u64(21)),
        state: SimState::new(TrainingConfig::default()),
        flags: SimFlags::default(),
        transcript: Vec::new(),
        rep_line: rep_line.to_string(),
    }
}
