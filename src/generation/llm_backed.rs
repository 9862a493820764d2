//! Generation service backed by a chat completion model

use super::output::GenerationOutput;
use super::prompt::{system_prompt, user_prompt};
use super::{GenerationContext, GenerationError, GenerationService};
use crate::llm::{LlmMessage, LlmPurpose, LlmRequest, LlmService};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
const MAX_REPLY_TOKENS: u32 = 800;

pub struct LlmGenerationService {
    llm: Arc<dyn LlmService>,
    temperature: f32,
}

impl LlmGenerationService {
    pub fn new(llm: Arc<dyn LlmService>, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    fn build_request(&self, ctx: &GenerationContext) -> LlmRequest {
        LlmRequest {
            system: Some(system_prompt(ctx)),
            messages: vec![LlmMessage::user(user_prompt(ctx))],
            max_tokens: Some(MAX_REPLY_TOKENS),
            temperature: Some(self.temperature),
            json_output: true,
            purpose: LlmPurpose::Customer,
        }
    }
}

#[async_trait]
impl GenerationService for LlmGenerationService {
    async fn generate(&self, ctx: &GenerationContext) -> Result<GenerationOutput, GenerationError> {
        let response = self.llm.complete(&self.build_request(ctx)).await?;

        GenerationOutput::parse(&response.text).inspect_err(|e| {
            tracing::warn!(
                model = %self.llm.model_id(),
                error = %e,
                truncated = !response.end_turn,
                raw = %response.text,
                "Failed to parse customer reply"
            );
        })
    }
}
