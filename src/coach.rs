//! Coaching hints for the rep
//!
//! A stateless side query: reads the stage, flags and transcript of a session
//! and asks a model for short guidance. Nothing here touches session state.

use crate::llm::{LlmError, LlmMessage, LlmPurpose, LlmRequest, LlmService};
use crate::session::{render_transcript, Turn};
use crate::state_machine::{SimFlags, SimStage};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

const COACH_SYSTEM_PROMPT: &str = "You are a direct, practical sales coach.";
pub const COACH_TEMPERATURE: f32 = 0.4;
const MAX_HINT_TOKENS: u32 = 300;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("coaching model failed: {0}")]
    Generation(#[from] LlmError),
    #[error("coaching timed out after {0:?}")]
    Timeout(Duration),
    #[error("no coaching model configured")]
    Unavailable,
}

pub struct Coach {
    llm: Option<Arc<dyn LlmService>>,
    timeout: Duration,
}

impl Coach {
    pub fn new(llm: Option<Arc<dyn LlmService>>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Free-text guidance for the rep's next line
    pub async fn hint(
        &self,
        stage: SimStage,
        flags: &SimFlags,
        transcript: &[Turn],
    ) -> Result<String, CoachError> {
        let llm = self.llm.as_ref().ok_or(CoachError::Unavailable)?;

        let request = LlmRequest {
            system: Some(COACH_SYSTEM_PROMPT.to_string()),
            messages: vec![LlmMessage::user(hint_prompt(stage, flags, transcript))],
            max_tokens: Some(MAX_HINT_TOKENS),
            temperature: Some(COACH_TEMPERATURE),
            json_output: false,
            purpose: LlmPurpose::Coach,
        };

        match timeout(self.timeout, llm.complete(&request)).await {
            Ok(Ok(response)) => Ok(response.text.trim().to_string()),
            Ok(Err(e)) => {
                tracing::warn!(error = %e.message, "Hint generation failed");
                Err(CoachError::Generation(e))
            }
            Err(_) => {
                tracing::warn!(timeout_ms = %self.timeout.as_millis(), "Hint generation timed out");
                Err(CoachError::Timeout(self.timeout))
            }
        }
    }
}

fn hint_prompt(stage: SimStage, flags: &SimFlags, transcript: &[Turn]) -> String {
    let flags_json = serde_json::to_string_pretty(flags).unwrap_or_else(|_| "{}".to_string());
    let transcript = if transcript.is_empty() {
        "(none)".to_string()
    } else {
        render_transcript(transcript)
    };

    format!(
        "You are a sales coach for a door-to-door rep.\n\n\
         Current simStage: {stage}\n\
         Flags: {flags_json}\n\n\
         Transcript so far (most recent at the bottom):\n\
         {transcript}\n\n\
         Give the rep:\n\
         1) A short coaching focus for this stage (1-2 sentences).\n\
         2) A suggested structure for the next sentence or two (not a full script).\n\
         Keep it under 120 words total."
    )
}
