//! Turn orchestrator
//!
//! One pass per rep line: classify the close, log the line, ask the
//! generation service for the customer's turn, sanitize it, apply the
//! stall-breaker, advance the stage machine and log the reply.
//!
//! Each pass holds its session's lock from start to finish, so turns on the
//! same session apply in acceptance order. Nothing is shared across
//! sessions apart from the store's map and the random source, and neither
//! is held across the generation call.

#[cfg(test)]
pub mod testing;

use crate::affect::AffectState;
use crate::close_type::{self, CloseType};
use crate::coach::{Coach, CoachError};
use crate::generation::{GenerationContext, GenerationError, GenerationService};
use crate::session::{
    normalize_session_id, FlagsPatch, Role, Session, SessionStore, StatePatch, TrainingConfig,
    DEFAULT_SESSION_ID,
};
use crate::stall_breaker;
use crate::state_machine::{transition, CustomerIntent, SimFlags, SimStage};
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Pitch is required.")]
    EmptyPitch,
    #[error("A session id is required.")]
    MissingSessionId,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// One rep line and the training setup to use if the session is new
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    pub pitch: String,
    pub training_config: TrainingConfig,
}

/// What the caller sees after a completed turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub customer_intent: CustomerIntent,
    #[serde(rename = "simStage")]
    pub sim_stage: SimStage,
    pub flags: SimFlags,
    pub internal: AffectState,
    pub session_id: String,
    #[serde(rename = "turnCount")]
    pub turn_count: u32,
    /// Close type detected in the rep line
    #[serde(rename = "closeType")]
    pub close_type: CloseType,
    /// Whether the stall-breaker replaced the model's turn
    #[serde(rename = "forcedExit")]
    pub forced_exit: bool,
}

pub struct Orchestrator {
    store: Arc<SessionStore>,
    generator: Arc<dyn GenerationService>,
    coach: Coach,
    rng: Mutex<Box<dyn RngCore + Send>>,
    generation_timeout: Duration,
    require_session_id: bool,
}

impl Orchestrator {
    pub fn new(store: Arc<SessionStore>, generator: Arc<dyn GenerationService>, coach: Coach) -> Self {
        Self {
            store,
            generator,
            coach,
            rng: Mutex::new(Box::new(rand::rngs::StdRng::from_entropy())),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            require_session_id: false,
        }
    }

    /// Replace the random source behind the stall-breaker draw
    #[must_use]
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    #[must_use]
    pub fn with_generation_timeout(mut self, generation_timeout: Duration) -> Self {
        self.generation_timeout = generation_timeout;
        self
    }

    /// Reject requests without a session id instead of sharing the default
    #[must_use]
    pub fn with_required_session_id(mut self, required: bool) -> Self {
        self.require_session_id = required;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Normalize a caller-supplied session id.
    pub fn resolve_session_id(&self, raw: Option<&str>) -> Result<String, TurnError> {
        let session_id = normalize_session_id(raw);
        if session_id == DEFAULT_SESSION_ID && raw.is_none_or(|id| id.trim().is_empty()) {
            if self.require_session_id {
                return Err(TurnError::MissingSessionId);
            }
            tracing::warn!("Request without a session id is using the shared default session");
        }
        Ok(session_id)
    }

    /// Run one turn for `session_id`.
    pub async fn handle_turn(&self, session_id: &str, input: TurnInput) -> Result<TurnOutcome, TurnError> {
        let pitch = input.pitch.trim();
        if pitch.is_empty() {
            return Err(TurnError::EmptyPitch);
        }

        let (handle, _created) = self.store.get_or_create(session_id, &input.training_config);
        let mut session = handle.lock().await;

        let close_type = close_type::classify(pitch);
        let rep_index = session.log_rep_line(pitch);
        // Stays set if this future is dropped mid-generation; the reply clears it
        session.mark_pending(rep_index);

        let ctx = GenerationContext {
            customer_profile: session.customer_profile.clone(),
            state: session.state.clone(),
            flags: session.flags.clone(),
            transcript: session.transcript_before(rep_index).to_vec(),
            rep_line: pitch.to_string(),
        };

        let generated = match timeout(self.generation_timeout, self.generator.generate(&ctx)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.generation_timeout)),
        };
        let output = match generated {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    stage = %session.state.sim_stage,
                    error = %e,
                    "Turn abandoned; rep line left pending"
                );
                return Err(TurnError::Generation(e));
            }
        };

        let stage = session.state.sim_stage;
        let mut intent = CustomerIntent::coerce(output.customer_intent.as_deref());
        let mut reply = output.customer_reply;

        let forced = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            stall_breaker::apply(
                stage,
                &session.flags,
                close_type,
                session.state.training_config.difficulty,
                &mut **rng,
            )
        };
        if let Some(forced) = forced {
            tracing::info!(
                session_id = %session_id,
                difficulty = %session.state.training_config.difficulty,
                close_type = %close_type,
                model_intent = %intent,
                forced_intent = %forced.intent,
                "Stall-breaker forced exit from objection loop"
            );
            intent = forced.intent;
            reply = forced.reply.to_string();
        }

        session.merge_state(StatePatch {
            affect: output.proposed_state.as_ref().map(AffectState::from_proposed),
            last_objection: output.last_objection,
            ..Default::default()
        });

        let next = transition(stage, &session.flags, intent);
        if next.changed_stage(stage) {
            tracing::info!(
                session_id = %session_id,
                from = %stage,
                to = %next.new_stage,
                intent = %intent,
                "Stage transition"
            );
        }
        session.merge_state(StatePatch::stage(next.new_stage));
        session.merge_flags(FlagsPatch::from(&next.flags));

        session.push_turn(Role::Customer, reply.clone());

        Ok(outcome(&session, reply, intent, close_type, forced.is_some()))
    }

    /// Forget a session; the next turn starts a fresh exercise
    pub fn reset(&self, session_id: &str) -> bool {
        self.store.reset(session_id)
    }

    /// Coaching guidance for a session. Unknown sessions are coached from a
    /// blank start and are not created.
    pub async fn hint(&self, session_id: &str) -> Result<String, CoachError> {
        let (stage, flags, transcript) = match self.store.peek(session_id) {
            Some(handle) => {
                let session = handle.lock().await;
                (
                    session.state.sim_stage,
                    session.flags.clone(),
                    session.history().to_vec(),
                )
            }
            None => (SimStage::default(), SimFlags::default(), Vec::new()),
        };
        self.coach.hint(stage, &flags, &transcript).await
    }

    /// Read-only copy of a session, if it exists
    pub async fn snapshot(&self, session_id: &str) -> Option<Session> {
        let handle = self.store.peek(session_id)?;
        let session = handle.lock().await;
        Some(session.clone())
    }
}

fn outcome(
    session: &Session,
    reply: String,
    intent: CustomerIntent,
    close_type: CloseType,
    forced_exit: bool,
) -> TurnOutcome {
    TurnOutcome {
        reply,
        customer_intent: intent,
        sim_stage: session.state.sim_stage,
        flags: session.flags.clone(),
        internal: session.state.affect,
        session_id: session.session_id.clone(),
        turn_count: session.state.turn_count,
        close_type,
        forced_exit,
    }
}
