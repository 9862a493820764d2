//! API request and response types

use crate::profile::CustomerProfile;
use crate::session::{Difficulty, Session, SessionMeta, SimState, TrainingConfig, Turn};
use crate::state_machine::SimFlags;
use serde::{Deserialize, Serialize};

/// Request to run one turn
#[derive(Debug, Default, Deserialize)]
pub struct SimulateRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub pitch: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, rename = "customerType")]
    pub customer_type: Option<String>,
    #[serde(default)]
    pub objection: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl SimulateRequest {
    /// Training setup for a session created by this request
    pub fn training_config(&self) -> TrainingConfig {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        TrainingConfig {
            difficulty: Difficulty::from_label(self.difficulty.as_deref()),
            customer_type: non_empty(&self.customer_type)
                .unwrap_or_else(|| TrainingConfig::default().customer_type),
            forced_objection: non_empty(&self.objection),
            product: non_empty(&self.product),
        }
    }
}

/// Request body naming only a session
#[derive(Debug, Default, Deserialize)]
pub struct SessionRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
}

/// Response for the hint action
#[derive(Debug, Serialize)]
pub struct HintResponse {
    pub hint: String,
}

/// Response for the reset action
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub ok: bool,
    pub session_id: String,
}

/// Read-only view of a session
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    #[serde(rename = "customerProfile")]
    pub customer_profile: CustomerProfile,
    pub state: SimState,
    pub flags: SimFlags,
    #[serde(rename = "conversationHistory")]
    pub conversation_history: Vec<Turn>,
    /// Rep line still waiting for a customer reply after a failed turn
    #[serde(rename = "pendingRepLine")]
    pub pending_rep_line: Option<Turn>,
    #[serde(rename = "_meta")]
    pub meta: SessionMeta,
}

impl From<Session> for SessionSnapshot {
    fn from(session: Session) -> Self {
        Self {
            pending_rep_line: session.pending_rep_line().cloned(),
            conversation_history: session.history().to_vec(),
            session_id: session.session_id,
            customer_profile: session.customer_profile,
            state: session.state,
            flags: session.flags,
            meta: session.meta,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
