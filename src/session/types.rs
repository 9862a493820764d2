//! Session data model

use super::patch::{FlagsPatch, StatePatch};
use crate::affect::AffectState;
use crate::profile::CustomerProfile;
use crate::state_machine::{SimFlags, SimStage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier used when a caller supplies none
pub const DEFAULT_SESSION_ID: &str = "default";

/// Normalize a caller-supplied session token. Blank or absent tokens map to
/// the shared [`DEFAULT_SESSION_ID`].
pub fn normalize_session_id(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_SESSION_ID.to_string(),
    }
}

// ============================================================================
// Training Config
// ============================================================================

/// How hard the simulated homeowner is to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Tough,
    Nightmare,
}

impl Difficulty {
    /// Absent means `normal`; anything unrecognized falls back to `nightmare`.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
            return Difficulty::Normal;
        };
        match label.to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "normal" => Difficulty::Normal,
            "tough" => Difficulty::Tough,
            _ => Difficulty::Nightmare,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Tough => "tough",
            Difficulty::Nightmare => "nightmare",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs fixed when the session is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingConfig {
    pub difficulty: Difficulty,
    pub customer_type: String,
    pub forced_objection: Option<String>,
    pub product: Option<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            customer_type: "mixed".to_string(),
            forced_objection: None,
            product: None,
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// Mutable per-session simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimState {
    pub sim_stage: SimStage,
    /// Completed customer turns
    pub turn_count: u32,
    #[serde(flatten)]
    pub affect: AffectState,
    pub last_objection: Option<String>,
    pub training_config: TrainingConfig,
}

impl SimState {
    pub fn new(training_config: TrainingConfig) -> Self {
        Self {
            sim_stage: SimStage::Intro,
            turn_count: 0,
            affect: AffectState::default(),
            last_objection: None,
            training_config,
        }
    }
}

// ============================================================================
// Conversation Log
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Rep,
    Customer,
}

impl Role {
    /// Speaker label used in rendered transcripts
    pub fn speaker(self) -> &'static str {
        match self {
            Role::Rep => "Rep",
            Role::Customer => "Customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Render turns as `Speaker: message` lines
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.speaker(), t.message))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The unit of isolation: everything one trainee's exercise knows.
///
/// The conversation log is private so it can only grow through
/// [`Session::push_turn`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub customer_profile: CustomerProfile,
    pub state: SimState,
    pub flags: SimFlags,
    conversation_history: Vec<Turn>,
    /// History index of a rep line whose customer reply never arrived
    pending_rep_line: Option<usize>,
    #[serde(rename = "_meta")]
    pub meta: SessionMeta,
}

impl Session {
    pub fn new(
        session_id: impl Into<String>,
        customer_profile: CustomerProfile,
        training_config: TrainingConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            customer_profile,
            state: SimState::new(training_config),
            flags: SimFlags::default(),
            conversation_history: Vec::new(),
            pending_rep_line: None,
            meta: SessionMeta {
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.conversation_history
    }

    /// Shallow-merge into `state`. Affect values are re-clamped on the way in.
    pub fn merge_state(&mut self, patch: StatePatch) {
        if let Some(stage) = patch.sim_stage {
            self.state.sim_stage = stage;
        }
        if let Some(affect) = patch.affect {
            self.state.affect = affect.clamped();
        }
        if let Some(last_objection) = patch.last_objection {
            self.state.last_objection = Some(last_objection);
        }
        self.touch();
    }

    /// Shallow-merge into `flags`. `objectionTurns` is never lowered.
    pub fn merge_flags(&mut self, patch: FlagsPatch) {
        let flags = &mut self.flags;
        if let Some(turns) = patch.objection_turns {
            if turns < flags.objection_turns {
                tracing::warn!(
                    session_id = %self.session_id,
                    current = flags.objection_turns,
                    proposed = turns,
                    "Ignoring attempt to lower objection turns"
                );
            } else {
                flags.objection_turns = turns;
            }
        }
        if let Some(v) = patch.asked_for_meter_check {
            flags.asked_for_meter_check = v;
        }
        if let Some(v) = patch.meter_permission_soft_yes {
            flags.meter_permission_soft_yes = v;
        }
        if let Some(v) = patch.at_meter {
            flags.at_meter = v;
        }
        if let Some(v) = patch.appointment_soft_yes {
            flags.appointment_soft_yes = v;
        }
        if let Some(v) = patch.appointment_time_proposed {
            flags.appointment_time_proposed = v;
        }
        if let Some(v) = patch.appointment_confirmed {
            flags.appointment_confirmed = v;
        }
        self.touch();
    }

    /// Append a turn and return its history index. Customer turns complete a
    /// turn and bump `turnCount`.
    pub fn push_turn(&mut self, role: Role, message: impl Into<String>) -> usize {
        self.conversation_history.push(Turn {
            role,
            message: message.into(),
            timestamp: Utc::now(),
        });
        if role == Role::Customer {
            self.state.turn_count += 1;
            self.pending_rep_line = None;
        }
        self.touch();
        self.conversation_history.len() - 1
    }

    /// Log a rep line, reusing a pending identical line left by a failed turn.
    /// Returns the line's history index.
    pub fn log_rep_line(&mut self, pitch: &str) -> usize {
        if let Some(index) = self.pending_rep_line.take() {
            let is_retry = self
                .conversation_history
                .get(index)
                .is_some_and(|t| t.role == Role::Rep && t.message == pitch);
            if is_retry {
                self.touch();
                return index;
            }
        }
        self.push_turn(Role::Rep, pitch)
    }

    /// Remember that the rep line at `index` still awaits a reply
    pub fn mark_pending(&mut self, index: usize) {
        self.pending_rep_line = Some(index);
    }

    pub fn pending_rep_line(&self) -> Option<&Turn> {
        self.pending_rep_line
            .and_then(|index| self.conversation_history.get(index))
    }

    /// Turns logged before `index`
    pub fn transcript_before(&self, index: usize) -> &[Turn] {
        let end = index.min(self.conversation_history.len());
        &self.conversation_history[..end]
    }

    fn touch(&mut self) {
        self.meta.updated_at = Utc::now();
    }
}
