//! Per-session state: data model, typed patches and the in-memory store

mod patch;
mod store;
mod types;

pub use patch::{FlagsPatch, StatePatch};
pub use store::{
    ProfileFactory, SessionHandle, SessionStore, StoreLimits, DEFAULT_SESSION_CAPACITY,
    DEFAULT_SESSION_TTL,
};
pub use types::{
    normalize_session_id, render_transcript, Difficulty, Role, Session, SessionMeta, SimState,
    TrainingConfig, Turn, DEFAULT_SESSION_ID,
};
