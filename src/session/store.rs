//! In-memory session store
//!
//! Sessions are keyed by an opaque id. The map itself is guarded by a
//! short-lived std mutex that is never held across an await; each session
//! sits behind its own async mutex so turns on one session serialize while
//! turns on different sessions never contend.
//!
//! Idle sessions expire after a TTL and the least recently updated ones are
//! dropped once the store grows past its capacity. Both sweeps run on store
//! access and skip sessions that a request is currently holding.

use super::patch::{FlagsPatch, StatePatch};
use super::types::{Role, Session, TrainingConfig};
use crate::profile::{self, CustomerProfile};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Shared handle to one session; lock it for the duration of a turn
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Produces the profile for a newly created session
pub type ProfileFactory = Arc<dyn Fn() -> CustomerProfile + Send + Sync>;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const DEFAULT_SESSION_CAPACITY: usize = 500;

/// Eviction bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_SESSION_TTL,
            capacity: DEFAULT_SESSION_CAPACITY,
        }
    }
}

struct SessionEntry {
    handle: SessionHandle,
    updated_at: DateTime<Utc>,
}

impl SessionEntry {
    /// A request outside the store still holds this session
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.handle) > 1
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    limits: StoreLimits,
    new_profile: ProfileFactory,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

impl SessionStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            limits: StoreLimits {
                ttl: limits.ttl,
                capacity: limits.capacity.max(1),
            },
            new_profile: Arc::new(|| profile::generate(&mut rand::thread_rng())),
        }
    }

    /// Replace the profile source used for new sessions
    #[must_use]
    pub fn with_profile_factory(mut self, factory: ProfileFactory) -> Self {
        self.new_profile = factory;
        self
    }

    /// Existing session, or a fresh one with the default training config.
    pub fn get(&self, session_id: &str) -> SessionHandle {
        self.get_or_create(session_id, &TrainingConfig::default()).0
    }

    /// Existing session, or a fresh one built from `config`. The flag is true
    /// when the session was created by this call.
    pub fn get_or_create(&self, session_id: &str, config: &TrainingConfig) -> (SessionHandle, bool) {
        self.get_or_create_at(session_id, config, Utc::now())
    }

    /// Existing session without creating or refreshing it
    pub fn peek(&self, session_id: &str) -> Option<SessionHandle> {
        self.lock_sessions()
            .get(session_id)
            .map(|entry| entry.handle.clone())
    }

    /// (Re)create a session from scratch: default flags, empty history.
    pub fn init(
        &self,
        session_id: &str,
        customer_profile: CustomerProfile,
        config: TrainingConfig,
    ) -> SessionHandle {
        let now = Utc::now();
        let handle = Arc::new(tokio::sync::Mutex::new(Session::new(
            session_id,
            customer_profile,
            config,
            now,
        )));

        let mut sessions = self.lock_sessions();
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                handle: handle.clone(),
                updated_at: now,
            },
        );
        self.evict(&mut sessions, now);
        handle
    }

    /// Shallow-merge into a session's state
    pub async fn merge_state(&self, session_id: &str, patch: StatePatch) {
        self.get(session_id).lock().await.merge_state(patch);
    }

    /// Shallow-merge into a session's flags
    pub async fn merge_flags(&self, session_id: &str, patch: FlagsPatch) {
        self.get(session_id).lock().await.merge_flags(patch);
    }

    /// Append to a session's conversation log
    pub async fn push_turn(&self, session_id: &str, role: Role, message: &str) -> usize {
        self.get(session_id).lock().await.push_turn(role, message)
    }

    /// Drop a session; the next access starts a fresh one. Returns whether a
    /// session existed.
    pub fn reset(&self, session_id: &str) -> bool {
        let removed = self.lock_sessions().remove(session_id).is_some();
        if removed {
            tracing::info!(session_id = %session_id, "Session reset");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_or_create_at(
        &self,
        session_id: &str,
        config: &TrainingConfig,
        now: DateTime<Utc>,
    ) -> (SessionHandle, bool) {
        let mut sessions = self.lock_sessions();
        self.expire_idle(&mut sessions, now);

        let (handle, created) = match sessions.get_mut(session_id) {
            Some(entry) => {
                entry.updated_at = now;
                (entry.handle.clone(), false)
            }
            None => {
                let session = Session::new(session_id, (self.new_profile)(), config.clone(), now);
                let handle = Arc::new(tokio::sync::Mutex::new(session));
                sessions.insert(
                    session_id.to_string(),
                    SessionEntry {
                        handle: handle.clone(),
                        updated_at: now,
                    },
                );
                tracing::info!(
                    session_id = %session_id,
                    difficulty = %config.difficulty,
                    "Session created"
                );
                (handle, true)
            }
        };

        // A session mid-turn gets its timestamp from its own mutations
        if let Ok(mut session) = handle.try_lock() {
            session.meta.updated_at = now;
        }

        self.shrink_to_capacity(&mut sessions);
        (handle, created)
    }

    fn evict(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) -> usize {
        self.expire_idle(sessions, now) + self.shrink_to_capacity(sessions)
    }

    /// Drop sessions idle for longer than the TTL
    fn expire_idle(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) -> usize {
        let ttl = self.limits.ttl;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let idle = (now - entry.updated_at).to_std().unwrap_or(Duration::ZERO);
            entry.in_use() || idle <= ttl
        });

        let expired = before - sessions.len();
        if expired > 0 {
            tracing::info!(expired, remaining = sessions.len(), "Expired idle sessions");
        }
        expired
    }

    /// Drop least recently updated sessions until back under capacity
    fn shrink_to_capacity(&self, sessions: &mut HashMap<String, SessionEntry>) -> usize {
        let capacity = self.limits.capacity;
        if sessions.len() <= capacity {
            return 0;
        }

        let mut candidates: Vec<(DateTime<Utc>, String)> = sessions
            .iter()
            .filter(|(_, entry)| !entry.in_use())
            .map(|(id, entry)| (entry.updated_at, id.clone()))
            .collect();
        candidates.sort();

        let overflow = sessions.len() - capacity;
        let mut evicted = 0;
        for (_, id) in candidates.into_iter().take(overflow) {
            sessions.remove(&id);
            evicted += 1;
        }

        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted sessions over capacity");
        }
        if sessions.len() > capacity {
            tracing::warn!(
                sessions = sessions.len(),
                capacity,
                "Session store over capacity with every remaining session in use"
            );
        }
        evicted
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
