//! Environment-driven configuration

use crate::generation::DEFAULT_TEMPERATURE;
use crate::llm::LlmConfig;
use crate::orchestrator::DEFAULT_GENERATION_TIMEOUT;
use crate::session::{StoreLimits, DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_TTL};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HINT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub port: u16,
    pub store: StoreLimits,
    pub generation_timeout: Duration,
    pub hint_timeout: Duration,
    pub require_session_id: bool,
    pub temperature: f32,
    pub llm: LlmConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store: StoreLimits::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            hint_timeout: DEFAULT_HINT_TIMEOUT,
            require_session_id: false,
            temperature: DEFAULT_TEMPERATURE,
            llm: LlmConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|name| std::env::var(name).ok());
        config.llm = LlmConfig::from_env();
        config
    }

    /// Build from an arbitrary variable source. Unparsable values keep their
    /// defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |name: &str, default: Duration| {
            parse_or(&lookup, name, default.as_secs()).map_or(default, Duration::from_secs)
        };

        Self {
            port: parse_or(&lookup, "SIM_PORT", defaults.port).unwrap_or(defaults.port),
            store: StoreLimits {
                ttl: secs("SIM_SESSION_TTL_SECS", DEFAULT_SESSION_TTL),
                capacity: parse_or(&lookup, "SIM_SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)
                    .filter(|&c| c > 0)
                    .unwrap_or(DEFAULT_SESSION_CAPACITY),
            },
            generation_timeout: secs("SIM_GENERATION_TIMEOUT_SECS", defaults.generation_timeout),
            hint_timeout: secs("SIM_HINT_TIMEOUT_SECS", defaults.hint_timeout),
            require_session_id: parse_or(&lookup, "SIM_REQUIRE_SESSION_ID", false)
                .unwrap_or(false),
            temperature: parse_or(&lookup, "SIM_TEMPERATURE", defaults.temperature)
                .filter(|t| (0.0..=2.0).contains(t))
                .unwrap_or(defaults.temperature),
            llm: defaults.llm,
        }
    }
}

/// Parse a variable, warning and returning `None` when it is set but bad
fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Option<T> {
    let Some(raw) = lookup(name) else {
        return Some(default);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(default);
    }
    if let Ok(value) = trimmed.parse::<T>() {
        Some(value)
    } else {
        tracing::warn!(variable = name, value = %raw, "Ignoring unparsable setting; using default");
        None
    }
}
