//! Model registry for the configured chat completion models

use super::openai::OpenAIService;
use super::{LlmService, LoggingService};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gpt-5.1";

/// Configuration for the LLM provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// `OpenAI`-compatible gateway base URL; the gateway handles auth
    pub gateway: Option<String>,
    /// Model that plays the customer
    pub model: Option<String>,
    /// Model for coaching hints; the customer model when unset
    pub coach_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            gateway: non_empty("LLM_GATEWAY"),
            model: non_empty("SIM_MODEL"),
            coach_model: non_empty("SIM_COACH_MODEL"),
        }
    }

    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn coach_model_id(&self) -> &str {
        self.coach_model.as_deref().unwrap_or_else(|| self.model_id())
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
    coach_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_id in [config.model_id(), config.coach_model_id()] {
            if services.contains_key(model_id) {
                continue;
            }
            if let Some(service) = Self::try_create_model(model_id, config) {
                services.insert(model_id.to_string(), service);
            }
        }

        Self {
            services,
            default_model: config.model_id().to_string(),
            coach_model: config.coach_model_id().to_string(),
        }
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_id: &str, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode the gateway handles the actual authentication
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            config.openai_api_key.clone()?
        };

        match OpenAIService::new(api_key, model_id, config.gateway.as_deref()) {
            Ok(service) => Some(Arc::new(LoggingService::new(Arc::new(service)))),
            Err(e) => {
                tracing::warn!(model = %model_id, error = %e, "Failed to create model service");
                None
            }
        }
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// The model that plays the customer
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// The model for coaching hints, falling back to the default model
    pub fn coach(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.coach_model).or_else(|| self.default())
    }

    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
