//! LLM provider abstraction
//!
//! A single chat completion interface backs both the simulated customer and
//! the coaching side-channel.

mod error;
mod openai;
mod registry;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use registry::{LlmConfig, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logs every completion with the model, what the call was for, timing,
/// token usage and truncation. Failures carry the provider's error class and
/// any `Retry-After` hint.
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let started = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(response) if !response.end_turn => tracing::warn!(
                model = %self.model_id,
                purpose = %request.purpose,
                elapsed_ms = %elapsed_ms,
                output_tokens = response.usage.output_tokens,
                max_tokens = ?request.max_tokens,
                "Completion stopped before the model finished"
            ),
            Ok(response) => tracing::info!(
                model = %self.model_id,
                purpose = %request.purpose,
                elapsed_ms = %elapsed_ms,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Completion finished"
            ),
            Err(e) => tracing::error!(
                model = %self.model_id,
                purpose = %request.purpose,
                elapsed_ms = %elapsed_ms,
                kind = ?e.kind,
                retryable = e.kind.is_retryable(),
                retry_after_ms = ?e.retry_after.map(|d| d.as_millis()),
                error = %e.message,
                "Completion failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLlm(Result<LlmResponse, LlmError>);

    #[async_trait]
    impl LlmService for FixedLlm {
        async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.0.clone()
        }

        fn model_id(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_logging_service_passes_results_through() {
        let truncated = LlmResponse {
            end_turn: false,
            ..LlmResponse::text("{\"customer_reply\": \"Well")
        };
        let service = LoggingService::new(Arc::new(FixedLlm(Ok(truncated))));
        assert_eq!(service.model_id(), "fixed");
        let request = LlmRequest {
            purpose: LlmPurpose::Coach,
            ..Default::default()
        };
        let response = service.complete(&request).await.unwrap();
        assert!(!response.end_turn);

        let limited = LlmError::rate_limit("slow down").with_retry_after(std::time::Duration::from_secs(2));
        let service = LoggingService::new(Arc::new(FixedLlm(Err(limited))));
        let err = service.complete(&LlmRequest::default()).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::RateLimit);
        assert_eq!(err.retry_after, Some(std::time::Duration::from_secs(2)));
    }
}
