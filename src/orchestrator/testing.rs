//! Mock generation services for orchestrator tests

use crate::generation::{GenerationContext, GenerationError, GenerationOutput, GenerationService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Generator
// ============================================================================

/// Returns queued outputs in order and records every context it was given
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<GenerationOutput, GenerationError>>>,
    contexts: Mutex<Vec<GenerationContext>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_output(&self, output: GenerationOutput) {
        self.responses.lock().unwrap().push_back(Ok(output));
    }

    pub fn queue_error(&self, error: GenerationError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_contexts(&self) -> Vec<GenerationContext> {
        self.contexts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationService for MockGenerator {
    async fn generate(&self, ctx: &GenerationContext) -> Result<GenerationOutput, GenerationError> {
        self.contexts.lock().unwrap().push(ctx.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Malformed("no mock output queued".to_string())))
    }
}

// ============================================================================
// Gated Mock Generator
// ============================================================================

/// Holds calls whose rep line contains `gated_phrase` until released
pub struct GatedMockGenerator {
    pub inner: MockGenerator,
    gated_phrase: String,
    gate: Notify,
    pub started: AtomicUsize,
}

impl GatedMockGenerator {
    pub fn new(gated_phrase: impl Into<String>) -> Self {
        Self {
            inner: MockGenerator::new(),
            gated_phrase: gated_phrase.into(),
            gate: Notify::new(),
            started: AtomicUsize::new(0),
        }
    }

    /// Let one held call through
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Wait until at least `count` calls have started
    pub async fn wait_for_started(&self, count: usize) {
        while self.started.load(Ordering::SeqCst) < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl GenerationService for GatedMockGenerator {
    async fn generate(&self, ctx: &GenerationContext) -> Result<GenerationOutput, GenerationError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if ctx.rep_line.contains(&self.gated_phrase) {
            self.gate.notified().await;
        }
        self.inner.generate(ctx).await
    }
}
