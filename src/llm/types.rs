//! Common types for LLM interactions

/// LLM request
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the provider to constrain output to a single JSON object
    pub json_output: bool,
    pub purpose: LlmPurpose,
}

/// Which side of the simulator a request serves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LlmPurpose {
    /// Playing the homeowner
    #[default]
    Customer,
    /// Coaching the rep
    Coach,
}

impl std::fmt::Display for LlmPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LlmPurpose::Customer => "customer",
            LlmPurpose::Coach => "coach",
        })
    }
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub text: String,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }
}

/// Message role. Every request is a single user turn under a system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
}

/// LLM response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    /// False when the provider cut the completion short (token limit)
    pub end_turn: bool,
    pub usage: Usage,
}

impl LlmResponse {
    /// Plain completed text response
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            end_turn: true,
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
