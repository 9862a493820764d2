//! Structural validation of raw generation output
//!
//! Only the shape is checked here: a JSON object carrying a string
//! `customer_reply`. The intent label and proposed state stay raw so the
//! orchestrator can apply its own coercion rules to them.

use super::GenerationError;
use serde_json::{Map, Value};

/// One validated customer turn as proposed by the generation service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutput {
    pub customer_reply: String,
    /// Unvalidated intent label
    pub customer_intent: Option<String>,
    /// Unvalidated proposed affect object
    pub proposed_state: Option<Value>,
    pub last_objection: Option<String>,
}

impl GenerationOutput {
    pub fn reply(customer_reply: impl Into<String>, customer_intent: impl Into<String>) -> Self {
        Self {
            customer_reply: customer_reply.into(),
            customer_intent: Some(customer_intent.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_proposed_state(mut self, proposed: Value) -> Self {
        self.proposed_state = Some(proposed);
        self
    }

    #[must_use]
    pub fn with_last_objection(mut self, objection: impl Into<String>) -> Self {
        self.last_objection = Some(objection.into());
        self
    }

    /// Parse raw model text.
    ///
    /// The proposed state is read from `proposed_state`, falling back to the
    /// nested `internal_reasoning.updated_state` shape.
    pub fn parse(raw: &str) -> Result<Self, GenerationError> {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Err(GenerationError::Malformed("empty response".to_string()));
        }

        let value: Value = serde_json::from_str(body)
            .map_err(|e| GenerationError::Malformed(format!("not valid JSON: {e}")))?;
        let Value::Object(fields) = value else {
            return Err(GenerationError::Malformed(
                "response is not a JSON object".to_string(),
            ));
        };

        let customer_reply = match fields.get("customer_reply") {
            Some(Value::String(reply)) => reply.clone(),
            Some(_) => {
                return Err(GenerationError::Malformed(
                    "customer_reply is not a string".to_string(),
                ))
            }
            None => {
                return Err(GenerationError::Malformed(
                    "missing customer_reply".to_string(),
                ))
            }
        };

        let customer_intent = fields
            .get("customer_intent")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            customer_reply,
            customer_intent,
            proposed_state: proposed_state(&fields),
            last_objection: fields
                .get("last_objection")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

fn proposed_state(fields: &Map<String, Value>) -> Option<Value> {
    fields
        .get("proposed_state")
        .or_else(|| fields.get("internal_reasoning")?.get("updated_state"))
        .filter(|v| v.is_object())
        .cloned()
}

/// Trim whitespace and one surrounding Markdown code fence, if any
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
