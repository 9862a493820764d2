//! Customer intent labels consumed by the stage machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the simulated homeowner's latest reply amounts to.
///
/// Produced by the generation service, so every label arriving from outside
/// goes through [`CustomerIntent::coerce`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerIntent {
    NewObjection,
    ClarifyingQuestion,
    SoftYesMeter,
    SoftYesAppt,
    TimeNegotiation,
    TimeConfirmed,
}

impl CustomerIntent {
    pub const ALL: [CustomerIntent; 6] = [
        CustomerIntent::NewObjection,
        CustomerIntent::ClarifyingQuestion,
        CustomerIntent::SoftYesMeter,
        CustomerIntent::SoftYesAppt,
        CustomerIntent::TimeNegotiation,
        CustomerIntent::TimeConfirmed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerIntent::NewObjection => "NEW_OBJECTION",
            CustomerIntent::ClarifyingQuestion => "CLARIFYING_QUESTION",
            CustomerIntent::SoftYesMeter => "SOFT_YES_METER",
            CustomerIntent::SoftYesAppt => "SOFT_YES_APPT",
            CustomerIntent::TimeNegotiation => "TIME_NEGOTIATION",
            CustomerIntent::TimeConfirmed => "TIME_CONFIRMED",
        }
    }

    /// Exact label match
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intent| intent.as_str() == label)
    }

    /// Validate an untrusted label; anything unrecognized (or absent) becomes
    /// `NEW_OBJECTION`.
    pub fn coerce(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(raw) => Self::parse(raw).unwrap_or_else(|| {
                tracing::debug!(raw_intent = %raw, "Unrecognized customer intent, using NEW_OBJECTION");
                CustomerIntent::NewObjection
            }),
            None => CustomerIntent::NewObjection,
        }
    }

    /// Labels joined for the generation prompt
    pub fn allowed_labels() -> String {
        Self::ALL
            .iter()
            .map(|intent| intent.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl fmt::Display for CustomerIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
