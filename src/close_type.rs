//! Close-type classification of the rep's latest line
//!
//! Detects whether the rep is trying to conclude the current objection cycle,
//! independent of what the generation service thinks of the line.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Kind of closing move, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseType {
    /// "On a scale of 1 to 10..."
    Scale,
    /// "Would you rather X or Y?"
    Binary,
    /// Concrete logistics: meter, bill, appointment, a time
    NextStep,
    /// Small ask: "can I...", "real quick"
    Permission,
    None,
}

impl CloseType {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseType::Scale => "scale",
            CloseType::Binary => "binary",
            CloseType::NextStep => "next_step",
            CloseType::Permission => "permission",
            CloseType::None => "none",
        }
    }

    pub fn is_close(self) -> bool {
        self != CloseType::None
    }
}

impl fmt::Display for CloseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Patterns run against the lowercased line.

static SCALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b1\s*(?:-|–|to)\s*10\b|\bout of 10\b|\brate\b").expect("valid scale pattern")
});

static EITHER_OR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bor\b").expect("valid either/or pattern"));

static CHOICE_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdo you want\b|\bwould you rather\b|\beither\b|\bwhich\b")
        .expect("valid choice pattern")
});

static NEXT_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bmeter\b|\bbill\b|\bappointment\b|\bschedule\b|\bwhat time\b|\btomorrow\b|\btoday\b")
        .expect("valid next-step pattern")
});

static PERMISSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcan i\b|\bcan we\b|\bmind if\b|\breal quick\b|\b30 seconds\b|\b15 seconds\b")
        .expect("valid permission pattern")
});

/// Classify a rep line. First match wins: scale > binary > next step >
/// permission.
pub fn classify(rep_line: &str) -> CloseType {
    let text = rep_line.to_lowercase();

    if SCALE.is_match(&text) {
        CloseType::Scale
    } else if EITHER_OR.is_match(&text) && CHOICE_VERB.is_match(&text) {
        CloseType::Binary
    } else if NEXT_STEP.is_match(&text) {
        CloseType::NextStep
    } else if PERMISSION.is_match(&text) {
        CloseType::Permission
    } else {
        CloseType::None
    }
}
