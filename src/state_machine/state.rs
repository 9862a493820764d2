//! Simulation stage and discrete flag types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Stage
// ============================================================================

/// Coarse phase of the simulated negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimStage {
    /// Rep delivers the opener
    #[default]
    Intro,
    ExplainProgram,
    /// Rep is handling pushback
    ObjectionLoop,
    MeterSoftClose,
    AtMeter,
    QualificationResult,
    ApptSoftClose,
    ApptScheduling,
    /// Appointment booked; the exercise is won
    ApptConfirmed,
}

impl SimStage {
    pub const ALL: [SimStage; 9] = [
        SimStage::Intro,
        SimStage::ExplainProgram,
        SimStage::ObjectionLoop,
        SimStage::MeterSoftClose,
        SimStage::AtMeter,
        SimStage::QualificationResult,
        SimStage::ApptSoftClose,
        SimStage::ApptScheduling,
        SimStage::ApptConfirmed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SimStage::Intro => "INTRO",
            SimStage::ExplainProgram => "EXPLAIN_PROGRAM",
            SimStage::ObjectionLoop => "OBJECTION_LOOP",
            SimStage::MeterSoftClose => "METER_SOFT_CLOSE",
            SimStage::AtMeter => "AT_METER",
            SimStage::QualificationResult => "QUALIFICATION_RESULT",
            SimStage::ApptSoftClose => "APPT_SOFT_CLOSE",
            SimStage::ApptScheduling => "APPT_SCHEDULING",
            SimStage::ApptConfirmed => "APPT_CONFIRMED",
        }
    }
}

impl fmt::Display for SimStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage label outside the closed set
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown simulation stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for SimStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

// ============================================================================
// Flags
// ============================================================================

/// Discrete micro-commitments tracked across stages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimFlags {
    /// Objection turns handled while in `OBJECTION_LOOP`; never decreases
    pub objection_turns: u32,
    pub asked_for_meter_check: bool,
    pub meter_permission_soft_yes: bool,
    pub at_meter: bool,
    pub appointment_soft_yes: bool,
    pub appointment_time_proposed: bool,
    pub appointment_confirmed: bool,
}
