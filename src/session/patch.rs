//! Typed partial updates for session state and flags
//!
//! Every field is optional; `None` leaves the current value alone. Fields a
//! patch does not name cannot be written through it.

use crate::affect::AffectState;
use crate::state_machine::{SimFlags, SimStage};

/// Partial update for [`super::SimState`]. Turn count and training config
/// are not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub sim_stage: Option<SimStage>,
    pub affect: Option<AffectState>,
    pub last_objection: Option<String>,
}

impl StatePatch {
    pub fn stage(stage: SimStage) -> Self {
        Self {
            sim_stage: Some(stage),
            ..Default::default()
        }
    }
}

/// Partial update for [`SimFlags`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagsPatch {
    pub objection_turns: Option<u32>,
    pub asked_for_meter_check: Option<bool>,
    pub meter_permission_soft_yes: Option<bool>,
    pub at_meter: Option<bool>,
    pub appointment_soft_yes: Option<bool>,
    pub appointment_time_proposed: Option<bool>,
    pub appointment_confirmed: Option<bool>,
}

impl From<&SimFlags> for FlagsPatch {
    /// A patch that writes every flag
    fn from(flags: &SimFlags) -> Self {
        Self {
            objection_turns: Some(flags.objection_turns),
            asked_for_meter_check: Some(flags.asked_for_meter_check),
            meter_permission_soft_yes: Some(flags.meter_permission_soft_yes),
            at_meter: Some(flags.at_meter),
            appointment_soft_yes: Some(flags.appointment_soft_yes),
            appointment_time_proposed: Some(flags.appointment_time_proposed),
            appointment_confirmed: Some(flags.appointment_confirmed),
        }
    }
}
