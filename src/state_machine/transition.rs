//! Pure stage transition function
//!
//! Given the same stage, flags and intent, `transition` always returns the
//! same stage and the same flag mutations, with no I/O.

use super::{CustomerIntent, SimFlags, SimStage};

/// Result of a stage transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_stage: SimStage,
    /// Flags after this transition's side effects
    pub flags: SimFlags,
}

impl TransitionResult {
    fn new(new_stage: SimStage, flags: SimFlags) -> Self {
        Self { new_stage, flags }
    }

    pub fn changed_stage(&self, from: SimStage) -> bool {
        self.new_stage != from
    }
}

/// Advance the negotiation by one customer turn.
pub fn transition(
    stage: SimStage,
    flags: &SimFlags,
    intent: CustomerIntent,
) -> TransitionResult {
    let mut flags = flags.clone();

    let new_stage = match (stage, intent) {
        (SimStage::Intro, _) => SimStage::ExplainProgram,

        (SimStage::ExplainProgram, CustomerIntent::NewObjection) => SimStage::ObjectionLoop,
        (SimStage::ExplainProgram, _) => SimStage::ExplainProgram,

        // A soft yes to the meter ends the objection cycle
        (SimStage::ObjectionLoop, CustomerIntent::SoftYesMeter) => {
            flags.meter_permission_soft_yes = true;
            flags.asked_for_meter_check = true;
            SimStage::MeterSoftClose
        }
        (SimStage::ObjectionLoop, _) => {
            flags.objection_turns = flags.objection_turns.saturating_add(1);
            SimStage::ObjectionLoop
        }

        (SimStage::MeterSoftClose, _) => SimStage::AtMeter,

        (SimStage::AtMeter, _) => {
            flags.at_meter = true;
            SimStage::QualificationResult
        }

        (SimStage::QualificationResult, CustomerIntent::SoftYesAppt) => {
            flags.appointment_soft_yes = true;
            SimStage::ApptSoftClose
        }
        (SimStage::QualificationResult, _) => SimStage::QualificationResult,

        (SimStage::ApptSoftClose, _) => SimStage::ApptScheduling,

        (SimStage::ApptScheduling, CustomerIntent::TimeConfirmed) => {
            flags.appointment_confirmed = true;
            SimStage::ApptConfirmed
        }
        (SimStage::ApptScheduling, CustomerIntent::TimeNegotiation) => {
            flags.appointment_time_proposed = true;
            SimStage::ApptScheduling
        }
        (SimStage::ApptScheduling, _) => SimStage::ApptScheduling,

        (SimStage::ApptConfirmed, _) => SimStage::ApptConfirmed,
    };

    TransitionResult::new(new_stage, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intro_always_moves_to_explain_program() {
        for intent in CustomerIntent::ALL {
            let result = transition(SimStage::Intro, &SimFlags::default(), intent);
            assert_eq!(result.new_stage, SimStage::ExplainProgram);
            assert_eq!(result.flags, SimFlags::default());
        }
    }

    #[test]
    fn test_explain_program_objection_enters_loop_without_counting() {
        let result = transition(
            SimStage::ExplainProgram,
            &SimFlags::default(),
            CustomerIntent::NewObjection,
        );
        assert_eq!(result.new_stage, SimStage::ObjectionLoop);
        assert_eq!(result.flags.objection_turns, 0);
    }

    #[test]
    fn test_explain_program_holds_on_other_intents() {
        let result = transition(
            SimStage::ExplainProgram,
            &SimFlags::default(),
            CustomerIntent::ClarifyingQuestion,
        );
        assert_eq!(result.new_stage, SimStage::ExplainProgram);
    }

    #[test]
    fn test_objection_loop_counts_non_exiting_turns() {
        let flags = SimFlags {
            objection_turns: 1,
            ..Default::default()
        };
        let result = transition(
            SimStage::ObjectionLoop,
            &flags,
            CustomerIntent::ClarifyingQuestion,
        );
        assert_eq!(result.new_stage, SimStage::ObjectionLoop);
        assert_eq!(result.flags.objection_turns, 2);
    }

    #[test]
    fn test_objection_loop_soft_yes_meter_exits() {
        let flags = SimFlags {
            objection_turns: 3,
            ..Default::default()
        };
        let result = transition(SimStage::ObjectionLoop, &flags, CustomerIntent::SoftYesMeter);
        assert_eq!(result.new_stage, SimStage::MeterSoftClose);
        assert!(result.flags.meter_permission_soft_yes);
        assert!(result.flags.asked_for_meter_check);
        assert_eq!(result.flags.objection_turns, 3);
    }

    #[test]
    fn test_meter_path_to_qualification() {
        let flags = SimFlags::default();
        let at_meter = transition(SimStage::MeterSoftClose, &flags, CustomerIntent::NewObjection);
        assert_eq!(at_meter.new_stage, SimStage::AtMeter);

        let qualified = transition(at_meter.new_stage, &at_meter.flags, CustomerIntent::NewObjection);
        assert_eq!(qualified.new_stage, SimStage::QualificationResult);
        assert!(qualified.flags.at_meter);
    }

    #[test]
    fn test_qualification_needs_soft_yes_appt() {
        let flags = SimFlags::default();
        let held = transition(
            SimStage::QualificationResult,
            &flags,
            CustomerIntent::TimeConfirmed,
        );
        assert_eq!(held.new_stage, SimStage::QualificationResult);
        assert!(!held.flags.appointment_soft_yes);

        let moved = transition(
            SimStage::QualificationResult,
            &flags,
            CustomerIntent::SoftYesAppt,
        );
        assert_eq!(moved.new_stage, SimStage::ApptSoftClose);
        assert!(moved.flags.appointment_soft_yes);

        let scheduling = transition(moved.new_stage, &moved.flags, CustomerIntent::NewObjection);
        assert_eq!(scheduling.new_stage, SimStage::ApptScheduling);
    }

    #[test]
    fn test_time_negotiation_stays_in_scheduling() {
        let result = transition(
            SimStage::ApptScheduling,
            &SimFlags::default(),
            CustomerIntent::TimeNegotiation,
        );
        assert_eq!(result.new_stage, SimStage::ApptScheduling);
        assert!(result.flags.appointment_time_proposed);
        assert!(!result.flags.appointment_confirmed);
    }

    #[test]
    fn test_time_confirmed_is_terminal() {
        let confirmed = transition(
            SimStage::ApptScheduling,
            &SimFlags::default(),
            CustomerIntent::TimeConfirmed,
        );
        assert_eq!(confirmed.new_stage, SimStage::ApptConfirmed);
        assert!(confirmed.flags.appointment_confirmed);

        for intent in CustomerIntent::ALL {
            let after = transition(confirmed.new_stage, &confirmed.flags, intent);
            assert_eq!(after.new_stage, SimStage::ApptConfirmed);
            assert_eq!(after.flags, confirmed.flags);
        }
    }

    #[test]
    fn test_input_flags_untouched() {
        let flags = SimFlags::default();
        let _ = transition(SimStage::ObjectionLoop, &flags, CustomerIntent::NewObjection);
        assert_eq!(flags.objection_turns, 0);
    }
}
