//! Property-based tests for the stage machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_stage() -> impl Strategy<Value = SimStage> {
    proptest::sample::select(SimStage::ALL.to_vec())
}

fn arb_intent() -> impl Strategy<Value = CustomerIntent> {
    proptest::sample::select(CustomerIntent::ALL.to_vec())
}

fn arb_flags() -> impl Strategy<Value = SimFlags> {
    (
        0u32..50,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(
                objection_turns,
                asked_for_meter_check,
                meter_permission_soft_yes,
                at_meter,
                appointment_soft_yes,
                appointment_time_proposed,
                appointment_confirmed,
            )| SimFlags {
                objection_turns,
                asked_for_meter_check,
                meter_permission_soft_yes,
                at_meter,
                appointment_soft_yes,
                appointment_time_proposed,
                appointment_confirmed,
            },
        )
}

// ============================================================================
// Flag Checkers
// ============================================================================

/// Boolean flags only ever flip from false to true
fn booleans_monotone(before: &SimFlags, after: &SimFlags) -> bool {
    let pairs = [
        (before.asked_for_meter_check, after.asked_for_meter_check),
        (before.meter_permission_soft_yes, after.meter_permission_soft_yes),
        (before.at_meter, after.at_meter),
        (before.appointment_soft_yes, after.appointment_soft_yes),
        (before.appointment_time_proposed, after.appointment_time_proposed),
        (before.appointment_confirmed, after.appointment_confirmed),
    ];
    pairs.iter().all(|(was, now)| !*was || *now)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: same inputs give the same stage and the same flag mutations
    #[test]
    fn prop_transition_is_deterministic(
        stage in arb_stage(),
        flags in arb_flags(),
        intent in arb_intent()
    ) {
        let first = transition(stage, &flags, intent);
        let second = transition(stage, &flags, intent);
        prop_assert_eq!(first, second);
    }

    // Invariant 2: the result is always a member of the closed stage set
    #[test]
    fn prop_transition_stays_in_stage_set(
        stage in arb_stage(),
        flags in arb_flags(),
        intent in arb_intent()
    ) {
        let result = transition(stage, &flags, intent);
        prop_assert!(SimStage::ALL.contains(&result.new_stage));
    }

    // Invariant 3: objectionTurns never decreases, and only grows inside the
    // loop on a non-exiting intent
    #[test]
    fn prop_objection_turns_only_grow_in_loop(
        stage in arb_stage(),
        flags in arb_flags(),
        intent in arb_intent()
    ) {
        let result = transition(stage, &flags, intent);
        let grows = stage == SimStage::ObjectionLoop && intent != CustomerIntent::SoftYesMeter;
        if grows {
            prop_assert_eq!(result.flags.objection_turns, flags.objection_turns + 1);
        } else {
            prop_assert_eq!(result.flags.objection_turns, flags.objection_turns);
        }
    }

    // Invariant 4: commitments are never withdrawn
    #[test]
    fn prop_boolean_flags_never_reset(
        stage in arb_stage(),
        flags in arb_flags(),
        intent in arb_intent()
    ) {
        let result = transition(stage, &flags, intent);
        prop_assert!(booleans_monotone(&flags, &result.flags));
    }

    // Invariant 5: APPT_CONFIRMED absorbs every sequence of intents
    #[test]
    fn prop_confirmed_is_absorbing(
        flags in arb_flags(),
        intents in proptest::collection::vec(arb_intent(), 1..20)
    ) {
        let mut stage = SimStage::ApptConfirmed;
        let mut flags = flags;
        for intent in intents {
            let result = transition(stage, &flags, intent);
            prop_assert_eq!(result.new_stage, SimStage::ApptConfirmed);
            prop_assert_eq!(&result.flags, &flags);
            stage = result.new_stage;
            flags = result.flags;
        }
    }

    // Invariant 6: no sequence ever leads back to INTRO
    #[test]
    fn prop_intro_never_reentered(intents in proptest::collection::vec(arb_intent(), 1..30)) {
        let mut stage = SimStage::Intro;
        let mut flags = SimFlags::default();
        for intent in intents {
            let result = transition(stage, &flags, intent);
            prop_assert_ne!(result.new_stage, SimStage::Intro);
            stage = result.new_stage;
            flags = result.flags;
        }
    }
}

#[test]
fn test_happy_path_reaches_confirmation() {
    let script = [
        CustomerIntent::ClarifyingQuestion,
        CustomerIntent::NewObjection,
        CustomerIntent::NewObjection,
        CustomerIntent::SoftYesMeter,
        CustomerIntent::ClarifyingQuestion,
        CustomerIntent::ClarifyingQuestion,
        CustomerIntent::SoftYesAppt,
        CustomerIntent::ClarifyingQuestion,
        CustomerIntent::TimeNegotiation,
        CustomerIntent::TimeConfirmed,
    ];

    let mut stage = SimStage::Intro;
    let mut flags = SimFlags::default();
    for intent in script {
        let result = transition(stage, &flags, intent);
        stage = result.new_stage;
        flags = result.flags;
    }

    assert_eq!(stage, SimStage::ApptConfirmed);
    assert_eq!(flags.objection_turns, 1);
    assert!(flags.meter_permission_soft_yes);
    assert!(flags.at_meter);
    assert!(flags.appointment_soft_yes);
    assert!(flags.appointment_time_proposed);
    assert!(flags.appointment_confirmed);
}
