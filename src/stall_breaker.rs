//! Stall-breaker for saturated objection cycles
//!
//! Once the customer has objected twice and the rep makes a recognizable
//! closing move, the generation service no longer decides the outcome: a
//! difficulty-weighted draw forces either a reluctant soft yes or a
//! clarifying deferral. This bounds the objection loop no matter what the
//! model returns.

use crate::close_type::CloseType;
use crate::session::Difficulty;
use crate::state_machine::{CustomerIntent, SimFlags, SimStage};
use rand::Rng;

/// Objection turns already handled before a close can be forced
pub const SATURATION_TURNS: u32 = 2;

pub const SOFT_YES_METER_REPLY: &str =
    "Alright… if it's truly just a quick look and I'm not signing anything, we can check it real quick.";

pub const CLARIFYING_REPLY: &str =
    "Okay, before we go further, what exactly are you needing from me, and is there any cost or contract today?";

/// A forced customer turn replacing the generation service's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedOutcome {
    pub intent: CustomerIntent,
    pub reply: &'static str,
}

/// Whether this turn must be forced out of the objection loop.
pub fn should_force_exit(stage: SimStage, flags: &SimFlags, close_type: CloseType) -> bool {
    stage == SimStage::ObjectionLoop
        && close_type.is_close()
        && flags.objection_turns >= SATURATION_TURNS
}

/// Probability that a forced exit lands on `SOFT_YES_METER`
pub fn soft_yes_probability(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Normal => 0.8,
        Difficulty::Tough => 0.6,
        Difficulty::Nightmare => 0.25,
    }
}

/// Draw the forced intent. `rng` is injected so tests can pin either branch.
pub fn forced_intent<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> CustomerIntent {
    if difficulty == Difficulty::Easy {
        return CustomerIntent::SoftYesMeter;
    }

    let roll: f64 = rng.gen();
    if roll < soft_yes_probability(difficulty) {
        CustomerIntent::SoftYesMeter
    } else {
        CustomerIntent::ClarifyingQuestion
    }
}

/// Canned reply for a forced intent
pub fn canned_reply(intent: CustomerIntent) -> &'static str {
    match intent {
        CustomerIntent::SoftYesMeter => SOFT_YES_METER_REPLY,
        _ => CLARIFYING_REPLY,
    }
}

/// Evaluate the policy for one turn; `None` leaves the model's output alone.
pub fn apply<R: Rng + ?Sized>(
    stage: SimStage,
    flags: &SimFlags,
    close_type: CloseType,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<ForcedOutcome> {
    if !should_force_exit(stage, flags, close_type) {
        return None;
    }

    let intent = forced_intent(difficulty, rng);
    Some(ForcedOutcome {
        intent,
        reply: canned_reply(intent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Always rolls 0.0
    fn low_roll() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Always rolls just under 1.0
    fn high_roll() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn saturated() -> SimFlags {
        SimFlags {
            objection_turns: SATURATION_TURNS,
            ..Default::default()
        }
    }

    #[test]
    fn test_fires_only_when_saturated_in_loop_with_close() {
        assert!(should_force_exit(
            SimStage::ObjectionLoop,
            &saturated(),
            CloseType::Binary
        ));

        let fresh = SimFlags {
            objection_turns: 1,
            ..Default::default()
        };
        assert!(!should_force_exit(SimStage::ObjectionLoop, &fresh, CloseType::Binary));
        assert!(!should_force_exit(
            SimStage::ObjectionLoop,
            &saturated(),
            CloseType::None
        ));
        assert!(!should_force_exit(
            SimStage::ExplainProgram,
            &saturated(),
            CloseType::Scale
        ));
    }

    #[test]
    fn test_easy_always_soft_yes() {
        assert_eq!(
            forced_intent(Difficulty::Easy, &mut high_roll()),
            CustomerIntent::SoftYesMeter
        );
    }

    #[test]
    fn test_weighted_difficulties_take_both_branches() {
        for difficulty in [Difficulty::Normal, Difficulty::Tough, Difficulty::Nightmare] {
            assert_eq!(
                forced_intent(difficulty, &mut low_roll()),
                CustomerIntent::SoftYesMeter
            );
            assert_eq!(
                forced_intent(difficulty, &mut high_roll()),
                CustomerIntent::ClarifyingQuestion
            );
        }
    }

    #[test]
    fn test_thresholds() {
        // A roll of exactly 0.5 sits above nightmare's weight and below tough's
        let mut half = StepRng::new(1 << 63, 0);
        assert_eq!(
            forced_intent(Difficulty::Nightmare, &mut half),
            CustomerIntent::ClarifyingQuestion
        );
        assert_eq!(
            forced_intent(Difficulty::Tough, &mut half),
            CustomerIntent::SoftYesMeter
        );
    }

    #[test]
    fn test_normal_rate_is_roughly_eighty_percent() {
        let mut rng = StdRng::seed_from_u64(7);
        let draws = 10_000;
        let soft_yes = (0..draws)
            .filter(|_| forced_intent(Difficulty::Normal, &mut rng) == CustomerIntent::SoftYesMeter)
            .count();
        let rate = soft_yes as f64 / f64::from(draws);
        assert!((0.77..0.83).contains(&rate), "rate was {rate}");
    }

    #[test]
    fn test_apply_pairs_intent_with_canned_reply() {
        let forced = apply(
            SimStage::ObjectionLoop,
            &saturated(),
            CloseType::NextStep,
            Difficulty::Tough,
            &mut high_roll(),
        )
        .unwrap();
        assert_eq!(forced.intent, CustomerIntent::ClarifyingQuestion);
        assert_eq!(forced.reply, CLARIFYING_REPLY);

        let forced = apply(
            SimStage::ObjectionLoop,
            &saturated(),
            CloseType::NextStep,
            Difficulty::Tough,
            &mut low_roll(),
        )
        .unwrap();
        assert_eq!(forced.intent, CustomerIntent::SoftYesMeter);
        assert_eq!(forced.reply, SOFT_YES_METER_REPLY);
    }

    #[test]
    fn test_apply_passes_through_when_not_saturated() {
        let forced = apply(
            SimStage::ObjectionLoop,
            &SimFlags::default(),
            CloseType::Scale,
            Difficulty::Easy,
            &mut low_roll(),
        );
        assert!(forced.is_none());
    }
}
