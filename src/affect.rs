//! Continuous affect state and its clamp
//!
//! The generation service proposes new affect values every turn. None of them
//! is trusted: each is coerced to a number (0.5 when that fails) and clamped
//! into `[0.0, 1.0]` before it reaches session state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback for values that do not coerce to a number
pub const NEUTRAL: f64 = 0.5;

/// Five bounded scalars describing the simulated customer's disposition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectState {
    pub trust: f64,
    pub objection_resistance: f64,
    pub clarity_level: f64,
    pub urgency_to_decide: f64,
    pub confusion_level: f64,
}

impl Default for AffectState {
    /// Starting point for a fresh session
    fn default() -> Self {
        Self {
            trust: 0.25,
            objection_resistance: 0.0,
            clarity_level: 0.5,
            urgency_to_decide: 0.1,
            confusion_level: 0.3,
        }
    }
}

impl AffectState {
    /// Sanitize a proposed state object. Missing fields coerce like any other
    /// non-number.
    pub fn from_proposed(proposed: &Value) -> Self {
        let field = |name: &str| clamp_unit(proposed.get(name).unwrap_or(&Value::Null));
        Self {
            trust: field("trust"),
            objection_resistance: field("objectionResistance"),
            clarity_level: field("clarityLevel"),
            urgency_to_decide: field("urgencyToDecide"),
            confusion_level: field("confusionLevel"),
        }
    }

    pub fn values(&self) -> [f64; 5] {
        [
            self.trust,
            self.objection_resistance,
            self.clarity_level,
            self.urgency_to_decide,
            self.confusion_level,
        ]
    }

    /// Re-clamp every field; non-finite values fall back to [`NEUTRAL`]
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { NEUTRAL };
        Self {
            trust: clamp(self.trust),
            objection_resistance: clamp(self.objection_resistance),
            clarity_level: clamp(self.clarity_level),
            urgency_to_decide: clamp(self.urgency_to_decide),
            confusion_level: clamp(self.confusion_level),
        }
    }

    pub fn is_in_range(&self) -> bool {
        self.values().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

/// Coerce an untrusted JSON value to a number.
///
/// Numbers pass through, numeric strings are parsed, booleans count as 1/0.
/// Everything else, including non-finite results, is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    number.filter(|n| n.is_finite())
}

/// Coerce and clamp into `[0.0, 1.0]`, defaulting to [`NEUTRAL`].
pub fn clamp_unit(value: &Value) -> f64 {
    coerce_number(value).map_or(NEUTRAL, |n| n.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_clamp_examples() {
        assert!((clamp_unit(&json!(5)) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!("abc")) - 0.5).abs() < f64::EPSILON);
        assert!(clamp_unit(&json!(-2)).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!(0.42)) - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coercion_of_odd_shapes() {
        assert!((clamp_unit(&json!("0.7")) - 0.7).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!(" 3 ")) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!(true)) - 1.0).abs() < f64::EPSILON);
        assert!(clamp_unit(&json!(false)).abs() < f64::EPSILON);
        assert!((clamp_unit(&Value::Null) - NEUTRAL).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!([0.3])) - NEUTRAL).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!({"v": 0.3})) - NEUTRAL).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!("NaN")) - NEUTRAL).abs() < f64::EPSILON);
        assert!((clamp_unit(&json!("inf")) - NEUTRAL).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_proposed_fills_missing_fields() {
        let state = AffectState::from_proposed(&json!({
            "trust": 0.9,
            "objectionResistance": 12,
            "clarityLevel": "high",
        }));
        assert!((state.trust - 0.9).abs() < f64::EPSILON);
        assert!((state.objection_resistance - 1.0).abs() < f64::EPSILON);
        assert!((state.clarity_level - NEUTRAL).abs() < f64::EPSILON);
        assert!((state.urgency_to_decide - NEUTRAL).abs() < f64::EPSILON);
        assert!((state.confusion_level - NEUTRAL).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamped_repairs_out_of_range_fields() {
        let wild = AffectState {
            trust: 3.0,
            objection_resistance: -1.0,
            clarity_level: f64::NAN,
            urgency_to_decide: 0.2,
            confusion_level: f64::INFINITY,
        }
        .clamped();
        assert!(wild.is_in_range());
        assert!((wild.trust - 1.0).abs() < f64::EPSILON);
        assert!((wild.clarity_level - NEUTRAL).abs() < f64::EPSILON);
        assert!((wild.urgency_to_decide - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_is_in_range() {
        assert!(AffectState::default().is_in_range());
    }

    fn arb_json_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<f64>().prop_map(|f| serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)),
            any::<i64>().prop_map(|i| json!(i)),
            ".{0,12}".prop_map(Value::String),
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
        ]
    }

    proptest! {
        #[test]
        fn prop_clamp_always_in_unit_range(value in arb_json_scalar()) {
            let clamped = clamp_unit(&value);
            prop_assert!((0.0..=1.0).contains(&clamped), "{value} -> {clamped}");
        }

        #[test]
        fn prop_proposed_state_always_in_range(
            trust in arb_json_scalar(),
            resistance in arb_json_scalar(),
            confusion in arb_json_scalar()
        ) {
            let state = AffectState::from_proposed(&json!({
                "trust": trust,
                "objectionResistance": resistance,
                "confusionLevel": confusion,
            }));
            prop_assert!(state.is_in_range());
        }
    }
}
