//! Simulated homeowner profile
//!
//! A static record attached to a session once and never mutated. The
//! generator is a pure constructor over an injected random source.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: String,
    pub demographics: Demographics,
    pub financials: Financials,
    pub personality: Personality,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub income_band: String,
    pub home_type: String,
    pub household_size: u8,
    pub homeowner_age_bracket: String,
}

/// Monthly bill figures in whole dollars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    pub current_bill_estimate: u32,
    pub target_bill_max: u32,
    pub absolutely_cannot_exceed: u32,
    pub money_stress_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    pub risk_aversion: f64,
    pub trust_in_salespeople: f64,
    pub objection_persistence: f64,
    pub prefers_short_conversations: bool,
    pub values_outage_protection: bool,
    pub cares_about_environment: bool,
    pub hates_contracts: bool,
    pub primary_decision_driver: String,
    pub tone_profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub time_to_move_months: u32,
    pub communication_style: String,
}

const INCOME_BANDS: &[&str] = &["low", "lower-middle", "middle", "upper-middle", "high"];
const BILL_ESTIMATES: &[u32] = &[120, 150, 180, 210, 240, 280, 320];
const MOVE_HORIZONS: &[u32] = &[0, 6, 12, 18, 24, 36, 60];
const DECISION_DRIVERS: &[&str] = &[
    "money_savings",
    "avoiding_risk",
    "security_and_outage_protection",
    "long_term_stability",
    "skepticism",
    "speed_and_convenience",
];
const TONE_PROFILES: &[&str] = &[
    "friendly", "neutral", "guarded", "annoyed", "confused", "cautious",
];
const HOME_TYPES: &[&str] = &["single-family", "townhome", "duplex"];
const AGE_BRACKETS: &[&str] = &["25-35", "35-45", "45-55", "55-65", "65+"];
const COMMUNICATION_STYLES: &[&str] = &[
    "short_and_direct",
    "detailed_and_careful",
    "skeptical_and_slow",
    "friendly_and_chatty",
];

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[T]) -> T {
    // every option table above is non-empty
    *options.choose(rng).unwrap_or(&options[0])
}

/// Generate a random homeowner.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> CustomerProfile {
    let income_band = pick(rng, INCOME_BANDS);
    let current_bill_estimate = pick(rng, BILL_ESTIMATES);

    // Tighter budgets further down the income ladder
    let headroom = match income_band {
        "low" => pick(rng, &[20, 30, 40]),
        "lower-middle" => pick(rng, &[10, 20, 30]),
        _ => pick(rng, &[0, 10, 20]),
    };
    let target_bill_max = current_bill_estimate - headroom;
    let absolutely_cannot_exceed = target_bill_max + pick(rng, &[0, 10, 20, 25]);

    let money_stress_level = match income_band {
        "low" => rng.gen_range(0.7..0.95),
        "lower-middle" => rng.gen_range(0.5..0.85),
        _ => rng.gen_range(0.3..0.7),
    };

    CustomerProfile {
        id: format!("customer_{}", uuid::Uuid::new_v4().simple()),
        demographics: Demographics {
            income_band: income_band.to_string(),
            home_type: pick(rng, HOME_TYPES).to_string(),
            household_size: rng.gen_range(1..=5),
            homeowner_age_bracket: pick(rng, AGE_BRACKETS).to_string(),
        },
        financials: Financials {
            current_bill_estimate,
            target_bill_max,
            absolutely_cannot_exceed,
            money_stress_level,
        },
        personality: Personality {
            risk_aversion: rng.gen_range(0.4..0.95),
            trust_in_salespeople: rng.gen_range(0.2..0.8),
            objection_persistence: rng.gen_range(0.3..0.9),
            prefers_short_conversations: rng.gen_bool(0.35),
            values_outage_protection: rng.gen_bool(0.65),
            cares_about_environment: rng.gen_bool(0.45),
            hates_contracts: rng.gen_bool(0.55),
            primary_decision_driver: pick(rng, DECISION_DRIVERS).to_string(),
            tone_profile: pick(rng, TONE_PROFILES).to_string(),
        },
        preferences: Preferences {
            time_to_move_months: pick(rng, MOVE_HORIZONS),
            communication_style: pick(rng, COMMUNICATION_STYLES).to_string(),
        },
    }
}
