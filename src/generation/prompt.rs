//! Prompt construction for the simulated homeowner

use super::GenerationContext;
use crate::session::render_transcript;
use crate::state_machine::CustomerIntent;
use std::fmt::Write;

/// System prompt: persona, live state, loop-breaking rule and output schema
pub fn system_prompt(ctx: &GenerationContext) -> String {
    let allowed = CustomerIntent::allowed_labels();
    let profile = &ctx.customer_profile;
    let state = &ctx.state;
    let flags = &ctx.flags;
    let config = &state.training_config;

    let mut prompt = String::from(
        "You are simulating a REAL HOMEOWNER for a professional sales training environment.\n\
         \n\
         CRITICAL:\n\
         - You are the HOMEOWNER. Do NOT explain AI logic.\n\
         - Be human, realistic, and concise.\n\
         - You MUST output ONLY valid JSON in the exact schema below.\n",
    );

    let _ = write!(
        prompt,
        "\nCUSTOMER PROFILE (summary):\n\
         - incomeBand: {}\n\
         - homeType: {}\n\
         - householdSize: {}\n\
         - currentBillEstimate: ${}\n\
         - targetBillMax: ${}\n\
         - absolutelyCannotExceed: ${}\n\
         - moneyStressLevel: {:.2}\n\
         - riskAversion: {:.2}\n\
         - trustInSalespeople: {:.2}\n\
         - objectionPersistence: {:.2}\n\
         - hatesContracts: {}\n\
         - valuesOutageProtection: {}\n\
         - primaryDecisionDriver: {}\n\
         - toneProfile: {}\n\
         - communicationStyle: {}\n",
        profile.demographics.income_band,
        profile.demographics.home_type,
        profile.demographics.household_size,
        profile.financials.current_bill_estimate,
        profile.financials.target_bill_max,
        profile.financials.absolutely_cannot_exceed,
        profile.financials.money_stress_level,
        profile.personality.risk_aversion,
        profile.personality.trust_in_salespeople,
        profile.personality.objection_persistence,
        profile.personality.hates_contracts,
        profile.personality.values_outage_protection,
        profile.personality.primary_decision_driver,
        profile.personality.tone_profile,
        profile.preferences.communication_style,
    );

    let affect = &state.affect;
    let _ = write!(
        prompt,
        "\nCURRENT SIM (server-side):\n\
         - simStage: {}\n\
         - turnCount: {}\n\
         - trust: {:.2}\n\
         - objectionResistance: {:.2}\n\
         - clarityLevel: {:.2}\n\
         - urgencyToDecide: {:.2}\n\
         - confusionLevel: {:.2}\n",
        state.sim_stage,
        state.turn_count,
        affect.trust,
        affect.objection_resistance,
        affect.clarity_level,
        affect.urgency_to_decide,
        affect.confusion_level,
    );
    if let Some(objection) = &state.last_objection {
        let _ = writeln!(prompt, "- lastObjection: {objection}");
    }

    let _ = write!(
        prompt,
        "\nFLAGS:\n\
         - objectionTurns: {}\n\
         - askedForMeterCheck: {}\n\
         - meterPermissionSoftYes: {}\n\
         - atMeter: {}\n\
         - appointmentSoftYes: {}\n\
         - appointmentTimeProposed: {}\n\
         - appointmentConfirmed: {}\n",
        flags.objection_turns,
        flags.asked_for_meter_check,
        flags.meter_permission_soft_yes,
        flags.at_meter,
        flags.appointment_soft_yes,
        flags.appointment_time_proposed,
        flags.appointment_confirmed,
    );

    if config.product.is_some() || config.forced_objection.is_some() {
        prompt.push_str("\nTRAINING SETUP:\n");
        if let Some(product) = &config.product {
            let _ = writeln!(prompt, "- The rep is offering: {product}");
        }
        if let Some(objection) = &config.forced_objection {
            let _ = writeln!(
                prompt,
                "- Your main concern, raised early and held firmly: {objection}"
            );
        }
    }
    let _ = writeln!(prompt, "- customerType: {}", config.customer_type);

    let _ = write!(
        prompt,
        "\nANTI-LOOP RULE (MANDATORY):\n\
         - If the same concern has already been discussed multiple turns and the rep presents a clear close \
         (binary choice, scale question, or next-step ask), you must STOP repeating the same objection.\n\
         - In that moment you MUST pick ONE realistic outcome: reluctant small yes, clear refusal, or deferral.\n\
         \n\
         INTENT LABEL (MANDATORY):\n\
         You must set \"customer_intent\" to exactly ONE of:\n\
         {allowed}\n\
         \n\
         OUTPUT JSON (no extra keys):\n\
         {{\n  \
           \"customer_reply\": \"string\",\n  \
           \"customer_intent\": \"{allowed}\",\n  \
           \"last_objection\": \"string (optional, your current main concern)\",\n  \
           \"proposed_state\": {{\n    \
             \"trust\": number,\n    \
             \"objectionResistance\": number,\n    \
             \"clarityLevel\": number,\n    \
             \"urgencyToDecide\": number,\n    \
             \"confusionLevel\": number\n  \
           }}\n\
         }}\n\
         All numbers are between 0 and 1."
    );

    prompt
}

/// User message: prior transcript plus the latest rep line
pub fn user_prompt(ctx: &GenerationContext) -> String {
    let transcript = if ctx.transcript.is_empty() {
        "(none yet)".to_string()
    } else {
        render_transcript(&ctx.transcript)
    };
    format!(
        "Conversation so far:\n{transcript}\n\nRep's latest line:\nRep: {}",
        ctx.rep_line
    )
}
