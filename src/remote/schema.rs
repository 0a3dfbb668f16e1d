//! Strict JSON Schema for `TriageResult`, sent as the structured-output
//! constraint. Bounds are taken from the same constants `validate()` uses.

use std::ops::RangeInclusive;

use serde_json::{json, Value};

use crate::models::{
    Likelihood, TriageLevel, GUIDANCE_ITEMS, POSSIBLE_CONDITIONS, RATIONALE_MIN,
    RED_FLAGS_TO_WATCH,
};

/// Schema name reported to the endpoint.
pub const SCHEMA_NAME: &str = "triage_result";

fn string_list(bounds: RangeInclusive<usize>) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "minItems": bounds.start(),
        "maxItems": bounds.end(),
    })
}

fn enum_values<T: Copy>(all: &[T], as_str: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(as_str).collect()
}

/// Build the schema. Every property is required and no extras are allowed.
pub fn triage_result_schema() -> Value {
    let condition = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "likelihood": {
                "type": "string",
                "enum": enum_values(Likelihood::ALL, Likelihood::as_str),
            },
            "why_it_fits": { "type": "string" },
        },
        "required": ["name", "likelihood", "why_it_fits"],
        "additionalProperties": false,
    });

    json!({
        "type": "object",
        "properties": {
            "triage_level": {
                "type": "string",
                "enum": enum_values(TriageLevel::ALL, TriageLevel::as_str),
            },
            "summary": { "type": "string" },
            "rationale": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": RATIONALE_MIN,
            },
            "possible_conditions": {
                "type": "array",
                "items": condition,
                "minItems": POSSIBLE_CONDITIONS.start(),
                "maxItems": POSSIBLE_CONDITIONS.end(),
            },
            "self_care": string_list(GUIDANCE_ITEMS),
            "pharmacy_advice": string_list(GUIDANCE_ITEMS),
            "see_doctor": string_list(GUIDANCE_ITEMS),
            "emergency_actions": string_list(GUIDANCE_ITEMS),
            "red_flags_to_watch": string_list(RED_FLAGS_TO_WATCH),
            "disclaimer": { "type": "string" },
        },
        "required": [
            "triage_level",
            "summary",
            "rationale",
            "possible_conditions",
            "self_care",
            "pharmacy_advice",
            "see_doctor",
            "emergency_actions",
            "red_flags_to_watch",
            "disclaimer",
        ],
        "additionalProperties": false,
    })
}
