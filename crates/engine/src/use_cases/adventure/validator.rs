//! Coercion of parsed LLM JSON into the adventure outcome contract.
//!
//! Only unparseable text is an error. Every missing or malformed field
//! falls back to a safe default, so callers always receive a complete
//! [`AdventureOutcome`].

use serde_json::{Map, Value};
use xiuxian_domain::{AdventureOutcome, EventColor, ReputationChoice, ReputationEvent};

/// Story used when the service sends none.
pub const UNEVENTFUL_STORY: &str =
    "You wander the wilds for a while, but the Dao is elusive and you return empty-handed.";

pub const DEFAULT_REPUTATION_TITLE: &str = "Mysterious Encounter";

pub const DEFAULT_REPUTATION_DESCRIPTION: &str =
    "You come upon a mysterious situation that demands a choice.";

/// Parse sanitized text and normalize it into an outcome.
pub fn validate_outcome(sanitized: &str) -> Result<AdventureOutcome, serde_json::Error> {
    let parsed: Value = serde_json::from_str(sanitized)?;
    Ok(normalize_outcome(&parsed))
}

/// Normalize an already-parsed value. A non-object is treated as `{}`.
pub fn normalize_outcome(parsed: &Value) -> AdventureOutcome {
    let empty = Map::new();
    let obj = parsed.as_object().unwrap_or(&empty);

    let event_color = obj
        .get("eventColor")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<EventColor>().ok())
        .unwrap_or_default();

    AdventureOutcome {
        story: optional_text(obj, "story").unwrap_or_else(|| UNEVENTFUL_STORY.to_string()),
        hp_change: required_int(obj, "hpChange"),
        exp_change: required_int(obj, "expChange"),
        spirit_stones_change: required_int(obj, "spiritStonesChange"),
        event_color,
        item_obtained: optional_value(obj, "itemObtained"),
        items_obtained: optional_value(obj, "itemsObtained"),
        pet_obtained: optional_text(obj, "petObtained"),
        pet_opportunity: optional_value(obj, "petOpportunity"),
        inheritance_level_change: optional_int(obj, "inheritanceLevelChange"),
        lottery_tickets_change: optional_int(obj, "lotteryTicketsChange"),
        trigger_secret_realm: obj
            .get("triggerSecretRealm")
            .filter(|v| is_truthy(v))
            .map(|_| true),
        attribute_reduction: optional_value(obj, "attributeReduction"),
        reputation_change: optional_int(obj, "reputationChange"),
        reputation_event: obj
            .get("reputationEvent")
            .filter(|v| is_truthy(v))
            .map(normalize_reputation_event),
    }
}

/// Clamp the health delta to half of the player's maximum health.
///
/// Returns true if the value was changed.
pub fn enforce_health_bound(outcome: &mut AdventureOutcome, max_hp: i64) -> bool {
    if max_hp <= 0 {
        return false;
    }
    let bound = max_hp / 2;
    let clamped = outcome.hp_change.clamp(-bound, bound);
    if clamped == outcome.hp_change {
        return false;
    }
    tracing::debug!(
        received = outcome.hp_change,
        clamped,
        max_hp,
        "Clamped health change to half of max health"
    );
    outcome.hp_change = clamped;
    true
}

fn normalize_reputation_event(value: &Value) -> ReputationEvent {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);
    let text = optional_text(obj, "text");

    let title = optional_text(obj, "title")
        .or_else(|| text.clone())
        .unwrap_or_else(|| DEFAULT_REPUTATION_TITLE.to_string());
    let description = optional_text(obj, "description")
        .or(text)
        .unwrap_or_else(|| DEFAULT_REPUTATION_DESCRIPTION.to_string());
    let choices = obj
        .get("choices")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_choice).collect())
        .unwrap_or_default();

    ReputationEvent {
        title,
        description,
        choices,
    }
}

fn normalize_choice(value: &Value) -> Option<ReputationChoice> {
    let obj = value.as_object()?;
    let text = optional_text(obj, "text")?;

    let mut choice = ReputationChoice::new(text, required_int(obj, "reputationChange"));
    choice.description = optional_text(obj, "description");
    choice.hp_change = optional_int(obj, "hpChange");
    choice.exp_change = optional_int(obj, "expChange");
    choice.spirit_stones_change = optional_int(obj, "spiritStonesChange");
    Some(choice)
}

// =============================================================================
// Coercion helpers
// =============================================================================

/// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A finite number, or a string holding one.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|f| f.is_finite())
}

fn to_integer(value: f64) -> i64 {
    value.round() as i64
}

fn required_int(obj: &Map<String, Value>, key: &str) -> i64 {
    obj.get(key)
        .and_then(coerce_number)
        .map(to_integer)
        .unwrap_or(0)
}

fn optional_int(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    obj.get(key)
        .filter(|v| is_truthy(v))
        .and_then(coerce_number)
        .map(to_integer)
}

fn optional_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn optional_value(obj: &Map<String, Value>, key: &str) -> Option<Value> {
    obj.get(key).filter(|v| is_truthy(v)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_defaults() {
        let outcome = validate_outcome("{}").expect("parseable");
        assert_eq!(
            outcome,
            AdventureOutcome::basic(UNEVENTFUL_STORY, 0, 0, 0, EventColor::Normal)
        );
    }

    #[test]
    fn non_object_json_yields_defaults() {
        let outcome = validate_outcome("[1, 2, 3]").expect("parseable");
        assert_eq!(outcome.story, UNEVENTFUL_STORY);
        assert_eq!(outcome.hp_change, 0);
    }

    #[test]
    fn unparseable_text_is_an_error() {
        assert!(validate_outcome("the heavens are silent").is_err());
        assert!(validate_outcome("{\"story\": ").is_err());
    }

    #[test]
    fn numeral_strings_and_bad_numbers_are_coerced() {
        let outcome = normalize_outcome(&json!({
            "story": "A storm passes.",
            "hpChange": "-12",
            "expChange": 40.6,
            "spiritStonesChange": "lots",
            "eventColor": "DANGER"
        }));

        assert_eq!(outcome.hp_change, -12);
        assert_eq!(outcome.exp_change, 41);
        assert_eq!(outcome.spirit_stones_change, 0);
        assert_eq!(outcome.event_color, EventColor::Danger);
    }

    #[test]
    fn blank_story_and_unknown_color_fall_back() {
        let outcome = normalize_outcome(&json!({
            "story": "   ",
            "eventColor": "purple",
            "hpChange": null
        }));
        assert_eq!(outcome.story, UNEVENTFUL_STORY);
        assert_eq!(outcome.event_color, EventColor::Normal);
        assert_eq!(outcome.hp_change, 0);
    }

    #[test]
    fn null_optional_field_is_omitted_from_output() {
        let outcome =
            validate_outcome(r#"{"story": "x", "itemObtained": null}"#).expect("parseable");
        assert_eq!(outcome.item_obtained, None);

        let json = serde_json::to_value(&outcome).expect("serializable");
        assert!(json.get("itemObtained").is_none());
    }

    #[test]
    fn falsy_optional_fields_are_omitted() {
        let outcome = normalize_outcome(&json!({
            "petObtained": "",
            "inheritanceLevelChange": 0,
            "triggerSecretRealm": false,
            "reputationChange": null,
            "reputationEvent": null,
            "attributeReduction": 0
        }));

        let json = serde_json::to_value(&outcome).expect("serializable");
        let keys: Vec<&String> = json.as_object().expect("object").keys().collect();
        assert_eq!(keys.len(), 5, "unexpected keys: {keys:?}");
    }

    #[test]
    fn truthy_optional_fields_are_preserved() {
        let item = json!({"name": "Frost Lotus", "rarity": "rare"});
        let outcome = normalize_outcome(&json!({
            "story": "You find a lotus.",
            "expChange": 20,
            "eventColor": "gain",
            "itemObtained": item,
            "itemsObtained": [],
            "petObtained": "pet-spirit-fox",
            "inheritanceLevelChange": "2",
            "triggerSecretRealm": true,
            "reputationChange": -5
        }));

        assert_eq!(outcome.item_obtained, Some(item));
        assert_eq!(outcome.items_obtained, Some(json!([])));
        assert_eq!(outcome.pet_obtained.as_deref(), Some("pet-spirit-fox"));
        assert_eq!(outcome.inheritance_level_change, Some(2));
        assert_eq!(outcome.trigger_secret_realm, Some(true));
        assert_eq!(outcome.reputation_change, Some(-5));
    }

    #[test]
    fn reputation_event_is_normalized() {
        let outcome = normalize_outcome(&json!({
            "reputationEvent": {
                "text": "A merchant is being robbed.",
                "choices": [
                    {"text": "Intervene", "reputationChange": 80, "hpChange": "-10"},
                    {"reputationChange": 5},
                    {"text": "Join the robbers", "reputationChange": -100, "spiritStonesChange": 30},
                    "walk away"
                ]
            }
        }));

        let event = outcome.reputation_event.expect("event present");
        assert_eq!(event.title, "A merchant is being robbed.");
        assert_eq!(event.description, "A merchant is being robbed.");
        assert_eq!(event.choices.len(), 2);
        assert_eq!(event.choices[0].reputation_change, 50);
        assert_eq!(event.choices[0].hp_change, Some(-10));
        assert_eq!(event.choices[1].reputation_change, -30);
        assert_eq!(event.choices[1].spirit_stones_change, Some(30));
    }

    #[test]
    fn out_of_range_numbers_fall_back_per_field() {
        let outcome = validate_outcome(
            r#"{"story": "x", "hpChange": 1e400, "expChange": 12, "inheritanceLevelChange": -1e999}"#,
        )
        .expect("parseable");
        assert_eq!(outcome.story, "x");
        assert_eq!(outcome.hp_change, 0);
        assert_eq!(outcome.exp_change, 12);
        assert_eq!(outcome.inheritance_level_change, None);
    }

    #[test]
    fn reputation_event_without_choices_gets_placeholders() {
        let outcome = normalize_outcome(&json!({"reputationEvent": {}}));
        let event = outcome.reputation_event.expect("event present");
        assert_eq!(event.title, DEFAULT_REPUTATION_TITLE);
        assert_eq!(event.description, DEFAULT_REPUTATION_DESCRIPTION);
        assert!(event.choices.is_empty());
    }

    #[test]
    fn health_bound_clamps_both_directions() {
        let mut outcome = AdventureOutcome::basic("x", -500, 0, 0, EventColor::Danger);
        assert!(enforce_health_bound(&mut outcome, 301));
        assert_eq!(outcome.hp_change, -150);

        outcome.hp_change = 400;
        assert!(enforce_health_bound(&mut outcome, 300));
        assert_eq!(outcome.hp_change, 150);

        outcome.hp_change = 20;
        assert!(!enforce_health_bound(&mut outcome, 300));
        assert!(!enforce_health_bound(&mut outcome, 0));
    }
}
