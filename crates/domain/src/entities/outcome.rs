//! The adventure outcome contract handed to the UI layer.
//!
//! Required fields are always populated. Optional fields are `None` when the
//! event does not carry them and are then omitted from the serialized form
//! entirely, so "key present" can be read as "field meaningful".

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Visual classification of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    /// Nothing notable gained or lost
    #[default]
    Normal,
    /// Items, cultivation or spirit stones gained
    Gain,
    /// Health lost or attributes reduced
    Danger,
    /// A great fortune
    Special,
}

impl EventColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventColor::Normal => "normal",
            EventColor::Gain => "gain",
            EventColor::Danger => "danger",
            EventColor::Special => "special",
        }
    }
}

impl fmt::Display for EventColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventColor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(EventColor::Normal),
            "gain" => Ok(EventColor::Gain),
            "danger" => Ok(EventColor::Danger),
            "special" => Ok(EventColor::Special),
            other => Err(DomainError::parse(format!("unknown event color: {}", other))),
        }
    }
}

/// One option offered by a reputation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationChoice {
    pub text: String,
    /// Always within [`ReputationChoice::MIN_CHANGE`, `ReputationChoice::MAX_CHANGE`]
    #[serde(deserialize_with = "deserialize_reputation_change")]
    pub reputation_change: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp_change: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_change: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spirit_stones_change: Option<i64>,
}

impl ReputationChoice {
    pub const MIN_CHANGE: i64 = -30;
    pub const MAX_CHANGE: i64 = 50;

    pub fn new(text: impl Into<String>, reputation_change: i64) -> Self {
        Self {
            text: text.into(),
            reputation_change: reputation_change.clamp(Self::MIN_CHANGE, Self::MAX_CHANGE),
            description: None,
            hp_change: None,
            exp_change: None,
            spirit_stones_change: None,
        }
    }
}

fn deserialize_reputation_change<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let change = i64::deserialize(deserializer)?;
    Ok(change.clamp(ReputationChoice::MIN_CHANGE, ReputationChoice::MAX_CHANGE))
}

/// A moral decision presented to the player after an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationEvent {
    pub title: String,
    pub description: String,
    /// Ordered choices; empty rather than absent when the service sent none
    #[serde(default)]
    pub choices: Vec<ReputationChoice>,
}

/// Fully populated result of one adventure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdventureOutcome {
    pub story: String,
    pub hp_change: i64,
    pub exp_change: i64,
    pub spirit_stones_change: i64,
    pub event_color: EventColor,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_obtained: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_obtained: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_obtained: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_opportunity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance_level_change: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lottery_tickets_change: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_secret_realm: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_reduction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_change: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_event: Option<ReputationEvent>,
}

impl AdventureOutcome {
    /// Outcome with only the required fields set.
    pub fn basic(
        story: impl Into<String>,
        hp_change: i64,
        exp_change: i64,
        spirit_stones_change: i64,
        event_color: EventColor,
    ) -> Self {
        Self {
            story: story.into(),
            hp_change,
            exp_change,
            spirit_stones_change,
            event_color,
            item_obtained: None,
            items_obtained: None,
            pet_obtained: None,
            pet_opportunity: None,
            inheritance_level_change: None,
            lottery_tickets_change: None,
            trigger_secret_realm: None,
            attribute_reduction: None,
            reputation_change: None,
            reputation_event: None,
        }
    }
}

/// Generated name and title for an adversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdversaryName {
    pub name: String,
    pub title: String,
}

impl AdversaryName {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}
