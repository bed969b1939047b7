//! Adventure categories and the per-call generation context.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::realm::{Realm, RealmLevel};

/// Category of adventure the player embarked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdventureType {
    /// Everyday wandering in the wilds
    #[default]
    Normal,
    /// A rare stroke of fortune
    Lucky,
    /// Exploration of a named secret realm
    SecretRealm,
}

impl AdventureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdventureType::Normal => "normal",
            AdventureType::Lucky => "lucky",
            AdventureType::SecretRealm => "secret_realm",
        }
    }
}

impl fmt::Display for AdventureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdventureType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(AdventureType::Normal),
            "lucky" => Ok(AdventureType::Lucky),
            "secret_realm" | "secret-realm" | "secretrealm" => Ok(AdventureType::SecretRealm),
            other => Err(DomainError::parse(format!("unknown adventure type: {}", other))),
        }
    }
}

/// Danger rating of a secret realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    pub fn all() -> &'static [RiskLevel] {
        &[
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Extreme,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Extreme => "extreme",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RiskLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" | "mid" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "extreme" | "extremely_dangerous" => Ok(RiskLevel::Extreme),
            other => Err(DomainError::parse(format!("unknown risk level: {}", other))),
        }
    }
}

/// A named secret realm and an optional description of its character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRealmSite {
    pub name: String,
    pub description: Option<String>,
}

impl SecretRealmSite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Current player statistics, included in the prompt when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub name: String,
    pub hp: i64,
    pub max_hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub spirit: i64,
    pub physique: i64,
    pub speed: i64,
}

/// Everything the generation pipeline needs to know about one request.
///
/// Realm membership and the level bound are guaranteed by the component
/// types, so a constructed context is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub realm: Realm,
    pub level: RealmLevel,
    pub adventure: AdventureType,
    pub risk: Option<RiskLevel>,
    pub site: Option<SecretRealmSite>,
    pub player: Option<PlayerSnapshot>,
}

impl GenerationContext {
    pub fn new(realm: Realm, level: RealmLevel, adventure: AdventureType) -> Self {
        Self {
            realm,
            level,
            adventure,
            risk: None,
            site: None,
            player: None,
        }
    }

    pub fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.risk = Some(risk);
        self
    }

    pub fn with_site(mut self, site: SecretRealmSite) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_player(mut self, player: PlayerSnapshot) -> Self {
        self.player = Some(player);
        self
    }

    /// Same context with a different realm (level and category kept).
    pub fn with_realm(&self, realm: Realm) -> Self {
        Self {
            realm,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adventure_type_round_trips_through_str() {
        for adventure in [
            AdventureType::Normal,
            AdventureType::Lucky,
            AdventureType::SecretRealm,
        ] {
            assert_eq!(adventure.as_str().parse::<AdventureType>(), Ok(adventure));
        }
        assert!("heist".parse::<AdventureType>().is_err());
    }

    #[test]
    fn risk_level_accepts_aliases() {
        assert_eq!("MID".parse::<RiskLevel>(), Ok(RiskLevel::Medium));
        assert_eq!("extreme".parse::<RiskLevel>(), Ok(RiskLevel::Extreme));
    }

    #[test]
    fn with_realm_keeps_everything_else() {
        let level = RealmLevel::new(5).expect("valid level");
        let ctx = GenerationContext::new(Realm::GoldenCore, level, AdventureType::SecretRealm)
            .with_risk(RiskLevel::High)
            .with_site(SecretRealmSite::new("Sword Tomb").with_description("buried blades"));

        let lowered = ctx.with_realm(Realm::QiRefining);

        assert_eq!(lowered.realm, Realm::QiRefining);
        assert_eq!(lowered.level, level);
        assert_eq!(lowered.risk, Some(RiskLevel::High));
        assert_eq!(lowered.site, ctx.site);
    }
}
