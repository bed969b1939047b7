//! Cultivation realms and the level within a realm.
//!
//! Realms are the progression tiers of the game. Every difficulty and reward
//! calculation is keyed by the pair (realm, level).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Ordered cultivation realm.
///
/// The declaration order is the progression order; `index()` and the derived
/// `Ord` both follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    QiRefining,
    FoundationEstablishment,
    GoldenCore,
    NascentSoul,
    SpiritSevering,
    VoidRefinement,
    TribulationAscension,
}

impl Realm {
    /// All realms in progression order
    pub fn all() -> &'static [Realm] {
        &[
            Realm::QiRefining,
            Realm::FoundationEstablishment,
            Realm::GoldenCore,
            Realm::NascentSoul,
            Realm::SpiritSevering,
            Realm::VoidRefinement,
            Realm::TribulationAscension,
        ]
    }

    /// The first realm a new cultivator starts in.
    pub fn lowest() -> Realm {
        Realm::QiRefining
    }

    /// Zero-based position in the progression order.
    pub fn index(&self) -> usize {
        match self {
            Realm::QiRefining => 0,
            Realm::FoundationEstablishment => 1,
            Realm::GoldenCore => 2,
            Realm::NascentSoul => 3,
            Realm::SpiritSevering => 4,
            Realm::VoidRefinement => 5,
            Realm::TribulationAscension => 6,
        }
    }

    /// Get a display name for the realm
    pub fn display_name(&self) -> &'static str {
        match self {
            Realm::QiRefining => "Qi Refining",
            Realm::FoundationEstablishment => "Foundation Establishment",
            Realm::GoldenCore => "Golden Core",
            Realm::NascentSoul => "Nascent Soul",
            Realm::SpiritSevering => "Spirit Severing",
            Realm::VoidRefinement => "Void Refinement",
            Realm::TribulationAscension => "Tribulation Ascension",
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            Realm::QiRefining => "qi_refining",
            Realm::FoundationEstablishment => "foundation_establishment",
            Realm::GoldenCore => "golden_core",
            Realm::NascentSoul => "nascent_soul",
            Realm::SpiritSevering => "spirit_severing",
            Realm::VoidRefinement => "void_refinement",
            Realm::TribulationAscension => "tribulation_ascension",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Realm {
    type Err = DomainError;

    /// Accepts either the snake_case identifier or the display name,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Realm::all()
            .iter()
            .copied()
            .find(|realm| {
                realm.identifier().eq_ignore_ascii_case(wanted)
                    || realm.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| DomainError::parse(format!("unknown realm: {}", s)))
    }
}

/// Position within a realm, bounded to `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RealmLevel(u8);

impl RealmLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;

    pub fn new(level: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(DomainError::validation(format!(
                "realm level must be within {}..={}, got {}",
                Self::MIN,
                Self::MAX,
                level
            )))
        }
    }

    /// The first level of any realm.
    pub fn first() -> Self {
        Self(Self::MIN)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Number of steps above the first level (0 for level 1).
    pub fn steps_above_first(&self) -> u8 {
        self.0 - Self::MIN
    }
}

impl TryFrom<u8> for RealmLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RealmLevel> for u8 {
    fn from(level: RealmLevel) -> Self {
        level.0
    }
}

impl fmt::Display for RealmLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realms_are_ordered_by_index() {
        for (expected, realm) in Realm::all().iter().enumerate() {
            assert_eq!(realm.index(), expected);
        }
        assert!(Realm::QiRefining < Realm::TribulationAscension);
        assert_eq!(Realm::lowest(), Realm::all()[0]);
    }

    #[test]
    fn realm_parses_identifier_and_display_name() {
        assert_eq!("golden_core".parse::<Realm>(), Ok(Realm::GoldenCore));
        assert_eq!("Nascent Soul".parse::<Realm>(), Ok(Realm::NascentSoul));
        assert_eq!(" void refinement ".parse::<Realm>(), Ok(Realm::VoidRefinement));
        assert!("immortal".parse::<Realm>().is_err());
    }

    #[test]
    fn realm_level_is_bounded() {
        assert!(RealmLevel::new(0).is_err());
        assert!(RealmLevel::new(10).is_err());
        assert_eq!(RealmLevel::new(1).map(|l| l.get()), Ok(1));
        assert_eq!(RealmLevel::new(9).map(|l| l.steps_above_first()), Ok(8));
    }

    #[test]
    fn realm_level_deserialization_validates() {
        let ok: Result<RealmLevel, _> = serde_json::from_str("4");
        assert!(ok.is_ok());
        let bad: Result<RealmLevel, _> = serde_json::from_str("12");
        assert!(bad.is_err());
    }
}
